//! Typed extraction of fragment events from update field maps.
//!
//! The streaming collaborator delivers each update as a JSON field-value
//! mapping with fixed field names. This module turns that mapping into a
//! [`FragmentEvent`], decoding the base64 fragment body on the way so a
//! malformed fragment is rejected before any in-flight state is consulted.
//! Numeric fields arrive as JSON numbers from some sessions and as decimal
//! strings from others; both are accepted.

use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use serde::Deserialize;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::story::{ContinuationFragment, FirstFragment, FragmentEvent, FragmentNumber, Guid};

/// Field carrying the story identifier.
pub const FIELD_GUID: &str = "GUID";
/// Field carrying the originating source; constant across a story.
pub const FIELD_SOURCE: &str = "MRN_SRC";
/// Field carrying the one-based fragment number.
pub const FIELD_FRAG_NUM: &str = "FRAG_NUM";
/// Field carrying the declared total payload size, first fragment only.
pub const FIELD_TOT_SIZE: &str = "TOT_SIZE";
/// Field carrying the base64-encoded fragment body.
pub const FIELD_FRAGMENT: &str = "FRAGMENT";

/// Inbound update message envelope.
///
/// Only the field map matters to this crate; everything else the transport
/// attaches to an update is ignored.
#[derive(Clone, Debug, Deserialize)]
pub struct UpdateMessage {
    /// Field-value mapping carried by the update.
    #[serde(rename = "Fields")]
    pub fields: Map<String, Value>,
}

/// Errors raised while extracting a fragment event from a field map.
#[derive(Debug, Error)]
pub enum FieldError {
    /// A required field is absent.
    #[error("update is missing required field {name}")]
    Missing {
        /// Name of the absent field.
        name: &'static str,
    },
    /// A field is present but carries the wrong type or an unparsable value.
    #[error("field {name} is not {expected}")]
    Invalid {
        /// Name of the offending field.
        name: &'static str,
        /// Shape the field was expected to have.
        expected: &'static str,
    },
    /// The fragment body is not valid base64.
    #[error("field FRAGMENT is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),
}

impl FragmentEvent {
    /// Extract a fragment event from an update's field map.
    ///
    /// `TOT_SIZE` is required when `FRAG_NUM` is one and ignored otherwise.
    ///
    /// # Examples
    ///
    /// ```
    /// use base64::{Engine as _, engine::general_purpose::STANDARD};
    /// use newswire::story::FragmentEvent;
    /// use serde_json::json;
    ///
    /// let fields = json!({
    ///     "GUID": "story-1",
    ///     "MRN_SRC": "NS:RTRS",
    ///     "FRAG_NUM": 1,
    ///     "TOT_SIZE": 5,
    ///     "FRAGMENT": STANDARD.encode(b"hello"),
    /// });
    /// let fields = fields.as_object().expect("object");
    /// let event = FragmentEvent::from_fields(fields).expect("fields parse");
    /// assert_eq!(event.chunk(), b"hello");
    /// ```
    ///
    /// # Errors
    ///
    /// Returns a [`FieldError`] naming the missing or malformed field.
    pub fn from_fields(fields: &Map<String, Value>) -> Result<Self, FieldError> {
        let guid = Guid::from(string_field(fields, FIELD_GUID)?);
        let source = string_field(fields, FIELD_SOURCE)?.to_owned();

        let number = integer_field(fields, FIELD_FRAG_NUM)?;
        let number = u32::try_from(number)
            .ok()
            .and_then(FragmentNumber::new)
            .ok_or(FieldError::Invalid {
                name: FIELD_FRAG_NUM,
                expected: "a positive 32-bit integer",
            })?;

        let chunk = BASE64.decode(string_field(fields, FIELD_FRAGMENT)?)?;

        if number.is_first() {
            let declared_size = usize::try_from(integer_field(fields, FIELD_TOT_SIZE)?)
                .map_err(|_| FieldError::Invalid {
                    name: FIELD_TOT_SIZE,
                    expected: "a byte count",
                })?;
            Ok(Self::First(FirstFragment {
                guid,
                source,
                declared_size,
                chunk,
            }))
        } else {
            Ok(Self::Continuation(ContinuationFragment {
                guid,
                source,
                number,
                chunk,
            }))
        }
    }
}

fn require<'map>(
    fields: &'map Map<String, Value>,
    name: &'static str,
) -> Result<&'map Value, FieldError> {
    fields.get(name).ok_or(FieldError::Missing { name })
}

fn string_field<'map>(
    fields: &'map Map<String, Value>,
    name: &'static str,
) -> Result<&'map str, FieldError> {
    require(fields, name)?.as_str().ok_or(FieldError::Invalid {
        name,
        expected: "a string",
    })
}

fn integer_field(fields: &Map<String, Value>, name: &'static str) -> Result<u64, FieldError> {
    let invalid = FieldError::Invalid {
        name,
        expected: "a non-negative integer",
    };
    match require(fields, name)? {
        Value::Number(number) => number.as_u64().ok_or(invalid),
        Value::String(text) => text.trim().parse().map_err(|_| invalid),
        _ => Err(invalid),
    }
}
