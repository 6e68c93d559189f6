use derive_more::{Display, From};

/// Globally unique identifier correlating the fragments of one news story.
///
/// The feed assigns one GUID per logical story and repeats it on every
/// fragment, so the reassembler uses it as the key of the in-flight set.
///
/// # Examples
///
/// ```
/// use newswire::story::Guid;
/// let guid = Guid::from("BzEN2zy__2212E");
/// assert_eq!(guid.as_str(), "BzEN2zy__2212E");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, Display, From)]
#[display("{_0}")]
pub struct Guid(String);

impl Guid {
    /// Create a new identifier.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self { Self(value.into()) }

    /// Borrow the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str { &self.0 }
}

impl From<&str> for Guid {
    fn from(value: &str) -> Self { Self(value.to_owned()) }
}
