//! Unit tests for the story reassembly layer.

mod reassembler_tests;
