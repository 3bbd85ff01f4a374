//! Crate-wide test helpers.
