//! Shared repository test infrastructure
//!
//! The same test logic runs against every `PriceAlertRepo` implementation:
//!
//! - **Unit tests (memory)**: The in-memory repo from [`harness`], run with every `cargo test`
//! - **Integration tests (MongoDB)**: Testcontainers-backed, run with `cargo test -- --ignored`
//!
//! # Running tests
//!
//! ```bash
//! cargo test                       # Run fast in-memory tests only
//! cargo test -- --ignored          # Run MongoDB integration tests (requires Docker)
//! cargo test -- --include-ignored  # Run all tests
//! ```

pub mod harness;
