//! Observability module providing structured logging.
//!
//! Every run reports its outcome only through log lines, so the subscriber is
//! installed before the store is touched.

mod tracing_init;

pub use tracing_init::*;
