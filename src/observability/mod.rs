//! Observability subsystem.
//!
//! Every workflow stage transition, signed entry, and relay round-trip is a
//! structured `tracing` event; this module only installs the subscriber.

pub mod logging;

pub use logging::init_logging;
