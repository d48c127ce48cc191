//! Backend adapters.
//!
//! Each adapter exposes an `is_available()` probe, a `set_provider_is_available_override`
//! switch so tests can hide it, and a constructor that fails with
//! [`crate::Error::ProviderNotFound`] when the backend is missing.

#[cfg(feature = "console")]
pub mod console;
#[cfg(feature = "log")]
pub mod log;
pub mod memory;
#[cfg(feature = "tracing")]
pub mod tracing;

#[cfg(feature = "console")]
pub use console::{ConsoleBuilder, ConsoleProvider, ConsoleRecord, ConsoleSettings};
#[cfg(feature = "log")]
pub use log::LogCrateProvider;
pub use memory::{LogEntry, MemoryProvider};
#[cfg(feature = "tracing")]
pub use tracing::TracingProvider;
