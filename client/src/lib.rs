//! REST client core: typed resource clients, a paginated list store and a
//! bearer session holder.
//!
//! The crate follows a hexagonal layout. [`domain`] owns the behaviour and
//! the driven ports, [`outbound`] implements those ports over HTTP and the
//! filesystem, and [`config`] resolves where everything points.

pub mod config;
pub mod domain;
pub mod outbound;
pub mod telemetry;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use config::{ClientSettings, SettingsError};
