//! Command processing on top of `core`.
//!
//! `Engine` validates and applies commands, `EngineError` says why one was
//! rejected, and `Snapshot` is the read-only view handed to clients.

pub mod engine;
pub mod error;
pub mod snapshot;

pub use engine::{CardLedger, Engine};
pub use error::{EngineError, ErrorKind};
pub use snapshot::{CellView, SeatView, Snapshot, Visibility};
pub use crate::core::GameResult;
