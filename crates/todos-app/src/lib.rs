//! Application layer for the todos client.
//!
//! This crate owns the synchronization core, its storage abstraction and the
//! client configuration shared by the CLI and TUI.

pub mod config;
pub mod error;
pub mod remote_store;
pub mod state;
pub mod sync;

// Re-exports for convenience
pub use config::ClientConfig;
pub use error::{BoxError, ErrorKind, ErrorNotice, SyncError};
pub use remote_store::RemoteStore;
pub use state::{LoadingMarker, SyncState};
pub use sync::{BulkTogglePolicy, DEFAULT_ERROR_DWELL, DEFAULT_ERROR_DWELL_MS, RenameOutcome, SyncOptions, TodoSync};
