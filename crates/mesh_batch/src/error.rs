//! Error types for batching operations
//!
//! The hot path has deliberately few failure modes: out-of-memory during
//! pool growth aborts the process (the allocator's behavior, not ours), and
//! precondition violations such as over-deallocating are programming errors
//! caught by `debug_assert!`. What remains recoverable is the boundary to
//! the rendering backend, which is surfaced here.

use thiserror::Error;

use crate::backend::BackendError;

/// Result type for batching operations
pub type BatchResult<T> = Result<T, BatchError>;

/// Errors that can occur while submitting or flushing batches
#[derive(Error, Debug)]
pub enum BatchError {
    /// The rendering backend rejected a draw submission
    ///
    /// Raised from flush when [`crate::backend::DrawBackend::submit_draw`]
    /// fails. The open command is closed regardless, so a subsequent frame
    /// starts clean.
    #[error("backend submission failed: {0}")]
    Backend(#[from] BackendError),

    /// A command id did not resolve to a live command slot
    ///
    /// Indicates a stale id from a previous frame or from a command that was
    /// absorbed into an open batch.
    #[error("stale or unknown command id (index {index}, generation {generation})")]
    StaleCommand {
        /// Slot index carried by the id
        index: u32,
        /// Generation stamp carried by the id
        generation: u32,
    },
}
