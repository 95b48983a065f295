//! Backend abstraction for draw submission
//!
//! This module defines the trait a rendering backend must implement to
//! receive merged batches. The batcher only decides granularity and ordering
//! of draw calls; buffer upload, texture/program binding, and the hardware
//! draw itself belong to the backend behind this trait.

use crate::foundation::math::Mat4;
use crate::material::{BlendMode, CommandFlags, ProgramHandle, TextureHandle};
use crate::vertex::TwoColorVertex;
use thiserror::Error;

/// Result type for backend operations
pub type BackendResult<T> = Result<T, BackendError>;

/// Errors reported by a rendering backend
///
/// Abstracted from any specific graphics API so the batcher stays
/// backend-agnostic; the backend is expected to log API-level detail itself.
#[derive(Error, Debug)]
pub enum BackendError {
    /// A draw submission could not be recorded or executed
    #[error("draw submission failed: {0}")]
    SubmissionFailed(String),

    /// GPU-visible buffer upload failed
    #[error("buffer upload failed: {0}")]
    UploadFailed(String),

    /// A texture or program handle did not resolve to a live resource
    #[error("unknown resource handle: {0}")]
    UnknownResource(String),
}

/// One merged draw call, ready for the backend
///
/// Borrows the command's accumulated geometry; the backend must copy what it
/// needs before returning, as the slices are only valid for the duration of
/// the call.
#[derive(Debug)]
pub struct DrawSubmission<'a> {
    /// Submission order hint from the host renderer's queue
    pub global_order: f32,
    /// Texture to bind
    pub texture: TextureHandle,
    /// Shader program state to bind
    pub program: ProgramHandle,
    /// Blend factors to apply
    pub blend: BlendMode,
    /// Rendering flags (never affect batching, forwarded verbatim)
    pub flags: CommandFlags,
    /// Model-view transform for the whole batch
    pub model_view: Mat4,
    /// Merged vertex data
    pub vertices: &'a [TwoColorVertex],
    /// Merged index data, rebased to this batch's vertex range
    pub indices: &'a [u16],
}

/// Rendering backend trait
///
/// Implementations receive batches strictly in submission order, one call
/// per flushed batch. A test double that records submissions is all that is
/// needed to exercise the batcher without a GPU.
pub trait DrawBackend {
    /// Submit one merged draw call
    fn submit_draw(&mut self, draw: &DrawSubmission<'_>) -> BackendResult<()>;
}
