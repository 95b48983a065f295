//! Draw commands: the unit of batching
//!
//! A [`DrawCommand`] captures everything needed to later issue one merged
//! draw call: material state, transform, flags, and its own backend-visible
//! copy of the geometry it has accumulated. Commands live in recycled pool
//! slots (see [`crate::command_pool`]); `init` fully re-initializes a slot
//! while keeping its storage capacity, so steady-state frames allocate
//! nothing.
//!
//! Geometry accumulates across merges and is handed to the backend exactly
//! once, at flush, rather than re-uploaded per append.

use log::trace;

use crate::backend::{BackendResult, DrawBackend, DrawSubmission};
use crate::foundation::math::Mat4;
use crate::material::{CommandFlags, MaterialKey};
use crate::vertex::TwoColorVertex;

/// The largest vertex count addressable by `u16` indices in one batch
pub const MAX_BATCH_VERTICES: usize = u16::MAX as usize + 1;

/// Parameters for initializing a draw command
///
/// Grouped so a submission reads as one value at the call site rather than a
/// long positional argument list.
#[derive(Debug, Clone, Copy)]
pub struct DrawRequest {
    /// Submission order hint from the host renderer's queue
    pub global_order: f32,
    /// Material state deciding merge compatibility
    pub material: MaterialKey,
    /// Model-view transform for the draw call
    pub model_view: Mat4,
    /// Rendering flags forwarded to the backend
    pub flags: CommandFlags,
}

/// One (possibly merged) draw call in the making
///
/// Mutable while it is the batcher's open command, logically immutable once
/// flushed. Never destroyed individually; its pool slot is recycled by
/// re-`init` on a later frame.
#[derive(Debug)]
pub struct DrawCommand {
    global_order: f32,
    material: MaterialKey,
    model_view: Mat4,
    flags: CommandFlags,
    force_flush: bool,
    fingerprint: u64,

    // Backend-visible accumulation storage, distinct from the geometry
    // pool's staging arrays. Grows geometrically, capacity retained across
    // recycling.
    vertices: Vec<TwoColorVertex>,
    indices: Vec<u16>,
}

impl DrawCommand {
    /// Create an uninitialized command slot
    ///
    /// Only the command pool constructs these; every slot is re-`init`ed
    /// with real state before use.
    pub(crate) fn new() -> Self {
        Self {
            global_order: 0.0,
            material: MaterialKey {
                texture: crate::material::TextureHandle(0),
                program: crate::material::ProgramHandle(0),
                blend: crate::material::BlendMode::ALPHA_PREMULTIPLIED,
            },
            model_view: Mat4::identity(),
            flags: CommandFlags::empty(),
            force_flush: false,
            fingerprint: 0,
            vertices: Vec::new(),
            indices: Vec::new(),
        }
    }

    /// Fully re-initialize a recycled slot for a new draw request
    ///
    /// Clears accumulated geometry (keeping capacity), clears force-flush,
    /// and caches the material fingerprint.
    pub(crate) fn init(&mut self, request: &DrawRequest) {
        self.global_order = request.global_order;
        self.material = request.material;
        self.model_view = request.model_view;
        self.flags = request.flags;
        self.force_flush = false;
        self.fingerprint = request.material.fingerprint();
        self.vertices.clear();
        self.indices.clear();
    }

    /// Append geometry to this command's accumulation storage
    ///
    /// Incoming indices are relative to `vertices` and get rebased by the
    /// vertex count already accumulated. The merged total must stay
    /// addressable by `u16` indices; the batcher guarantees this by closing
    /// the batch first.
    pub(crate) fn append_geometry(&mut self, vertices: &[TwoColorVertex], indices: &[u16]) {
        debug_assert!(
            self.vertices.len() + vertices.len() <= MAX_BATCH_VERTICES,
            "merged batch would exceed u16 index space"
        );
        let base = self.vertices.len() as u16;
        self.vertices.extend_from_slice(vertices);
        self.indices.extend(indices.iter().map(|&i| base + i));
    }

    /// Issue this command's accumulated geometry to the backend
    ///
    /// The lazy upload point: called once per flushed batch, regardless of
    /// how many merges the command absorbed.
    pub(crate) fn submit(&self, backend: &mut dyn DrawBackend) -> BackendResult<()> {
        trace!(
            "submitting batch: {} vertices, {} indices, texture {:?}",
            self.vertices.len(),
            self.indices.len(),
            self.material.texture
        );
        backend.submit_draw(&DrawSubmission {
            global_order: self.global_order,
            texture: self.material.texture,
            program: self.material.program,
            blend: self.material.blend,
            flags: self.flags,
            model_view: self.model_view,
            vertices: &self.vertices,
            indices: &self.indices,
        })
    }

    /// Cached material fingerprint (fast merge pre-filter)
    pub fn fingerprint(&self) -> u64 {
        self.fingerprint
    }

    /// Material state of this command
    pub fn material(&self) -> &MaterialKey {
        &self.material
    }

    /// Model-view transform of this command
    pub fn model_view(&self) -> &Mat4 {
        &self.model_view
    }

    /// Rendering flags of this command
    pub fn flags(&self) -> CommandFlags {
        self.flags
    }

    /// Submission order hint of this command
    pub fn global_order(&self) -> f32 {
        self.global_order
    }

    /// Mark this command to be flushed as its own batch
    ///
    /// Overrides merge eligibility: even a material-identical follow-up
    /// request closes the batch. Used when upstream ordering requirements
    /// must be respected.
    pub fn set_force_flush(&mut self, force_flush: bool) {
        self.force_flush = force_flush;
    }

    /// Whether this command refuses to merge
    pub fn is_force_flush(&self) -> bool {
        self.force_flush
    }

    /// Vertices accumulated so far
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Indices accumulated so far
    pub fn index_count(&self) -> usize {
        self.indices.len()
    }

    /// Accumulated vertex data
    pub fn vertices(&self) -> &[TwoColorVertex] {
        &self.vertices
    }

    /// Accumulated index data, rebased to this command's vertex range
    pub fn indices(&self) -> &[u16] {
        &self.indices
    }
}
