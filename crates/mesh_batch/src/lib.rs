//! # Mesh Batch
//!
//! A frame-scoped vertex/index batching engine for 2D skeletal-animation
//! meshes. Many independently drawn skinned meshes are produced per frame,
//! each with its own texture, blend mode, and shader program state; issuing
//! one draw call per mesh is prohibitively expensive on typical backends.
//! This crate provides:
//!
//! - **Pooled geometry storage**: growable per-frame vertex/index arrays so
//!   mesh builders never allocate per mesh ([`geometry`])
//! - **Material-compatible merging**: consecutive draw requests sharing
//!   {texture, blend mode, program state} collapse into one draw call
//!   ([`batcher`], [`material`])
//! - **Command recycling**: draw commands live in a generation-counted slot
//!   pool reset each frame, avoiding steady-state heap churn
//!   ([`command_pool`])
//! - **An explicit backend boundary**: merged batches are handed to a
//!   [`backend::DrawBackend`] implementation in strict submission order
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use mesh_batch::prelude::*;
//!
//! # struct MyBackend;
//! # impl DrawBackend for MyBackend {
//! #     fn submit_draw(&mut self, _draw: &DrawSubmission<'_>) -> BackendResult<()> { Ok(()) }
//! # }
//! let mut batcher = MeshBatcher::new();
//! let mut backend = MyBackend;
//!
//! // Once per frame, before any submissions:
//! batcher.update(1.0 / 60.0);
//!
//! // Per mesh: check out pool space, fill it, submit.
//! let vertices = batcher.allocate_vertices(4);
//! let indices = batcher.allocate_indices(6);
//! batcher.indices_mut(indices).copy_from_slice(&[0, 1, 2, 2, 3, 0]);
//! // ... write vertex data via batcher.vertices_mut(vertices) ...
//!
//! let request = DrawRequest {
//!     global_order: 0.0,
//!     material: MaterialKey {
//!         texture: TextureHandle(1),
//!         program: ProgramHandle(1),
//!         blend: BlendMode::ALPHA_PREMULTIPLIED,
//!     },
//!     model_view: Mat4::identity(),
//!     flags: CommandFlags::empty(),
//! };
//! let slice = GeometrySlice { vertices, indices };
//! batcher.add_command(&mut backend, &request, slice)?;
//!
//! // End of frame: close the still-open batch.
//! batcher.flush(&mut backend)?;
//! # Ok::<(), mesh_batch::error::BatchError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod backend;
pub mod batcher;
pub mod command;
pub mod command_pool;
pub mod config;
pub mod error;
pub mod foundation;
pub mod geometry;
pub mod material;
pub mod vertex;

/// Commonly used types, importable in one line
pub mod prelude {
    pub use crate::backend::{BackendError, BackendResult, DrawBackend, DrawSubmission};
    pub use crate::batcher::MeshBatcher;
    pub use crate::command::{DrawCommand, DrawRequest};
    pub use crate::command_pool::CommandId;
    pub use crate::config::BatchConfig;
    pub use crate::error::{BatchError, BatchResult};
    pub use crate::foundation::math::Mat4;
    pub use crate::geometry::{GeometryPool, GeometrySlice, IndexRange, VertexRange};
    pub use crate::material::{
        BlendFactor, BlendMode, CommandFlags, MaterialKey, ProgramHandle, TextureHandle,
    };
    pub use crate::vertex::TwoColorVertex;
}
