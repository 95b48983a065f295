//! The batcher: merge decision and flush state machine
//!
//! Receives one draw request at a time, in submission order, and either
//! extends the currently open command or closes it and opens a new one.
//! Closed batches go to the [`DrawBackend`] immediately, so merged draw
//! calls reach the backend in exactly the order they were submitted;
//! reordering across material boundaries never happens (draw order is
//! correctness for overlapping translucent geometry).
//!
//! Single-threaded by design: one batcher serves one frame thread, no
//! internal locking, every call synchronous and bounded by reallocation
//! cost.
//!
//! # Frame protocol
//! 1. [`MeshBatcher::update`] once, before any submissions.
//! 2. Per mesh: check geometry out of the pool, fill it, then
//!    [`MeshBatcher::add_command`].
//! 3. [`MeshBatcher::flush`] once the frame's command stream is complete.

use log::{debug, trace, warn};

use crate::backend::DrawBackend;
use crate::command::{DrawCommand, DrawRequest, MAX_BATCH_VERTICES};
use crate::command_pool::{CommandId, CommandPool};
use crate::config::BatchConfig;
use crate::error::{BatchError, BatchResult};
use crate::geometry::{GeometryPool, GeometrySlice, IndexRange, VertexRange};
use crate::vertex::TwoColorVertex;

/// Frame-scoped batching engine for skeletal mesh draw requests
///
/// Owns the geometry pool and command pool; explicitly constructed and
/// dropped by the host renderer, one instance per frame thread.
pub struct MeshBatcher {
    geometry: GeometryPool,
    commands: CommandPool,

    /// Currently accumulating command, if any
    open: Option<CommandId>,

    /// Draw calls issued so far in the current frame
    batches_this_frame: u32,

    /// Draw calls issued in the most recently completed frame
    completed_frame_batches: u32,
}

impl MeshBatcher {
    /// Create a batcher with default pool sizing
    pub fn new() -> Self {
        Self::with_config(&BatchConfig::default())
    }

    /// Create a batcher with pools pre-reserved per `config`
    pub fn with_config(config: &BatchConfig) -> Self {
        debug!(
            "creating mesh batcher: {} vertices, {} indices, {} command slots reserved",
            config.initial_vertex_capacity,
            config.initial_index_capacity,
            config.initial_command_capacity
        );
        Self {
            geometry: GeometryPool::with_capacity(
                config.initial_vertex_capacity,
                config.initial_index_capacity,
            ),
            commands: CommandPool::with_capacity(config.initial_command_capacity),
            open: None,
            batches_this_frame: 0,
            completed_frame_batches: 0,
        }
    }

    /// Per-frame housekeeping; call once before any submissions
    ///
    /// Rolls the batch counter into the completed-frame figure and resets
    /// both pools and the open-command reference. Must run only after the
    /// previous frame's [`Self::flush`] has completed.
    pub fn update(&mut self, _delta: f32) {
        debug!(
            "frame complete: {} batches, {} vertices, {} indices, {} commands",
            self.batches_this_frame,
            self.geometry.used_vertices(),
            self.geometry.used_indices(),
            self.commands.in_use()
        );
        self.completed_frame_batches = self.batches_this_frame;
        self.batches_this_frame = 0;
        self.open = None;
        self.commands.reset();
        self.geometry.reset();
    }

    /// Submit one draw request
    ///
    /// Obtains and initializes a command slot, then either merges it into
    /// the open batch or closes that batch (issuing it to `backend`) and
    /// opens a new one. Returns the id of the command that is open after the
    /// call: the new command, or the open command it was absorbed into.
    /// Either way the id addresses the live batch, so marking it force-flush
    /// or querying its counts does what the caller expects.
    ///
    /// # Caller contract
    /// Merging ignores transform differences. All geometry submitted while
    /// one command is open must share one effective model-view transform or
    /// have it pre-baked into vertex positions; a merged batch is drawn with
    /// the transform of the command that opened it.
    ///
    /// # Errors
    /// Propagates backend failures from an internal flush.
    pub fn add_command(
        &mut self,
        backend: &mut dyn DrawBackend,
        request: &DrawRequest,
        slice: GeometrySlice,
    ) -> BatchResult<CommandId> {
        let id = self.commands.next_free_command();
        self.command_mut(id)?.init(request);
        self.batch(backend, id, slice)
    }

    /// Core merge decision
    fn batch(
        &mut self,
        backend: &mut dyn DrawBackend,
        id: CommandId,
        slice: GeometrySlice,
    ) -> BatchResult<CommandId> {
        if let Some(open_id) = self.open {
            if self.can_merge(open_id, id, slice) {
                let vertices = self.geometry.vertices(slice.vertices);
                let indices = self.geometry.indices(slice.indices);
                let open = self
                    .commands
                    .get_mut(open_id)
                    .ok_or(BatchError::StaleCommand {
                        index: open_id.index(),
                        generation: open_id.generation(),
                    })?;
                open.append_geometry(vertices, indices);
                trace!(
                    "merged request into open batch ({} vertices accumulated)",
                    open.vertex_count()
                );
                // The new slot is absorbed; nothing references it and it is
                // recycled naturally at the next frame reset.
                return Ok(open_id);
            }
            self.flush(backend)?;
        }

        // Idle: the new command opens a batch seeded with its own geometry.
        let vertices = self.geometry.vertices(slice.vertices);
        let indices = self.geometry.indices(slice.indices);
        let command = self.commands.get_mut(id).ok_or(BatchError::StaleCommand {
            index: id.index(),
            generation: id.generation(),
        })?;
        command.append_geometry(vertices, indices);
        self.open = Some(id);
        trace!("opened new batch for command {:?}", id);
        Ok(id)
    }

    /// Whether the open command can absorb the new request
    ///
    /// Fingerprint equality is the fast pre-filter; the exact material
    /// comparison guards against hash collisions. Force-flush on either
    /// side rejects the merge, as does exhausting the `u16` index space.
    fn can_merge(&self, open_id: CommandId, new_id: CommandId, slice: GeometrySlice) -> bool {
        let (Some(open), Some(new)) = (self.commands.get(open_id), self.commands.get(new_id))
        else {
            return false;
        };
        if open.is_force_flush() || new.is_force_flush() {
            return false;
        }
        if open.fingerprint() != new.fingerprint() {
            return false;
        }
        if !open.material().can_merge_with(new.material()) {
            return false;
        }
        open.vertex_count() + slice.vertices.count as usize <= MAX_BATCH_VERTICES
    }

    /// Issue the open command to the backend, if any
    ///
    /// The lazy upload point: the command's accumulated geometry reaches the
    /// backend exactly once, here. The open reference is cleared even if the
    /// backend fails, so the next frame starts clean.
    ///
    /// # Errors
    /// Returns the backend's error; the failed batch is not re-submitted.
    pub fn flush(&mut self, backend: &mut dyn DrawBackend) -> BatchResult<()> {
        if let Some(open_id) = self.open.take() {
            let command = self.commands.get(open_id).ok_or(BatchError::StaleCommand {
                index: open_id.index(),
                generation: open_id.generation(),
            })?;
            command.submit(backend)?;
            self.batches_this_frame += 1;
            trace!("flushed batch {} of this frame", self.batches_this_frame);
        }
        Ok(())
    }

    /// Draw calls issued in the most recently completed frame
    ///
    /// Telemetry for external callers; not consumed internally.
    pub fn num_batches(&self) -> u32 {
        self.completed_frame_batches
    }

    /// Mark or unmark a command to be flushed as its own batch
    ///
    /// Stale ids (prior frame, or an absorbed command) are ignored with a
    /// warning rather than treated as an error.
    pub fn set_force_flush(&mut self, id: CommandId, force_flush: bool) {
        match self.commands.get_mut(id) {
            Some(command) => command.set_force_flush(force_flush),
            None => warn!("ignoring force-flush on stale command id {id:?}"),
        }
    }

    /// Id of the currently accumulating command, if any
    pub fn open_command(&self) -> Option<CommandId> {
        self.open
    }

    /// Read access to a live command, for stats queries
    pub fn command(&self, id: CommandId) -> Option<&DrawCommand> {
        self.commands.get(id)
    }

    /// Check out `count` vertices from the geometry pool
    pub fn allocate_vertices(&mut self, count: u32) -> VertexRange {
        self.geometry.allocate_vertices(count)
    }

    /// Roll back the most recent speculative vertex over-allocation
    pub fn deallocate_vertices(&mut self, count: u32) {
        self.geometry.deallocate_vertices(count);
    }

    /// Check out `count` indices from the geometry pool
    pub fn allocate_indices(&mut self, count: u32) -> IndexRange {
        self.geometry.allocate_indices(count)
    }

    /// Roll back the most recent speculative index over-allocation
    pub fn deallocate_indices(&mut self, count: u32) {
        self.geometry.deallocate_indices(count);
    }

    /// Resolve a vertex range to a writable slice for mesh building
    pub fn vertices_mut(&mut self, range: VertexRange) -> &mut [TwoColorVertex] {
        self.geometry.vertices_mut(range)
    }

    /// Resolve an index range to a writable slice for mesh building
    pub fn indices_mut(&mut self, range: IndexRange) -> &mut [u16] {
        self.geometry.indices_mut(range)
    }

    /// The geometry pool, for telemetry
    pub fn geometry(&self) -> &GeometryPool {
        &self.geometry
    }

    fn command_mut(&mut self, id: CommandId) -> BatchResult<&mut DrawCommand> {
        self.commands.get_mut(id).ok_or(BatchError::StaleCommand {
            index: id.index(),
            generation: id.generation(),
        })
    }
}

impl Default for MeshBatcher {
    fn default() -> Self {
        Self::new()
    }
}
