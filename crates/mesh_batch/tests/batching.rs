//! End-to-end batching scenarios against a recording backend
//!
//! Drives the batcher the way a host renderer would: one `update` per frame,
//! geometry checked out of the pool per mesh, a flush at frame end, and a
//! mock backend that records every submission it receives.

use approx::assert_relative_eq;
use mesh_batch::prelude::*;

/// A recorded copy of one submitted batch
struct RecordedBatch {
    texture: TextureHandle,
    program: ProgramHandle,
    blend: BlendMode,
    vertices: Vec<TwoColorVertex>,
    indices: Vec<u16>,
}

/// Backend double that copies out every submission
#[derive(Default)]
struct RecordingBackend {
    batches: Vec<RecordedBatch>,
}

impl DrawBackend for RecordingBackend {
    fn submit_draw(&mut self, draw: &DrawSubmission<'_>) -> BackendResult<()> {
        self.batches.push(RecordedBatch {
            texture: draw.texture,
            program: draw.program,
            blend: draw.blend,
            vertices: draw.vertices.to_vec(),
            indices: draw.indices.to_vec(),
        });
        Ok(())
    }
}

/// Backend double that always fails
struct FailingBackend;

impl DrawBackend for FailingBackend {
    fn submit_draw(&mut self, _draw: &DrawSubmission<'_>) -> BackendResult<()> {
        Err(BackendError::SubmissionFailed("device lost".to_string()))
    }
}

fn request(texture: u64, blend: BlendMode) -> DrawRequest {
    DrawRequest {
        global_order: 0.0,
        material: MaterialKey {
            texture: TextureHandle(texture),
            program: ProgramHandle(1),
            blend,
        },
        model_view: Mat4::identity(),
        flags: CommandFlags::PREMULTIPLIED_ALPHA,
    }
}

/// Check out a quad and fill it with recognizable data
///
/// Vertex x coordinates carry `tag` so merged output can be attributed to
/// the mesh that produced it.
fn submit_quad(
    batcher: &mut MeshBatcher,
    backend: &mut RecordingBackend,
    texture: u64,
    blend: BlendMode,
    tag: f32,
) -> CommandId {
    let vertices = batcher.allocate_vertices(4);
    let indices = batcher.allocate_indices(6);

    for (i, vertex) in batcher.vertices_mut(vertices).iter_mut().enumerate() {
        vertex.position = [tag, i as f32, 0.0];
        vertex.color = [255, 255, 255, 255];
        vertex.dark_color = [0, 0, 0, 0];
        vertex.tex_coord = [0.0, 0.0];
    }
    batcher
        .indices_mut(indices)
        .copy_from_slice(&[0, 1, 2, 2, 3, 0]);

    let slice = GeometrySlice { vertices, indices };
    batcher
        .add_command(backend, &request(texture, blend), slice)
        .expect("submission should succeed")
}

#[test]
fn three_meshes_two_textures_yield_two_batches() {
    let mut batcher = MeshBatcher::new();
    let mut backend = RecordingBackend::default();
    batcher.update(1.0 / 60.0);

    submit_quad(&mut batcher, &mut backend, 1, BlendMode::ALPHA_PREMULTIPLIED, 10.0);
    submit_quad(&mut batcher, &mut backend, 1, BlendMode::ALPHA_PREMULTIPLIED, 20.0);
    submit_quad(&mut batcher, &mut backend, 2, BlendMode::ALPHA_PREMULTIPLIED, 30.0);
    batcher.flush(&mut backend).unwrap();

    assert_eq!(backend.batches.len(), 2);

    // First batch: the two texture-1 quads merged, 8 vertices / 12 indices,
    // second quad's indices rebased by the first quad's vertex count.
    let merged = &backend.batches[0];
    assert_eq!(merged.texture, TextureHandle(1));
    assert_eq!(merged.vertices.len(), 8);
    assert_eq!(merged.indices.len(), 12);
    assert_eq!(&merged.indices[..6], &[0, 1, 2, 2, 3, 0]);
    assert_eq!(&merged.indices[6..], &[4, 5, 6, 6, 7, 4]);
    assert_relative_eq!(merged.vertices[0].position[0], 10.0);
    assert_relative_eq!(merged.vertices[4].position[0], 20.0);

    // Second batch: the texture-2 quad alone, in submission order.
    let solo = &backend.batches[1];
    assert_eq!(solo.texture, TextureHandle(2));
    assert_eq!(solo.vertices.len(), 4);
    assert_eq!(solo.indices.len(), 6);
    assert_relative_eq!(solo.vertices[0].position[0], 30.0);
}

#[test]
fn blend_mode_change_splits_batches() {
    let mut batcher = MeshBatcher::new();
    let mut backend = RecordingBackend::default();
    batcher.update(0.0);

    submit_quad(&mut batcher, &mut backend, 1, BlendMode::ALPHA_PREMULTIPLIED, 1.0);
    submit_quad(&mut batcher, &mut backend, 1, BlendMode::ADDITIVE, 2.0);
    batcher.flush(&mut backend).unwrap();

    assert_eq!(backend.batches.len(), 2);
    assert_eq!(backend.batches[0].blend, BlendMode::ALPHA_PREMULTIPLIED);
    assert_eq!(backend.batches[1].blend, BlendMode::ADDITIVE);
}

#[test]
fn force_flush_isolates_material_identical_neighbors() {
    let mut batcher = MeshBatcher::new();
    let mut backend = RecordingBackend::default();
    batcher.update(0.0);

    let first = submit_quad(&mut batcher, &mut backend, 1, BlendMode::ALPHA_PREMULTIPLIED, 1.0);
    batcher.set_force_flush(first, true);
    submit_quad(&mut batcher, &mut backend, 1, BlendMode::ALPHA_PREMULTIPLIED, 2.0);
    batcher.flush(&mut backend).unwrap();

    assert_eq!(backend.batches.len(), 2);
    assert_eq!(backend.batches[0].vertices.len(), 4);
    assert_eq!(backend.batches[1].vertices.len(), 4);
}

#[test]
fn num_batches_reports_completed_frame() {
    let mut batcher = MeshBatcher::new();
    let mut backend = RecordingBackend::default();

    // Frame 1: two batches.
    batcher.update(0.0);
    submit_quad(&mut batcher, &mut backend, 1, BlendMode::ALPHA_PREMULTIPLIED, 1.0);
    submit_quad(&mut batcher, &mut backend, 2, BlendMode::ALPHA_PREMULTIPLIED, 2.0);
    batcher.flush(&mut backend).unwrap();

    // Frame 2 starts: frame 1's count becomes visible, pools are clean.
    batcher.update(0.0);
    assert_eq!(batcher.num_batches(), 2);
    assert!(batcher.open_command().is_none());
    assert_eq!(batcher.geometry().used_vertices(), 0);
    assert_eq!(batcher.geometry().used_indices(), 0);

    // Frame 2: one merged batch.
    submit_quad(&mut batcher, &mut backend, 1, BlendMode::ALPHA_PREMULTIPLIED, 1.0);
    submit_quad(&mut batcher, &mut backend, 1, BlendMode::ALPHA_PREMULTIPLIED, 2.0);
    batcher.flush(&mut backend).unwrap();
    batcher.update(0.0);
    assert_eq!(batcher.num_batches(), 1);
}

#[test]
fn speculative_over_allocation_rolls_back() {
    let mut batcher = MeshBatcher::new();
    batcher.update(0.0);

    // Worst-case checkout, fewer actually written.
    let range = batcher.allocate_vertices(128);
    assert_eq!(batcher.geometry().used_vertices(), 128);
    let written = 100;
    batcher.deallocate_vertices(range.count - written);
    assert_eq!(batcher.geometry().used_vertices(), written);

    batcher.allocate_indices(64);
    batcher.deallocate_indices(16);
    assert_eq!(batcher.geometry().used_indices(), 48);
}

#[test]
fn oversized_merge_splits_at_u16_index_budget() {
    let mut batcher = MeshBatcher::new();
    let mut backend = RecordingBackend::default();
    batcher.update(0.0);

    // Two meshes of 40_000 vertices each cannot share a u16-indexed batch.
    for _ in 0..2 {
        let vertices = batcher.allocate_vertices(40_000);
        let indices = batcher.allocate_indices(3);
        batcher.indices_mut(indices).copy_from_slice(&[0, 1, 2]);
        let slice = GeometrySlice { vertices, indices };
        batcher
            .add_command(
                &mut backend,
                &request(1, BlendMode::ALPHA_PREMULTIPLIED),
                slice,
            )
            .unwrap();
    }
    batcher.flush(&mut backend).unwrap();

    assert_eq!(backend.batches.len(), 2);
    assert_eq!(backend.batches[0].vertices.len(), 40_000);
    assert_eq!(backend.batches[1].vertices.len(), 40_000);
}

#[test]
fn backend_failure_propagates_and_clears_open_batch() {
    let mut batcher = MeshBatcher::new();
    let mut recording = RecordingBackend::default();
    batcher.update(0.0);

    submit_quad(&mut batcher, &mut recording, 1, BlendMode::ALPHA_PREMULTIPLIED, 1.0);

    let mut failing = FailingBackend;
    let result = batcher.flush(&mut failing);
    assert!(matches!(result, Err(BatchError::Backend(_))));

    // The failed batch is dropped, not re-submitted.
    assert!(batcher.open_command().is_none());
    batcher.flush(&mut recording).unwrap();
    assert!(recording.batches.is_empty());
}

#[test]
fn program_state_submitted_with_batch() {
    let mut batcher = MeshBatcher::new();
    let mut backend = RecordingBackend::default();
    batcher.update(0.0);

    submit_quad(&mut batcher, &mut backend, 1, BlendMode::ALPHA_PREMULTIPLIED, 1.0);
    batcher.flush(&mut backend).unwrap();

    assert_eq!(backend.batches[0].program, ProgramHandle(1));
}
