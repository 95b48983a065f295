//! Pooled per-frame geometry storage
//!
//! The geometry pool owns two growable arrays, vertices and indices, that
//! mesh builders check space out of instead of allocating per mesh. Storage
//! persists across frames (growth cost is amortized); only the used cursors
//! reset each frame.
//!
//! # Handles, not pointers
//! Checkout returns offset/count ranges, never pointers. A range is resolved
//! to a slice at point of use via [`GeometryPool::vertices_mut`] and friends,
//! so a reallocation triggered by a later checkout can never silently
//! invalidate a caller-held reference. Resolved slices are valid only until
//! the next allocate call or frame reset.
//!
//! # Rollback discipline
//! [`GeometryPool::deallocate_vertices`] exists for speculative
//! over-allocation: check out a worst-case upper bound, write fewer, return
//! the surplus. Only the most recent allocation may be rolled back, and only
//! before any further allocate call in the same frame.

use log::debug;

use crate::vertex::TwoColorVertex;

/// A checked-out range of the pool's vertex array
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VertexRange {
    /// Offset of the first vertex in the pool
    pub first: u32,
    /// Number of vertices in the range
    pub count: u32,
}

/// A checked-out range of the pool's index array
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexRange {
    /// Offset of the first index in the pool
    pub first: u32,
    /// Number of indices in the range
    pub count: u32,
}

/// A mesh's worth of pooled geometry: a vertex range and its index range
///
/// Index values stored in the range are relative to the slice's own vertex
/// range; they are rebased when merged into a larger buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeometrySlice {
    /// Vertex portion of the slice
    pub vertices: VertexRange,
    /// Index portion of the slice
    pub indices: IndexRange,
}

/// Growable pooled storage for one frame's vertex and index data
///
/// Invariant: the used cursor never exceeds capacity; growth preserves
/// already-written data. Capacity never shrinks within a session.
#[derive(Debug, Default)]
pub struct GeometryPool {
    vertices: Vec<TwoColorVertex>,
    indices: Vec<u16>,
}

impl GeometryPool {
    /// Create an empty pool
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a pool with storage pre-reserved
    ///
    /// Sizing the reservation to a frame's high-water mark means no
    /// reallocation ever happens mid-frame.
    pub fn with_capacity(vertex_capacity: usize, index_capacity: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(vertex_capacity),
            indices: Vec::with_capacity(index_capacity),
        }
    }

    /// Check out `count` vertices, growing storage if needed
    ///
    /// Returns the range starting at the pre-advance cursor. Out-of-memory
    /// during growth aborts the process; there is no recoverable failure.
    pub fn allocate_vertices(&mut self, count: u32) -> VertexRange {
        let first = self.vertices.len() as u32;
        let new_len = self.vertices.len() + count as usize;
        if new_len > self.vertices.capacity() {
            debug!(
                "geometry pool vertex storage growing past {} (need {})",
                self.vertices.capacity(),
                new_len
            );
        }
        self.vertices.resize(new_len, TwoColorVertex::ZERO);
        VertexRange { first, count }
    }

    /// Return the `count` most recently allocated vertices to the pool
    ///
    /// Precondition: `count` does not exceed the used cursor. Violations are
    /// programming errors, caught in debug builds.
    pub fn deallocate_vertices(&mut self, count: u32) {
        debug_assert!(
            count as usize <= self.vertices.len(),
            "deallocating {count} vertices but only {} are in use",
            self.vertices.len()
        );
        let new_len = self.vertices.len().saturating_sub(count as usize);
        self.vertices.truncate(new_len);
    }

    /// Check out `count` indices, growing storage if needed
    pub fn allocate_indices(&mut self, count: u32) -> IndexRange {
        let first = self.indices.len() as u32;
        let new_len = self.indices.len() + count as usize;
        if new_len > self.indices.capacity() {
            debug!(
                "geometry pool index storage growing past {} (need {})",
                self.indices.capacity(),
                new_len
            );
        }
        self.indices.resize(new_len, 0);
        IndexRange { first, count }
    }

    /// Return the `count` most recently allocated indices to the pool
    pub fn deallocate_indices(&mut self, count: u32) {
        debug_assert!(
            count as usize <= self.indices.len(),
            "deallocating {count} indices but only {} are in use",
            self.indices.len()
        );
        let new_len = self.indices.len().saturating_sub(count as usize);
        self.indices.truncate(new_len);
    }

    /// Resolve a vertex range to a writable slice
    ///
    /// Valid only until the next allocate call or reset.
    pub fn vertices_mut(&mut self, range: VertexRange) -> &mut [TwoColorVertex] {
        let first = range.first as usize;
        let end = first + range.count as usize;
        debug_assert!(end <= self.vertices.len(), "vertex range out of bounds");
        &mut self.vertices[first..end]
    }

    /// Resolve a vertex range to a read-only slice
    pub fn vertices(&self, range: VertexRange) -> &[TwoColorVertex] {
        let first = range.first as usize;
        let end = first + range.count as usize;
        debug_assert!(end <= self.vertices.len(), "vertex range out of bounds");
        &self.vertices[first..end]
    }

    /// Resolve an index range to a writable slice
    pub fn indices_mut(&mut self, range: IndexRange) -> &mut [u16] {
        let first = range.first as usize;
        let end = first + range.count as usize;
        debug_assert!(end <= self.indices.len(), "index range out of bounds");
        &mut self.indices[first..end]
    }

    /// Resolve an index range to a read-only slice
    pub fn indices(&self, range: IndexRange) -> &[u16] {
        let first = range.first as usize;
        let end = first + range.count as usize;
        debug_assert!(end <= self.indices.len(), "index range out of bounds");
        &self.indices[first..end]
    }

    /// Vertices in use this frame
    pub fn used_vertices(&self) -> u32 {
        self.vertices.len() as u32
    }

    /// Indices in use this frame
    pub fn used_indices(&self) -> u32 {
        self.indices.len() as u32
    }

    /// Current vertex storage capacity
    pub fn vertex_capacity(&self) -> usize {
        self.vertices.capacity()
    }

    /// Current index storage capacity
    pub fn index_capacity(&self) -> usize {
        self.indices.capacity()
    }

    /// Reset used cursors for a new frame; capacity is untouched
    ///
    /// Must run only after every pending batch has been flushed.
    pub fn reset(&mut self) {
        self.vertices.clear();
        self.indices.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allocate_advances_cursor() {
        let mut pool = GeometryPool::new();
        let a = pool.allocate_vertices(4);
        let b = pool.allocate_vertices(6);
        assert_eq!(a, VertexRange { first: 0, count: 4 });
        assert_eq!(b, VertexRange { first: 4, count: 6 });
        assert_eq!(pool.used_vertices(), 10);
    }

    #[test]
    fn test_deallocate_round_trip() {
        let mut pool = GeometryPool::new();
        pool.allocate_vertices(8);
        let before = pool.used_vertices();
        pool.allocate_vertices(16);
        pool.deallocate_vertices(16);
        assert_eq!(pool.used_vertices(), before);

        pool.allocate_indices(12);
        pool.deallocate_indices(12);
        assert_eq!(pool.used_indices(), 0);
    }

    #[test]
    fn test_no_growth_when_reserved() {
        let mut pool = GeometryPool::with_capacity(64, 64);
        let capacity = pool.vertex_capacity();

        // Sums stay within the reserved bound, so no reallocation happens
        // and the base address is stable across allocations.
        let first = pool.allocate_vertices(1);
        let base = std::ptr::from_ref(&pool.vertices(first)[0]);
        for _ in 0..7 {
            pool.allocate_vertices(9);
        }
        assert_eq!(pool.vertex_capacity(), capacity);
        assert_eq!(std::ptr::from_ref(&pool.vertices(first)[0]), base);
    }

    #[test]
    fn test_reset_keeps_capacity() {
        let mut pool = GeometryPool::new();
        pool.allocate_vertices(100);
        pool.allocate_indices(300);
        let vertex_capacity = pool.vertex_capacity();
        let index_capacity = pool.index_capacity();

        pool.reset();
        assert_eq!(pool.used_vertices(), 0);
        assert_eq!(pool.used_indices(), 0);
        assert_eq!(pool.vertex_capacity(), vertex_capacity);
        assert_eq!(pool.index_capacity(), index_capacity);
    }

    #[test]
    fn test_slice_write_read() {
        let mut pool = GeometryPool::new();
        let range = pool.allocate_vertices(2);
        let verts = pool.vertices_mut(range);
        verts[1].position = [1.0, 2.0, 3.0];
        assert_eq!(pool.vertices(range)[1].position, [1.0, 2.0, 3.0]);

        let idx = pool.allocate_indices(3);
        pool.indices_mut(idx).copy_from_slice(&[0, 1, 1]);
        assert_eq!(pool.indices(idx), &[0, 1, 1]);
    }
}
