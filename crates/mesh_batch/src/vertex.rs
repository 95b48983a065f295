//! Vertex layout for two-color tinted skeletal meshes
//!
//! A single vertex format is used for everything the batcher touches. The
//! second ("dark") color drives the two-color tint effect common in skeletal
//! animation runtimes: the fragment shader blends towards it in shadowed
//! regions instead of multiplying down to black.

use bytemuck::{Pod, Zeroable};

/// Vertex data for a two-color tinted, textured 2D mesh
///
/// # Memory Layout
/// `#[repr(C)]` guarantees field order and makes the struct safe to upload
/// to GPU-visible buffers as raw bytes via [`bytemuck`]. Colors are packed
/// as 4 bytes each (RGBA, 0-255), matching typical 2D pipeline attribute
/// formats and keeping the vertex at 28 bytes.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct TwoColorVertex {
    /// Position in 3D space (z is used for layering, not perspective)
    pub position: [f32; 3],

    /// Primary tint color (RGBA, premultiplication governed by command flags)
    pub color: [u8; 4],

    /// Secondary "dark" tint color (RGBA); alpha channel is unused by shaders
    pub dark_color: [u8; 4],

    /// Texture coordinates
    pub tex_coord: [f32; 2],
}

impl TwoColorVertex {
    /// A zeroed vertex, used to fill freshly grown pool storage
    pub const ZERO: Self = Self {
        position: [0.0; 3],
        color: [0; 4],
        dark_color: [0; 4],
        tex_coord: [0.0; 2],
    };
}

impl Default for TwoColorVertex {
    fn default() -> Self {
        Self::ZERO
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vertex_is_pod() {
        let v = TwoColorVertex {
            position: [1.0, 2.0, 3.0],
            color: [255, 128, 64, 255],
            dark_color: [10, 20, 30, 0],
            tex_coord: [0.5, 0.25],
        };
        let bytes: &[u8] = bytemuck::bytes_of(&v);
        assert_eq!(bytes.len(), std::mem::size_of::<TwoColorVertex>());

        let back: TwoColorVertex = bytemuck::pod_read_unaligned(bytes);
        assert_eq!(back, v);
    }

    #[test]
    fn test_vertex_size() {
        // 3 floats + 4 bytes + 4 bytes + 2 floats
        assert_eq!(std::mem::size_of::<TwoColorVertex>(), 28);
    }
}
