//! Material state and merge compatibility
//!
//! Everything the backend needs bound before a draw call is summarized here:
//! a texture, a shader program state, and a blend mode. Two draw requests may
//! be merged into one draw call exactly when these three agree (and neither
//! side forces a flush).
//!
//! The [`MaterialKey::fingerprint`] is a derived hash over the three
//! identities. It is a fast pre-filter only: fingerprint equality never
//! replaces the exact field comparison in [`MaterialKey::can_merge_with`],
//! since a hash collision must not cause geometry to be drawn with the wrong
//! texture or blend state.

use std::hash::{Hash, Hasher};

use bitflags::bitflags;
use rustc_hash::FxHasher;

/// Opaque identity of a texture owned by the rendering backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureHandle(pub u64);

/// Opaque identity of a shader program state owned by the rendering backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProgramHandle(pub u64);

/// Blend factor applied to source or destination color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlendFactor {
    /// Factor of zero
    Zero,
    /// Factor of one
    One,
    /// Source alpha
    SrcAlpha,
    /// One minus source alpha
    OneMinusSrcAlpha,
    /// Destination alpha
    DstAlpha,
    /// One minus destination alpha
    OneMinusDstAlpha,
}

/// Blend mode as a source/destination factor pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlendMode {
    /// Factor applied to the incoming fragment color
    pub src: BlendFactor,
    /// Factor applied to the framebuffer color
    pub dst: BlendFactor,
}

impl BlendMode {
    /// Standard alpha blending for premultiplied-alpha textures
    pub const ALPHA_PREMULTIPLIED: Self = Self {
        src: BlendFactor::One,
        dst: BlendFactor::OneMinusSrcAlpha,
    };

    /// Standard alpha blending for straight-alpha textures
    pub const ALPHA_NON_PREMULTIPLIED: Self = Self {
        src: BlendFactor::SrcAlpha,
        dst: BlendFactor::OneMinusSrcAlpha,
    };

    /// Additive blending
    pub const ADDITIVE: Self = Self {
        src: BlendFactor::SrcAlpha,
        dst: BlendFactor::One,
    };

    /// Multiplicative blending
    pub const MULTIPLY: Self = Self {
        src: BlendFactor::DstAlpha,
        dst: BlendFactor::OneMinusSrcAlpha,
    };
}

bitflags! {
    /// Per-command rendering flags
    ///
    /// Flags ride along to the backend but never participate in the merge
    /// decision; only the material key and the force-flush bit on the
    /// command itself do.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct CommandFlags: u32 {
        /// Vertex colors are premultiplied by alpha
        const PREMULTIPLIED_ALPHA = 1 << 0;
        /// Geometry is authored in screen space; the backend skips the
        /// camera transform
        const SCREEN_SPACE = 1 << 1;
    }
}

/// Material state relevant to the merge decision
///
/// Transform, flags, and geometry content deliberately do not appear here:
/// they never block a merge (see the caller contract on
/// [`crate::batcher::MeshBatcher::add_command`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaterialKey {
    /// Texture bound for the draw call
    pub texture: TextureHandle,
    /// Shader program state bound for the draw call
    pub program: ProgramHandle,
    /// Blend mode for the draw call
    pub blend: BlendMode,
}

impl MaterialKey {
    /// Compute the material fingerprint for this key
    ///
    /// Deterministic for equal inputs; equal keys always produce equal
    /// fingerprints. The converse does not hold (hash collisions), which is
    /// why [`Self::can_merge_with`] also compares fields exactly.
    pub fn fingerprint(&self) -> u64 {
        let mut hasher = FxHasher::default();
        self.texture.hash(&mut hasher);
        self.program.hash(&mut hasher);
        self.blend.hash(&mut hasher);
        hasher.finish()
    }

    /// Exact merge-compatibility check
    ///
    /// Callers are expected to reject on fingerprint inequality first; this
    /// confirms the fast path with a direct comparison of all three fields.
    pub fn can_merge_with(&self, other: &Self) -> bool {
        self.texture == other.texture && self.program == other.program && self.blend == other.blend
    }
}
