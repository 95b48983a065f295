//! Math utilities and types
//!
//! Provides the fundamental math types used by the batching engine.

pub use nalgebra::{Matrix4, Vector2, Vector3};

/// 2D vector type
pub type Vec2 = Vector2<f32>;

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// 4x4 matrix type, used for model-view transforms
pub type Mat4 = Matrix4<f32>;
