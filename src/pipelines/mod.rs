//! Render pipelines and the WGSL they are built from.
//!
//! - `basic` builds the wgpu pipelines and their bind group layouts
//! - `shader` validates WGSL with naga before a pipeline is created

pub mod basic;
pub mod shader;

/// Positions straight to clip space, solid orange.
pub const FLAT_SHADER: &str = include_str!("flat.wgsl");

/// Imported meshes: transforms uniform, diffuse and specular maps, one fixed light.
pub const TEXTURED_SHADER: &str = include_str!("model.wgsl");
