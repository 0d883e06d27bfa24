//! Render interfaces between scenes and the graphics backend.
//!
//! Scenes never talk to a graphics API directly. They allocate resources through
//! a [`GraphicsDevice`], describe each frame as a [`FramePass`] and hand the
//! finished frame to a [`FrameTarget`] for presentation.
//!
//! # Key types
//!
//! - [`GraphicsDevice`] allocates buffers, textures and programs and submits passes
//! - [`FrameTarget`] hands out frames to draw into and presents them
//! - [`FramePass`] is one cleared frame with a program, transforms and draw calls
//! - [`DrawCall`] draws either a vertex range or an index buffer, with optional textures
//!

use cgmath::{Matrix4, SquareMatrix};

use crate::{data_structures::model::ModelVertex, error::ShaderError};

/// Vertex layouts a program can be built for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProgramLayout {
    /// Tightly packed `vec3<f32>` positions, no uniforms and no textures.
    Positions,
    /// [`ModelVertex`] data, a transform uniform and a diffuse/specular texture pair.
    Textured,
}

/// Source of a program. Both stages live in one WGSL module with the entry points
/// `vs_main` and `fs_main`.
#[derive(Clone, Copy, Debug)]
pub struct ProgramDescriptor<'a> {
    pub label: &'a str,
    pub source: &'a str,
    pub layout: ProgramLayout,
}

/// Model, view and projection matrices for one pass.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transforms {
    pub model: Matrix4<f32>,
    pub view: Matrix4<f32>,
    pub projection: Matrix4<f32>,
}

impl Default for Transforms {
    fn default() -> Self {
        Self {
            model: Matrix4::identity(),
            view: Matrix4::identity(),
            projection: Matrix4::identity(),
        }
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct TransformUniform {
    pub model: [[f32; 4]; 4],
    pub view: [[f32; 4]; 4],
    pub projection: [[f32; 4]; 4],
}

impl From<&Transforms> for TransformUniform {
    fn from(t: &Transforms) -> Self {
        Self {
            model: t.model.into(),
            view: t.view.into(),
            projection: t.projection.into(),
        }
    }
}

pub enum Elements<'a, B> {
    /// Draw `count` vertices straight from the vertex buffer.
    Arrays { count: u32 },
    /// Draw `count` `u32` indices from `buffer`.
    Indexed { buffer: &'a B, count: u32 },
}

pub struct DrawCall<'a, D: GraphicsDevice + ?Sized> {
    pub vertices: &'a D::Buffer,
    pub elements: Elements<'a, D::Buffer>,
    pub diffuse: Option<&'a D::Texture>,
    pub specular: Option<&'a D::Texture>,
}

/// One frame's worth of work: clear, then run every draw call with `program`.
///
/// `program` is `None` when there is nothing usable to draw with; the frame is
/// still cleared.
pub struct FramePass<'a, D: GraphicsDevice + ?Sized> {
    pub clear_colour: [f64; 4],
    pub program: Option<&'a D::Program>,
    pub transforms: Transforms,
    pub draws: Vec<DrawCall<'a, D>>,
}

/// Allocation and submission on the GPU.
///
/// The handle types release their GPU memory on drop, so whoever owns a handle
/// owns the resource.
pub trait GraphicsDevice {
    type Buffer;
    type Texture;
    type Program;
    type Frame;

    fn create_vertex_buffer(&self, label: &str, contents: &[u8]) -> Self::Buffer;

    fn create_index_buffer(&self, label: &str, indices: &[u32]) -> Self::Buffer;

    fn create_texture(&self, label: &str, image: &image::DynamicImage) -> Self::Texture;

    fn create_program(&self, desc: &ProgramDescriptor<'_>) -> Result<Self::Program, ShaderError>;

    fn submit(&self, frame: &Self::Frame, pass: &FramePass<'_, Self>);

    fn create_model_vertex_buffer(&self, label: &str, vertices: &[ModelVertex]) -> Self::Buffer {
        self.create_vertex_buffer(label, bytemuck::cast_slice(vertices))
    }
}

/// Something that frames can be drawn into and presented, usually a window.
pub trait FrameTarget<F> {
    fn acquire(&mut self) -> anyhow::Result<F>;

    /// Shows the frame. Corresponds to swapping buffers.
    fn present(&mut self, frame: F);
}
