use cgmath::Point3;

use crate::{
    camera::Camera,
    data_structures::bounding_box::BoundingBox,
    error::ShaderError,
    pipelines::FLAT_SHADER,
    render::{
        DrawCall, Elements, FramePass, FrameTarget, GraphicsDevice, ProgramDescriptor,
        ProgramLayout, Transforms,
    },
    scenes::Scene,
};

pub const CLEAR_COLOUR: [f64; 4] = [0.2, 0.3, 0.3, 1.0];

const TRIANGLE: [[f32; 3]; 3] = [[-0.5, -0.5, 0.0], [0.5, -0.5, 0.0], [0.0, 0.5, 0.0]];

/// The smallest possible scene: one orange triangle in clip space.
pub struct ExampleCube<D: GraphicsDevice + ?Sized> {
    program: D::Program,
    vertices: D::Buffer,
}

impl<D: GraphicsDevice + ?Sized> ExampleCube<D> {
    pub fn new(device: &D) -> Result<Self, ShaderError> {
        Self::with_shader(device, FLAT_SHADER)
    }

    /// Builds the scene around a custom WGSL module with the flat layout.
    ///
    /// Any compile or link failure is logged and returned, the scene cannot run
    /// without its program.
    pub fn with_shader(device: &D, source: &str) -> Result<Self, ShaderError> {
        let program = device
            .create_program(&ProgramDescriptor {
                label: "ExampleCube",
                source,
                layout: ProgramLayout::Positions,
            })
            .inspect_err(|e| log::error!("{e}"))?;
        let vertices = device.create_vertex_buffer("ExampleCube Vertex Buffer", bytemuck::cast_slice(&TRIANGLE));
        Ok(Self { program, vertices })
    }
}

impl<D: GraphicsDevice + ?Sized> Scene<D> for ExampleCube<D> {
    fn bounding_box(&self) -> Option<BoundingBox> {
        let r = std::f32::consts::SQRT_2;
        Some(BoundingBox::new(Point3::new(-r, -r, -r), Point3::new(r, r, r)))
    }

    fn draw(
        &mut self,
        _time: f32,
        _camera: &dyn Camera,
        window: &mut dyn FrameTarget<D::Frame>,
        device: &D,
    ) -> anyhow::Result<()> {
        let frame = window.acquire()?;
        let draws = vec![DrawCall {
            vertices: &self.vertices,
            elements: Elements::Arrays { count: TRIANGLE.len() as u32 },
            diffuse: None,
            specular: None,
        }];
        // positions are already in clip space
        device.submit(
            &frame,
            &FramePass {
                clear_colour: CLEAR_COLOUR,
                program: Some(&self.program),
                transforms: Transforms::default(),
                draws,
            },
        );
        window.present(frame);
        Ok(())
    }
}
