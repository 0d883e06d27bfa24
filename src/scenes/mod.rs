//! Scenes the runner can show.
//!
//! - [`cube::ExampleCube`] draws a single triangle with a fixed shader
//! - [`model::ModelScene`] draws a model imported from disk

pub mod cube;
pub mod model;

use crate::{
    camera::Camera,
    data_structures::bounding_box::BoundingBox,
    render::{FrameTarget, GraphicsDevice},
};

pub trait Scene<D: GraphicsDevice + ?Sized> {
    /// Box around everything the scene draws, in object space. `None` when there
    /// is nothing to draw.
    fn bounding_box(&self) -> Option<BoundingBox>;

    /// Renders one frame into `window` and presents it. `time` is the number of
    /// seconds since the scene started.
    fn draw(
        &mut self,
        time: f32,
        camera: &dyn Camera,
        window: &mut dyn FrameTarget<D::Frame>,
        device: &D,
    ) -> anyhow::Result<()>;
}
