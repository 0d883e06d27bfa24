use std::path::Path;

use crate::{
    camera::Camera,
    data_structures::{bounding_box::BoundingBox, model::Model},
    error::ImportError,
    pipelines::TEXTURED_SHADER,
    render::{
        DrawCall, Elements, FramePass, FrameTarget, GraphicsDevice, ProgramDescriptor,
        ProgramLayout, Transforms,
    },
    resources::{import_model, source_for_path, texture::{TextureCache, TextureKind}},
    scenes::Scene,
};

pub const CLEAR_COLOUR: [f64; 4] = [0.1, 0.1, 0.1, 1.0];

/// An imported model drawn with the textured program.
pub struct ModelScene<D: GraphicsDevice + ?Sized> {
    pub model: Model<D>,
    program: Option<D::Program>,
}

impl<D: GraphicsDevice + ?Sized> ModelScene<D> {
    /// Imports the OBJ or glTF file at `path` with a texture cache of its own.
    pub fn load(path: &Path, device: &D) -> Result<Self, ImportError> {
        let source = source_for_path(path)?;
        let mut cache = TextureCache::new();
        let model = import_model(source.as_ref(), path, device, &mut cache)?;
        log::info!("{} distinct textures in {:?}", cache.len(), path);
        Ok(Self::new(model, device))
    }

    /// Wraps an already imported model. A shader failure is logged and the scene
    /// keeps clearing frames without drawing anything.
    pub fn new(model: Model<D>, device: &D) -> Self {
        let program = device
            .create_program(&ProgramDescriptor {
                label: "ModelScene",
                source: TEXTURED_SHADER,
                layout: ProgramLayout::Textured,
            })
            .inspect_err(|e| log::error!("{e}"))
            .ok();
        Self { model, program }
    }

    pub fn has_program(&self) -> bool {
        self.program.is_some()
    }
}

impl<D: GraphicsDevice + ?Sized> Scene<D> for ModelScene<D> {
    fn bounding_box(&self) -> Option<BoundingBox> {
        self.model.bounding_box
    }

    fn draw(
        &mut self,
        _time: f32,
        camera: &dyn Camera,
        window: &mut dyn FrameTarget<D::Frame>,
        device: &D,
    ) -> anyhow::Result<()> {
        let frame = window.acquire()?;
        let draws = match self.program {
            Some(_) => self
                .model
                .meshes
                .iter()
                .filter(|mesh| mesh.num_elements() > 0)
                .map(|mesh| DrawCall {
                    vertices: &mesh.vertex_buffer,
                    elements: Elements::Indexed {
                        buffer: &mesh.index_buffer,
                        count: mesh.num_elements(),
                    },
                    diffuse: mesh.texture(TextureKind::Diffuse).map(|t| &t.handle),
                    specular: mesh.texture(TextureKind::Specular).map(|t| &t.handle),
                })
                .collect(),
            None => Vec::new(),
        };
        device.submit(
            &frame,
            &FramePass {
                clear_colour: CLEAR_COLOUR,
                program: self.program.as_ref(),
                transforms: Transforms {
                    model: camera.object_to_world(),
                    view: camera.view(),
                    projection: camera.projection(),
                },
                draws,
            },
        );
        window.present(frame);
        Ok(())
    }
}
