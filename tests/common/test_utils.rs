use std::{
    cell::{Cell, RefCell},
    fs,
    path::{Path, PathBuf},
};

use spatialize::{
    error::ShaderError,
    pipelines::shader::validate_program,
    render::{Elements, FramePass, FrameTarget, GraphicsDevice, ProgramDescriptor, Transforms},
};

/// Opaque id standing in for a GPU object.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Handle(pub u32);

#[derive(Clone, Debug, PartialEq)]
pub enum RecordedElements {
    Arrays(u32),
    Indexed { buffer: Handle, count: u32 },
}

#[derive(Clone, Debug, PartialEq)]
pub struct RecordedDraw {
    pub vertices: Handle,
    pub elements: RecordedElements,
    pub diffuse: Option<Handle>,
    pub specular: Option<Handle>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct RecordedPass {
    pub frame: u32,
    pub clear_colour: [f64; 4],
    pub program: Option<Handle>,
    pub transforms: Transforms,
    pub draws: Vec<RecordedDraw>,
}

/// A [`GraphicsDevice`] that keeps everything it is asked to do.
///
/// Programs are run through the same WGSL validation as the wgpu backend, so a
/// broken shader fails here as well.
#[derive(Debug, Default)]
pub struct RecordingDevice {
    next_id: Cell<u32>,
    pub vertex_buffers: RefCell<Vec<(String, Vec<u8>)>>,
    pub index_buffers: RefCell<Vec<(String, Vec<u32>)>>,
    pub textures: RefCell<Vec<(String, (u32, u32))>>,
    pub programs: RefCell<Vec<String>>,
    pub passes: RefCell<Vec<RecordedPass>>,
}

impl RecordingDevice {
    pub fn new() -> Self {
        Self::default()
    }

    fn next(&self) -> Handle {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        Handle(id)
    }

    pub fn texture_uploads(&self) -> usize {
        self.textures.borrow().len()
    }

    pub fn uploaded_texture_labels(&self) -> Vec<String> {
        self.textures.borrow().iter().map(|(label, _)| label.clone()).collect()
    }
}

impl GraphicsDevice for RecordingDevice {
    type Buffer = Handle;
    type Texture = Handle;
    type Program = Handle;
    type Frame = u32;

    fn create_vertex_buffer(&self, label: &str, contents: &[u8]) -> Handle {
        self.vertex_buffers
            .borrow_mut()
            .push((label.to_string(), contents.to_vec()));
        self.next()
    }

    fn create_index_buffer(&self, label: &str, indices: &[u32]) -> Handle {
        self.index_buffers
            .borrow_mut()
            .push((label.to_string(), indices.to_vec()));
        self.next()
    }

    fn create_texture(&self, label: &str, image: &image::DynamicImage) -> Handle {
        self.textures
            .borrow_mut()
            .push((label.to_string(), (image.width(), image.height())));
        self.next()
    }

    fn create_program(&self, desc: &ProgramDescriptor<'_>) -> Result<Handle, ShaderError> {
        validate_program(desc.source)?;
        self.programs.borrow_mut().push(desc.label.to_string());
        Ok(self.next())
    }

    fn submit(&self, frame: &u32, pass: &FramePass<'_, Self>) {
        let draws = pass
            .draws
            .iter()
            .map(|draw| RecordedDraw {
                vertices: *draw.vertices,
                elements: match draw.elements {
                    Elements::Arrays { count } => RecordedElements::Arrays(count),
                    Elements::Indexed { buffer, count } => RecordedElements::Indexed {
                        buffer: *buffer,
                        count,
                    },
                },
                diffuse: draw.diffuse.copied(),
                specular: draw.specular.copied(),
            })
            .collect();
        self.passes.borrow_mut().push(RecordedPass {
            frame: *frame,
            clear_colour: pass.clear_colour,
            program: pass.program.copied(),
            transforms: pass.transforms,
            draws,
        });
    }
}

/// Hands out numbered frames and remembers which ones were presented.
#[derive(Debug, Default)]
pub struct RecordingTarget {
    pub acquired: u32,
    pub presented: Vec<u32>,
    pub lost: bool,
}

impl FrameTarget<u32> for RecordingTarget {
    fn acquire(&mut self) -> anyhow::Result<u32> {
        anyhow::ensure!(!self.lost, "surface lost");
        self.acquired += 1;
        Ok(self.acquired)
    }

    fn present(&mut self, frame: u32) {
        self.presented.push(frame);
    }
}

pub fn write_file(dir: &Path, name: &str, contents: impl AsRef<[u8]>) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).unwrap();
    path
}

pub fn write_png(dir: &Path, name: &str, width: u32, height: u32) -> PathBuf {
    let path = dir.join(name);
    image::RgbaImage::from_pixel(width, height, image::Rgba([200, 120, 40, 255]))
        .save(&path)
        .unwrap();
    path
}

pub const TRIANGLE_OBJ: &str = "\
o Triangle
v 0.0 0.0 0.0
v 1.0 0.0 0.0
v 0.0 1.0 0.0
vt 0.0 0.0
vt 1.0 0.0
vt 0.0 1.0
vn 0.0 0.0 1.0
f 1/1/1 2/2/1 3/3/1
";
