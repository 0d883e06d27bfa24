//! The wgpu backend.
//!
//! [`Context`] owns the device and queue and implements [`GraphicsDevice`];
//! [`SurfaceTarget`] owns the window surface and implements [`FrameTarget`].
//! They are kept apart so a scene can borrow the device while the window is
//! borrowed mutably for presenting.

use std::{iter, sync::Arc};

use anyhow::Context as _;
use wgpu::util::DeviceExt;
use winit::window::Window;

use crate::{
    data_structures::texture::{GpuTexture, create_default_sampler},
    error::{FrameError, ShaderError},
    pipelines::{basic, shader},
    render::{
        Elements, FramePass, FrameTarget, GraphicsDevice, ProgramDescriptor, ProgramLayout,
        TransformUniform,
    },
};

/// A compiled program plus whatever per-program bindings its layout needs.
#[derive(Debug)]
pub struct Program {
    pub layout: ProgramLayout,
    pub pipeline: wgpu::RenderPipeline,
    transforms: Option<(wgpu::Buffer, wgpu::BindGroup)>,
}

/// Colour and depth attachments for one frame.
#[derive(Debug)]
pub struct Frame {
    surface_texture: Option<wgpu::SurfaceTexture>,
    pub view: wgpu::TextureView,
    pub depth_view: wgpu::TextureView,
}

#[derive(Debug)]
pub struct Context {
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub color_format: wgpu::TextureFormat,
    texture_layout: wgpu::BindGroupLayout,
    transform_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    // stand-ins for meshes without a diffuse or specular map
    white: GpuTexture,
    black: GpuTexture,
}

impl Context {
    /// Sets up a device that can present to `window`.
    pub async fn new(window: Arc<Window>) -> anyhow::Result<(Self, SurfaceTarget)> {
        let size = window.inner_size();

        log::info!("WGPU setup");
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });
        let surface = instance
            .create_surface(window.clone())
            .context("Cannot create a surface for the window")?;
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await?;

        let surface_caps = surface.get_capabilities(&adapter);
        // The shaders assume an sRGB surface, anything else comes out too dark.
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first().copied())
            .context("The surface supports no texture format")?;
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: surface_caps.present_modes[0],
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };

        let ctx = Self::from_adapter(&adapter, surface_format).await?;
        let target = SurfaceTarget::new(window, surface, config, &ctx.device);
        Ok((ctx, target))
    }

    /// A device without a window, rendering into [`Context::offscreen_frame`]s.
    pub async fn headless(color_format: wgpu::TextureFormat) -> anyhow::Result<Self> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions::default())
            .await?;
        Self::from_adapter(&adapter, color_format).await
    }

    async fn from_adapter(adapter: &wgpu::Adapter, color_format: wgpu::TextureFormat) -> anyhow::Result<Self> {
        log::info!("device and queue");
        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("spatialize device"),
                ..Default::default()
            })
            .await?;

        let texture_layout = basic::diffuse_specular_layout(&device);
        let transform_layout = basic::transform_layout(&device);
        let sampler = create_default_sampler(&device);
        let white = GpuTexture::create_solid([255, 255, 255, 255], "default diffuse", &device, &queue);
        let black = GpuTexture::create_solid([0, 0, 0, 255], "default specular", &device, &queue);

        Ok(Self {
            device,
            queue,
            color_format,
            texture_layout,
            transform_layout,
            sampler,
            white,
            black,
        })
    }

    /// A frame backed by a plain texture instead of a window surface.
    pub fn offscreen_frame(&self, width: u32, height: u32) -> Frame {
        let texture = self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Offscreen frame"),
            size: wgpu::Extent3d {
                width: width.max(1),
                height: height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: self.color_format,
            usage: wgpu::TextureUsages::COPY_SRC | wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let depth = GpuTexture::create_depth_texture(&self.device, [width, height], "Offscreen depth");
        Frame {
            surface_texture: None,
            view: texture.create_view(&wgpu::TextureViewDescriptor::default()),
            depth_view: depth.view,
        }
    }

    fn texture_bind_group(&self, diffuse: &GpuTexture, specular: &GpuTexture) -> wgpu::BindGroup {
        self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &self.texture_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&diffuse.view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(diffuse.sampler.as_ref().unwrap_or(&self.sampler)),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::TextureView(&specular.view),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: wgpu::BindingResource::Sampler(specular.sampler.as_ref().unwrap_or(&self.sampler)),
                },
            ],
            label: Some("texture_bind_group"),
        })
    }
}

impl GraphicsDevice for Context {
    type Buffer = wgpu::Buffer;
    type Texture = GpuTexture;
    type Program = Program;
    type Frame = Frame;

    fn create_vertex_buffer(&self, label: &str, contents: &[u8]) -> wgpu::Buffer {
        self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents,
            usage: wgpu::BufferUsages::VERTEX,
        })
    }

    fn create_index_buffer(&self, label: &str, indices: &[u32]) -> wgpu::Buffer {
        self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents: bytemuck::cast_slice(indices),
            usage: wgpu::BufferUsages::INDEX,
        })
    }

    fn create_texture(&self, label: &str, image: &image::DynamicImage) -> GpuTexture {
        GpuTexture::from_image(&self.device, &self.queue, image, Some(label))
    }

    fn create_program(&self, desc: &ProgramDescriptor<'_>) -> Result<Program, ShaderError> {
        shader::validate_program(desc.source)?;
        let module = wgpu::ShaderModuleDescriptor {
            label: Some(desc.label),
            source: wgpu::ShaderSource::Wgsl(desc.source.into()),
        };
        let (pipeline, transforms) = match desc.layout {
            ProgramLayout::Positions => (
                basic::mk_flat_pipeline(&self.device, self.color_format, module),
                None,
            ),
            ProgramLayout::Textured => {
                let pipeline = basic::mk_textured_pipeline(
                    &self.device,
                    self.color_format,
                    &self.texture_layout,
                    &self.transform_layout,
                    module,
                );
                let buffer = self.device.create_buffer(&wgpu::BufferDescriptor {
                    label: Some("Transform Buffer"),
                    size: std::mem::size_of::<TransformUniform>() as wgpu::BufferAddress,
                    usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                    mapped_at_creation: false,
                });
                let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
                    layout: &self.transform_layout,
                    entries: &[wgpu::BindGroupEntry {
                        binding: 0,
                        resource: buffer.as_entire_binding(),
                    }],
                    label: Some("transform_bind_group"),
                });
                (pipeline, Some((buffer, bind_group)))
            }
        };
        log::info!("Built program {}", desc.label);
        Ok(Program {
            layout: desc.layout,
            pipeline,
            transforms,
        })
    }

    fn submit(&self, frame: &Frame, pass: &FramePass<'_, Self>) {
        if let Some((buffer, _)) = pass.program.and_then(|p| p.transforms.as_ref()) {
            let uniform = TransformUniform::from(&pass.transforms);
            self.queue.write_buffer(buffer, 0, bytemuck::cast_slice(&[uniform]));
        }
        // Bind groups have to outlive the render pass that uses them
        let textured = pass.program.is_some_and(|p| p.layout == ProgramLayout::Textured);
        let texture_groups: Vec<Option<wgpu::BindGroup>> = pass
            .draws
            .iter()
            .map(|draw| {
                textured.then(|| {
                    self.texture_bind_group(
                        draw.diffuse.unwrap_or(&self.white),
                        draw.specular.unwrap_or(&self.black),
                    )
                })
            })
            .collect();

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });
        {
            let [r, g, b, a] = pass.clear_colour;
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &frame.view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color { r, g, b, a }),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &frame.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            if let Some(program) = pass.program {
                render_pass.set_pipeline(&program.pipeline);
                if let Some((_, bind_group)) = &program.transforms {
                    render_pass.set_bind_group(1, bind_group, &[]);
                }
                for (draw, textures) in pass.draws.iter().zip(&texture_groups) {
                    if let Some(bind_group) = textures {
                        render_pass.set_bind_group(0, bind_group, &[]);
                    }
                    render_pass.set_vertex_buffer(0, draw.vertices.slice(..));
                    match draw.elements {
                        Elements::Arrays { count } => render_pass.draw(0..count, 0..1),
                        Elements::Indexed { buffer, count } => {
                            render_pass.set_index_buffer(buffer.slice(..), wgpu::IndexFormat::Uint32);
                            render_pass.draw_indexed(0..count, 0, 0..1);
                        }
                    }
                }
            }
        }
        self.queue.submit(iter::once(encoder.finish()));
    }
}

/// What to do about a surface texture that could not be acquired.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum SurfaceRecovery {
    /// Configure the surface again at the window's current size.
    Reconfigure,
    /// Drop this frame and try again on the next redraw.
    Skip,
    Fail,
}

impl SurfaceRecovery {
    fn for_error(error: &wgpu::SurfaceError) -> Self {
        match error {
            wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated => SurfaceRecovery::Reconfigure,
            wgpu::SurfaceError::OutOfMemory | wgpu::SurfaceError::Other => SurfaceRecovery::Fail,
            // timeouts and occluded windows
            _ => SurfaceRecovery::Skip,
        }
    }
}

/// The window surface, with a depth buffer that follows its size.
#[derive(Debug)]
pub struct SurfaceTarget {
    pub(crate) window: Arc<Window>,
    // shares the context's device, needed to reconfigure a lost surface
    device: wgpu::Device,
    surface: wgpu::Surface<'static>,
    pub config: wgpu::SurfaceConfiguration,
    depth_texture: GpuTexture,
    is_surface_configured: bool,
}

impl SurfaceTarget {
    fn new(
        window: Arc<Window>,
        surface: wgpu::Surface<'static>,
        config: wgpu::SurfaceConfiguration,
        device: &wgpu::Device,
    ) -> Self {
        let depth_texture =
            GpuTexture::create_depth_texture(device, [config.width, config.height], "depth_texture");
        let mut target = Self {
            window,
            device: device.clone(),
            surface,
            config,
            depth_texture,
            is_surface_configured: false,
        };
        target.resize(target.config.width, target.config.height);
        target
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.config.width = width;
            self.config.height = height;
            self.surface.configure(&self.device, &self.config);
            self.depth_texture = GpuTexture::create_depth_texture(
                &self.device,
                [self.config.width, self.config.height],
                "depth_texture",
            );
            self.is_surface_configured = true;
        }
    }

    pub fn size(&self) -> (u32, u32) {
        (self.config.width, self.config.height)
    }

    pub fn request_redraw(&self) {
        self.window.request_redraw();
    }
}

impl FrameTarget<Frame> for SurfaceTarget {
    fn acquire(&mut self) -> anyhow::Result<Frame> {
        if !self.is_surface_configured {
            return Err(FrameError::Skipped("the surface is not configured yet".to_string()).into());
        }
        let output = match self.surface.get_current_texture() {
            Ok(output) => output,
            Err(e) => match SurfaceRecovery::for_error(&e) {
                SurfaceRecovery::Reconfigure => {
                    let size = self.window.inner_size();
                    self.resize(size.width, size.height);
                    return Err(FrameError::Reconfigured(e.to_string()).into());
                }
                SurfaceRecovery::Skip => return Err(FrameError::Skipped(e.to_string()).into()),
                SurfaceRecovery::Fail => {
                    return Err(anyhow::Error::new(e).context("Failed to acquire the next surface texture"));
                }
            },
        };
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        Ok(Frame {
            surface_texture: Some(output),
            view,
            depth_view: self.depth_texture.view.clone(),
        })
    }

    fn present(&mut self, frame: Frame) {
        self.window.pre_present_notify();
        if let Some(output) = frame.surface_texture {
            output.present();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lost_and_outdated_surfaces_are_reconfigured() {
        assert_eq!(SurfaceRecovery::for_error(&wgpu::SurfaceError::Lost), SurfaceRecovery::Reconfigure);
        assert_eq!(SurfaceRecovery::for_error(&wgpu::SurfaceError::Outdated), SurfaceRecovery::Reconfigure);
    }

    #[test]
    fn timeouts_skip_the_frame() {
        assert_eq!(SurfaceRecovery::for_error(&wgpu::SurfaceError::Timeout), SurfaceRecovery::Skip);
    }

    #[test]
    fn out_of_memory_is_a_failure() {
        assert_eq!(SurfaceRecovery::for_error(&wgpu::SurfaceError::OutOfMemory), SurfaceRecovery::Fail);
    }
}
