//! spatialize
//!
//! A small VR-style scene viewer. A model file is imported into a flat list of
//! GPU meshes with a bounding box around all of their vertices, and a scene
//! draws those meshes into whatever frame target the host provides. Scenes only
//! see the [`render::GraphicsDevice`] and [`render::FrameTarget`] traits, so the
//! wgpu backend in [`context`] can be swapped for anything else.
//!
//! High-level modules
//! - `camera`: the camera trait scenes read their matrices from
//! - `config`: command line options of the viewer
//! - `context`: wgpu device, surface and frame submission
//! - `data_structures`: meshes, bounding boxes, scene graphs and GPU textures
//! - `error`: import, shader and resource errors
//! - `flow`: the winit event loop
//! - `pipelines`: WGSL shaders, their validation and the wgpu pipelines
//! - `render`: the backend-neutral rendering interfaces
//! - `resources`: the importer, its OBJ and glTF sources and the texture cache
//! - `scenes`: the example triangle and the model scene
//!

pub mod camera;
pub mod config;
pub mod context;
pub mod data_structures;
pub mod error;
pub mod flow;
pub mod pipelines;
pub mod render;
pub mod resources;
pub mod scenes;
