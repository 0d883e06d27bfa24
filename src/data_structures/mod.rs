//! Engine data structures: models, bounding boxes, scene graphs and textures.
//!
//! - `bounding_box` holds axis-aligned boxes and the accumulator that grows them
//! - `model` contains the flattened meshes an import produces
//! - `scene_graph` is the format-neutral output of an import source
//! - `texture` contains the wgpu texture wrapper and creation utilities

pub mod bounding_box;
pub mod model;
pub mod scene_graph;
pub mod texture;
