//! Error types shared by the importer, texture resolution and shader setup.

use std::path::PathBuf;

use thiserror::Error;

/// The model could not be turned into a scene. Nothing is produced when this is
/// returned, the load is aborted as a whole.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("could not read model {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("could not parse model {path:?}: {message}")]
    Parse { path: PathBuf, message: String },
    #[error("model {path:?} has no root node")]
    MissingRoot { path: PathBuf },
    #[error("node {node:?} references mesh {index}, but the file only has {available} meshes")]
    InvalidMeshIndex {
        node: String,
        index: usize,
        available: usize,
    },
    #[error("mesh {mesh:?} has a face index {index} out of range for {vertices} vertices")]
    InvalidFaceIndex {
        mesh: String,
        index: u32,
        vertices: usize,
    },
    #[error("mesh {mesh:?} has a non-finite position at vertex {vertex}")]
    NonFinitePosition { mesh: String, vertex: usize },
    #[error("no import source for {path:?}")]
    UnsupportedFormat { path: PathBuf },
}

/// Which programmable stage a shader belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl std::fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ShaderStage::Vertex => f.write_str("vertex"),
            ShaderStage::Fragment => f.write_str("fragment"),
        }
    }
}

#[derive(Debug, Error)]
pub enum ShaderError {
    #[error("{stage} shader compiling failed\n{log}")]
    Compile { stage: ShaderStage, log: String },
    #[error("shader program linking failed\n{log}")]
    Link { log: String },
}

/// No frame was drawn this time, but the target can be drawn to again.
#[derive(Debug, Error)]
pub enum FrameError {
    #[error("surface reconfigured after: {0}")]
    Reconfigured(String),
    #[error("frame skipped: {0}")]
    Skipped(String),
}

/// A texture image could not be loaded. The importer logs these and keeps going
/// without the texture.
#[derive(Debug, Error)]
pub enum ResourceError {
    #[error("could not read texture {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("could not decode texture {path:?}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}
