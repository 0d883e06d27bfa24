//! Command line configuration of the viewer.

use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Clone, Debug, PartialEq)]
#[command(name = "spatialize", version, about = "Shows an OBJ or glTF model, or the example triangle")]
pub struct Config {
    /// OBJ or glTF model to load. Without one the example triangle is drawn.
    pub model: Option<PathBuf>,

    /// Window width in pixels
    #[arg(long, default_value_t = 1280)]
    pub width: u32,

    /// Window height in pixels
    #[arg(long, default_value_t = 720)]
    pub height: u32,

    #[arg(long, default_value = "spatialize")]
    pub title: String,

    /// Vertical field of view in degrees
    #[arg(long, default_value_t = 45.0)]
    pub fov: f32,

    /// Camera distance from the centre of the scene's bounding box. Defaults to
    /// whatever fits the whole box into view.
    #[arg(long)]
    pub distance: Option<f32>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            model: None,
            width: 1280,
            height: 720,
            title: "spatialize".to_string(),
            fov: 45.0,
            distance: None,
        }
    }
}
