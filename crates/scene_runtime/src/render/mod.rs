//! Scene-side rendering data
//!
//! Cameras and lights as parsed from scene descriptions. Submitting frames
//! is left to the renderer bound to the "Render" task.

pub mod camera;
pub mod light;

pub use camera::{Camera, CameraDescription};
pub use light::{Light, LightDescription};
