#![forbid(unsafe_code)]

pub mod camera;
pub mod color;
pub mod config;
pub mod core;
pub mod error;
pub mod hittable;
pub mod material;
pub mod ray;
pub mod scene;
pub mod scheduler;
pub mod shader;
pub mod sink;

pub use color::Color;
pub use config::RenderConfig;
pub use core::Frame;
pub use error::{ScanrayError, ScanrayResult};
pub use scene::Scene;
pub use scheduler::{RenderStats, RowBuffer, ScanlineTask, Strategy, partition_rows, render};
pub use shader::{PathTracer, PixelShader};
pub use sink::{PngSink, PpmSink, RowSink};
