// Container engine orchestration: runtime probe, image and container resolution.

pub mod engine;
mod resolver;
pub mod runner;
pub mod types;

pub use engine::ContainerEngine;
pub use runner::{CliRunner, ProcessRunner};
pub use types::{ContainerAction, PortMapping, ProcessOutput};
