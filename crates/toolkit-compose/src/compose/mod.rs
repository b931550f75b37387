//! Docker Compose source schema

mod model;
mod parse;
mod render;

pub use model::{
    ComposeFile, Dependency, EnvVar, PortMapping, Service, VolumeKind, VolumeMount,
};
pub use parse::{parse_compose, parse_compose_value};
pub use render::{compose_to_value, render_compose};
