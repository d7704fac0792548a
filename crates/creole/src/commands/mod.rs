//! CLI command implementations.

pub(crate) mod export;
pub(crate) mod render;

pub(crate) use export::ExportArgs;
pub(crate) use render::RenderArgs;
