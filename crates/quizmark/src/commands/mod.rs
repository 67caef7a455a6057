//! CLI command implementations.

pub(crate) mod render;
pub(crate) mod themes;

pub(crate) use render::RenderArgs;
pub(crate) use themes::ThemesArgs;
