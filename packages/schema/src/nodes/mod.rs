//! Node kinds shipped with the editor

pub mod custom_button;
pub mod image_with_caption;
pub mod vimeo_video;

pub use custom_button::{
    custom_button, ButtonAlignment, ButtonColor, ButtonPatch, ButtonSize, CUSTOM_BUTTON,
};
pub use image_with_caption::{image_with_caption, IMAGE_WITH_CAPTION};
pub use vimeo_video::{find_vimeo_url, vimeo_embed_src, vimeo_video, VimeoOptions, VIMEO_VIDEO};

use crate::error::ConfigError;
use crate::registry::SchemaRegistry;

/// Registry holding every built-in kind
pub fn builtin_registry(vimeo: &VimeoOptions) -> Result<SchemaRegistry, ConfigError> {
    let mut registry = SchemaRegistry::new();
    registry.register(custom_button()?)?;
    registry.register(vimeo_video(vimeo)?)?;
    registry.register(image_with_caption()?)?;
    Ok(registry)
}
