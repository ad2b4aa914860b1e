//! Embedded Vimeo player

use crate::attribute::{AttrKind, AttributeSpec};
use crate::descriptor::{Marker, MarkupRule, NodeTypeDescriptor};
use crate::error::ConfigError;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::ops::Range;
use std::sync::LazyLock;

pub const VIMEO_VIDEO: &str = "vimeoVideo";

const PLAYER_URL: &str = "https://player.vimeo.com/video/";

// Page, channel, group, album and player URLs all end in the numeric id
const VIMEO_URL_PATTERN: &str = r"(?i)(?:https?:)?//(?:www\.)?(?:vimeo\.com/(?:channels/[\w]+/|groups/[\w]+/videos/|album/\d+/video/)?|player\.vimeo\.com/video/)(\d+)";

/// Player dimensions written on every embed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VimeoOptions {
    pub width: u32,
    pub height: u32,
}

impl Default for VimeoOptions {
    fn default() -> Self {
        Self {
            width: 640,
            height: 360,
        }
    }
}

pub fn vimeo_video(options: &VimeoOptions) -> Result<NodeTypeDescriptor, ConfigError> {
    NodeTypeDescriptor::builder(VIMEO_VIDEO)
        .rule(MarkupRule::new("iframe").with_marker(Marker::present("data-vimeo")))
        .rule(MarkupRule::new("iframe").with_marker(Marker::contains("src", "player.vimeo.com/video/")))
        .atomic(true)
        .id_prefix("vimeo")
        .static_attribute("frameborder", "0")
        .static_attribute("allow", "autoplay; fullscreen")
        .static_attribute("allowfullscreen", "")
        .attribute(AttributeSpec::text("src", Value::Null).markup_attribute("src"))
        .attribute(
            AttributeSpec::new("width", AttrKind::Integer, options.width).markup_attribute("width"),
        )
        .attribute(
            AttributeSpec::new("height", AttrKind::Integer, options.height)
                .markup_attribute("height"),
        )
        .build()
}

static VIMEO_URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(VIMEO_URL_PATTERN).expect("valid Vimeo URL pattern"));

/// Player URL for any recognizable Vimeo link, `None` otherwise
pub fn vimeo_embed_src(url: &str) -> Option<String> {
    VIMEO_URL.captures(url.trim()).and_then(|captures| player_src(&captures))
}

/// Last Vimeo link in `text`: its byte range and the player URL it maps to
pub fn find_vimeo_url(text: &str) -> Option<(Range<usize>, String)> {
    let captures = VIMEO_URL.captures_iter(text).last()?;
    let range = captures.get(0)?.range();
    Some((range, player_src(&captures)?))
}

fn player_src(captures: &Captures<'_>) -> Option<String> {
    let id = captures.get(1)?.as_str();
    Some(format!("{}{}", PLAYER_URL, id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use richnode_markup::MarkupElement;
    use serde_json::json;

    #[test]
    fn test_embed_src_from_url_forms() {
        let expected = Some("https://player.vimeo.com/video/76979871".to_string());

        assert_eq!(vimeo_embed_src("https://vimeo.com/76979871"), expected);
        assert_eq!(vimeo_embed_src("http://www.vimeo.com/76979871"), expected);
        assert_eq!(vimeo_embed_src("https://vimeo.com/channels/staffpicks/76979871"), expected);
        assert_eq!(vimeo_embed_src("https://vimeo.com/groups/shortfilms/videos/76979871"), expected);
        assert_eq!(vimeo_embed_src("https://vimeo.com/album/2222/video/76979871"), expected);
        assert_eq!(vimeo_embed_src("//player.vimeo.com/video/76979871?h=abc"), expected);
        assert_eq!(vimeo_embed_src("HTTPS://VIMEO.COM/76979871"), expected);
    }

    #[test]
    fn test_embed_src_rejects_other_urls() {
        assert_eq!(vimeo_embed_src("https://youtube.com/watch?v=xyz"), None);
        assert_eq!(vimeo_embed_src("https://vimeo.com/about"), None);
        assert_eq!(vimeo_embed_src(""), None);
    }

    #[test]
    fn test_url_pattern_compiles() {
        assert!(Regex::new(VIMEO_URL_PATTERN).is_ok());
        assert!(LazyLock::force(&VIMEO_URL).is_match("https://vimeo.com/1"));
    }

    #[test]
    fn test_find_last_url_in_text() {
        let text = "see https://vimeo.com/1 and https://vimeo.com/22";

        let (range, src) = find_vimeo_url(text).unwrap();

        assert_eq!(&text[range.clone()], "https://vimeo.com/22");
        assert_eq!(range.end, text.len());
        assert_eq!(src, "https://player.vimeo.com/video/22");
        assert_eq!(find_vimeo_url("no links here"), None);
    }

    #[test]
    fn test_encode_uses_configured_size() {
        let descriptor = vimeo_video(&VimeoOptions {
            width: 800,
            height: 450,
        })
        .unwrap();
        let instance = descriptor.construct(&Default::default()).unwrap();

        let element = descriptor.encode(&instance);

        assert_eq!(element.tag, "iframe");
        assert_eq!(element.attr("data-vimeo"), Some(""));
        assert_eq!(element.attr("frameborder"), Some("0"));
        assert_eq!(element.attr("width"), Some("800"));
        assert_eq!(element.attr("height"), Some("450"));
        assert_eq!(element.attr("src"), None);
    }

    #[test]
    fn test_decode_bare_player_iframe() {
        let descriptor = vimeo_video(&VimeoOptions::default()).unwrap();
        let element = MarkupElement::new("iframe")
            .with_attr("src", "https://player.vimeo.com/video/42")
            .with_attr("width", "100%");

        let instance = descriptor.decode(&element).unwrap();

        assert_eq!(instance.attr("src"), Some(&json!("https://player.vimeo.com/video/42")));
        assert_eq!(instance.attr("width"), Some(&json!(640)));
        assert_eq!(instance.attr("height"), Some(&json!(360)));
    }
}
