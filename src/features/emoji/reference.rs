//! Emoji token parsing
//!
//! Turns the raw `/emoji` argument into an [`EmojiReference`].
//!
//! - **Version**: 1.1.0
//! - **Since**: 1.0.0
//!
//! ## Changelog
//! - 1.1.0: Report CLDR names for pictographs
//! - 1.0.0: Initial implementation

use regex::Regex;
use std::sync::OnceLock;

use super::error::EmojiError;

/// Base URL of the Discord CDN
pub const CDN_BASE_URL: &str = "https://cdn.discordapp.com";

/// Tokens longer than this (in chars) are never looked up as pictographs
pub const PICTOGRAPH_MAX_CHARS: usize = 4;

static CUSTOM_EMOJI_PATTERN: OnceLock<Regex> = OnceLock::new();

fn custom_emoji_pattern() -> &'static Regex {
    CUSTOM_EMOJI_PATTERN
        .get_or_init(|| Regex::new(r"^<(a)?:(\w+):(\d+)>").expect("custom emoji pattern compiles"))
}

/// A server-hosted emoji referenced as `<:name:id>` or `<a:name:id>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomEmoji {
    pub name: String,
    pub id: u64,
    pub animated: bool,
}

impl CustomEmoji {
    pub fn extension(&self) -> &'static str {
        if self.animated {
            "gif"
        } else {
            "png"
        }
    }

    /// MIME type matching [`Self::extension`]
    pub fn mime_type(&self) -> &'static str {
        if self.animated {
            "image/gif"
        } else {
            "image/png"
        }
    }

    /// CDN address of the emoji image
    pub fn source_url(&self) -> String {
        format!("{CDN_BASE_URL}/emojis/{}.{}", self.id, self.extension())
    }
}

/// What a token resolved to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmojiReference {
    Custom(CustomEmoji),
    Unicode { sequence: String },
}

/// Parse a user token.
///
/// The custom form is tried first. A token that starts like a custom emoji but carries an id
/// that does not fit in 64 bits is rejected rather than retried as a pictograph.
pub fn parse_token(token: &str) -> Result<EmojiReference, EmojiError> {
    if let Some(caps) = custom_emoji_pattern().captures(token) {
        let id = caps[3].parse::<u64>().map_err(|_| EmojiError::InvalidFormat)?;
        return Ok(EmojiReference::Custom(CustomEmoji {
            name: caps[2].to_string(),
            id,
            animated: caps.get(1).is_some(),
        }));
    }

    if token.chars().count() <= PICTOGRAPH_MAX_CHARS && is_single_pictograph(token) {
        return Ok(EmojiReference::Unicode {
            sequence: token.to_string(),
        });
    }

    Err(EmojiError::InvalidFormat)
}

fn is_single_pictograph(token: &str) -> bool {
    !token.is_empty() && emojis::get(token).is_some()
}

/// `U+1F600 U+FE0F` style rendering of every scalar in `sequence`
pub fn codepoints(sequence: &str) -> String {
    sequence
        .chars()
        .map(|c| format!("U+{:04X}", c as u32))
        .collect::<Vec<_>>()
        .join(" ")
}

/// CLDR short name of a pictograph, when the emoji table knows it
pub fn pictograph_name(sequence: &str) -> Option<&'static str> {
    emojis::get(sequence).map(|e| e.name())
}
