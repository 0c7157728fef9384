//! User-facing failures of the emoji command and the add button.

use std::fmt;

use thiserror::Error;

/// Which slot pool an emoji counts against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotCategory {
    Animated,
    Static,
}

impl SlotCategory {
    pub fn for_animated(animated: bool) -> Self {
        if animated {
            SlotCategory::Animated
        } else {
            SlotCategory::Static
        }
    }
}

impl fmt::Display for SlotCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SlotCategory::Animated => f.write_str("animated"),
            SlotCategory::Static => f.write_str("static"),
        }
    }
}

/// Every failure is recovered where it happens and shown to the requester as a private card.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EmojiError {
    #[error("Invalid emoji format. Use a Unicode emoji or a custom emoji in the form `<:name:id>`")]
    InvalidFormat,

    #[error("This button is only available to the server owner.")]
    PermissionDenied,

    #[error("The server has no room for a new {category} emoji. ({used}/{limit})")]
    SlotLimitExceeded {
        category: SlotCategory,
        used: usize,
        limit: usize,
    },

    #[error("Failed to download the emoji image: {0}")]
    DownloadFailed(String),

    #[error("Error: ```{0}```")]
    PlatformRejected(String),

    #[error("Something went wrong: ```{0}```")]
    Unexpected(String),
}

impl From<anyhow::Error> for EmojiError {
    fn from(err: anyhow::Error) -> Self {
        EmojiError::Unexpected(err.to_string())
    }
}
