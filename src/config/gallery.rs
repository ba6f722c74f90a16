//! Gallery behavior settings

use crate::gallery::StaleResponses;
use serde::Deserialize;

#[derive(Debug, Clone, PartialEq)]
pub struct GalleryConfig {
    /// Drop answers overtaken by a newer fetch
    pub discard_stale: bool,
    /// Page shown when none is given on the command line
    pub default_page: u32,
}

impl Default for GalleryConfig {
    fn default() -> Self {
        Self {
            discard_stale: true,
            default_page: 1,
        }
    }
}

/// `[gallery]` as loaded from the config file
#[derive(Debug, Deserialize, Default)]
pub struct FileGallery {
    pub discard_stale: Option<bool>,
    pub default_page: Option<u32>,
}

impl GalleryConfig {
    pub fn from_file(file: Option<FileGallery>) -> Self {
        let file = file.unwrap_or_default();
        let defaults = Self::default();

        Self {
            discard_stale: file.discard_stale.unwrap_or(defaults.discard_stale),
            default_page: file.default_page.unwrap_or(defaults.default_page),
        }
    }

    pub fn stale_responses(&self) -> StaleResponses {
        if self.discard_stale {
            StaleResponses::Discard
        } else {
            StaleResponses::Apply
        }
    }
}
