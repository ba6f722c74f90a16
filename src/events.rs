// Events emitted by observable collections
//
// Collections broadcast these to any number of observers (pagination
// controls, the CLI printer). Using an enum allows pattern matching and
// keeps the JSON form self-describing.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Pagination metadata sent with every gallery page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageInfo {
    pub pages_count: u32,
    pub current_page: u32,
}

/// Main event type emitted by the gallery collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")] // {"type": "pages_changed", ...}
pub enum CollectionEvent {
    /// Contents were replaced wholesale
    Reset {
        timestamp: DateTime<Utc>,
        len: usize,
    },

    /// A new page arrived
    PagesChanged {
        timestamp: DateTime<Utc>,
        #[serde(flatten)]
        pages: PageInfo,
    },
}

impl CollectionEvent {
    pub fn reset(len: usize) -> Self {
        Self::Reset {
            timestamp: Utc::now(),
            len,
        }
    }

    pub fn pages_changed(pages: PageInfo) -> Self {
        Self::PagesChanged {
            timestamp: Utc::now(),
            pages,
        }
    }

    /// Pagination payload, for `PagesChanged` only
    pub fn pages(&self) -> Option<PageInfo> {
        match self {
            Self::PagesChanged { pages, .. } => Some(*pages),
            Self::Reset { .. } => None,
        }
    }
}

/// Generate a process-unique id, used to tell freshly built instances apart
pub fn generate_id() -> u64 {
    use std::sync::atomic::{AtomicU64, Ordering};
    static COUNTER: AtomicU64 = AtomicU64::new(1);

    COUNTER.fetch_add(1, Ordering::Relaxed)
}
