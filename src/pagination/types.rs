//! Pagination types
//!
//! Defines the cursor and the classification of a fetch result.

use crate::http::FetchOutcome;
use crate::types::Page;

/// Offset/limit pagination state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    /// Offset of the next page to request
    pub offset: u64,
    /// Records per page
    pub limit: u64,
}

impl Cursor {
    /// Create a new cursor
    pub fn new(offset: u64, limit: u64) -> Self {
        Self { offset, limit }
    }

    /// Move to the next page
    pub fn advance(&mut self) {
        self.offset = self.offset.saturating_add(self.limit);
    }
}

/// Result of one page fetch as seen by the sync engine.
///
/// "The server said there is nothing left" and "we could not find out"
/// must never collapse into the same value, so there are three variants.
#[derive(Debug, Clone, PartialEq)]
pub enum PageOutcome {
    /// A successful, non-empty page
    Records(Page),
    /// A successful empty page: the dataset is exhausted
    Exhausted,
    /// Every attempt failed; `status` is the last HTTP status, if any
    Failed {
        /// Last status code received, `None` if no response ever arrived
        status: Option<u16>,
    },
}

impl PageOutcome {
    /// Check if this outcome ends pagination
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Exhausted)
    }

    /// Check if this outcome is a failed fetch
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }

    /// Number of records carried by this outcome
    pub fn len(&self) -> usize {
        match self {
            Self::Records(page) => page.len(),
            _ => 0,
        }
    }

    /// Check if this outcome carries no records
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<FetchOutcome> for PageOutcome {
    fn from(outcome: FetchOutcome) -> Self {
        match outcome {
            FetchOutcome::Success(page) if page.is_empty() => Self::Exhausted,
            FetchOutcome::Success(page) => Self::Records(page),
            FetchOutcome::Failed { status } => Self::Failed { status },
        }
    }
}
