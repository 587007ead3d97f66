/// Page state definitions for tracking crawl outcomes
///
/// Every claimed URL ends the run in exactly one of these states.
use std::fmt;

/// Terminal outcome of a claimed URL
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PageState {
    // ===== Terminal Success States =====
    /// Page was successfully fetched and its links aggregated
    Processed,

    // ===== Terminal Skip States =====
    /// Page is excluded by its site's robots.txt (or the robots failure policy)
    Disallowed,

    /// Work on the page was abandoned because the crawl was cancelled
    Cancelled,

    // ===== Terminal Error States =====
    /// Page returned a 4xx other than 429, or a malformed response
    DeadLink,

    /// Page kept answering 429 until the attempt budget ran out
    RateLimited,

    /// Page could not be reached (connection refused, DNS failure, timeout)
    Unreachable,

    /// Page kept failing with server errors until the attempt budget ran out
    Failed,
}

impl PageState {
    /// Returns true if this represents a successful completion
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Processed)
    }

    /// Returns true if the page was deliberately not fetched
    pub fn is_skipped(&self) -> bool {
        matches!(self, Self::Disallowed | Self::Cancelled)
    }

    /// Returns true if this represents an error state
    pub fn is_error(&self) -> bool {
        matches!(
            self,
            Self::DeadLink | Self::RateLimited | Self::Unreachable | Self::Failed
        )
    }

    /// Short snake_case name used in logs and statistics
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Processed => "processed",
            Self::Disallowed => "disallowed",
            Self::Cancelled => "cancelled",
            Self::DeadLink => "dead_link",
            Self::RateLimited => "rate_limited",
            Self::Unreachable => "unreachable",
            Self::Failed => "failed",
        }
    }

    /// Returns all possible page states
    pub fn all_states() -> [Self; 7] {
        [
            Self::Processed,
            Self::Disallowed,
            Self::Cancelled,
            Self::DeadLink,
            Self::RateLimited,
            Self::Unreachable,
            Self::Failed,
        ]
    }

    /// Position of the state in `all_states`, used to index counters
    pub(crate) fn index(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for PageState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
