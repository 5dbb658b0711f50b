/// Per-page outcome definitions
///
/// Every dequeued page ends in exactly one outcome. Only the `Scraped` and
/// `TextSample` outcomes count toward the page budget.
use std::fmt;

/// What happened to one dequeued page
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageOutcome {
    /// Markup was parsed and the extraction passes ran
    Scraped {
        /// Items extracted from the page
        items: usize,
        /// Child URLs accepted into the frontier
        enqueued: usize,
    },

    /// Body was not markup; at most one `Text` item was recorded
    TextSample {
        /// Whether a non-empty sample was recorded
        recorded: bool,
    },

    /// Every fetch strategy failed
    FetchFailed {
        /// Total attempts made across all strategies
        attempts: u32,
    },

    /// Markup signature present but the body could not be parsed
    ParseFailed {
        /// Parser error description
        reason: String,
    },

    /// Cancellation was observed while the page was in flight
    Cancelled,
}

impl PageOutcome {
    /// Returns true if the page counts toward `pages_scraped`
    pub fn counts_as_scraped(&self) -> bool {
        matches!(self, Self::Scraped { .. } | Self::TextSample { .. })
    }
}

impl fmt::Display for PageOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scraped { items, enqueued } => {
                write!(f, "scraped ({} items, {} links queued)", items, enqueued)
            }
            Self::TextSample { recorded: true } => write!(f, "text sample recorded"),
            Self::TextSample { recorded: false } => write!(f, "empty text body"),
            Self::FetchFailed { attempts } => {
                write!(f, "fetch failed after {} attempts", attempts)
            }
            Self::ParseFailed { reason } => write!(f, "parse failed: {}", reason),
            Self::Cancelled => write!(f, "cancelled"),
        }
    }
}
