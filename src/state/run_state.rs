/// Run state definitions for the crawl state machine
///
/// A run starts `Idle`, moves to `Running` when the crawl starts, and ends in
/// exactly one terminal state.
use std::fmt;

/// Represents the lifecycle state of one crawl run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RunState {
    /// Coordinator built, nothing fetched yet
    Idle,

    /// Frontier is being drained
    Running,

    // ===== Terminal States =====
    /// Loop exited normally (frontier empty or page budget reached)
    Completed,

    /// Cancellation was requested; results so far are kept (partial completion)
    Cancelled,

    /// An unclassified fault stopped the run; results so far are kept
    Fatal,
}

impl RunState {
    /// Returns true if this is a terminal state
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled | Self::Fatal)
    }

    /// Returns true if the run ended without a fatal fault
    ///
    /// A cancelled run counts as a (partial) completion.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }

    /// Checks whether moving from `self` to `next` is a legal transition
    ///
    /// | From | To |
    /// |------|----|
    /// | Idle | Running |
    /// | Running | Completed, Cancelled, Fatal |
    /// | Completed, Cancelled, Fatal | Running (a fresh run) |
    pub fn can_transition_to(&self, next: RunState) -> bool {
        match (self, next) {
            (Self::Idle, Self::Running) => true,
            (Self::Running, next) => next.is_terminal(),
            (from, Self::Running) => from.is_terminal(),
            _ => false,
        }
    }

    /// Returns the lowercase label used in logs and history records
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
            Self::Fatal => "fatal",
        }
    }

    /// Returns all possible run states
    pub fn all_states() -> Vec<Self> {
        vec![
            Self::Idle,
            Self::Running,
            Self::Completed,
            Self::Cancelled,
            Self::Fatal,
        ]
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
