/// Traversal state definitions and the shared control channel
///
/// This module defines the lifecycle of a single crawl run and the handle
/// every worker uses to observe it.
use std::fmt;
use tokio::sync::watch;

/// Represents the current state of a crawl run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TraversalState {
    // ===== Active State =====
    /// Work is being dispatched
    Running,

    // ===== Terminal States =====
    /// An external stop signal was received
    StopRequested,

    /// A failure halted the run (halt-on-error, or a failed output sink)
    HaltedOnError,

    /// Every reachable page has been processed
    Exhausted,
}

impl TraversalState {
    /// Returns true if no further work may be dispatched
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Running)
    }

    /// Returns true if the run ended before the work ran out
    pub fn is_interrupted(&self) -> bool {
        matches!(self, Self::StopRequested | Self::HaltedOnError)
    }

    /// Short lowercase name used in log output
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::StopRequested => "stop_requested",
            Self::HaltedOnError => "halted_on_error",
            Self::Exhausted => "exhausted",
        }
    }
}

impl fmt::Display for TraversalState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Shared, thread-safe view of a run's [`TraversalState`]
///
/// Transitions are only allowed out of `Running`, and the first one wins:
/// once a run is halted it cannot later be reported as exhausted or stopped.
/// Workers can await [`TraversalControl::terminated`] to abandon an in-flight
/// fetch as soon as the run leaves `Running`.
#[derive(Debug)]
pub struct TraversalControl {
    state: watch::Sender<TraversalState>,
}

impl TraversalControl {
    /// Creates a control in the `Running` state
    pub fn new() -> Self {
        let (state, _) = watch::channel(TraversalState::Running);
        Self { state }
    }

    /// Returns the current state
    pub fn state(&self) -> TraversalState {
        *self.state.borrow()
    }

    /// Returns true while work may still be dispatched
    pub fn is_running(&self) -> bool {
        self.state() == TraversalState::Running
    }

    /// Moves the run from `Running` to `to`
    ///
    /// # Returns
    ///
    /// * `true` - This call performed the transition
    /// * `false` - The run had already left `Running`, or `to` is `Running`
    pub fn transition(&self, to: TraversalState) -> bool {
        if !to.is_terminal() {
            return false;
        }

        self.state.send_if_modified(|state| {
            if *state == TraversalState::Running {
                *state = to;
                true
            } else {
                false
            }
        })
    }

    /// Completes once the run has entered a terminal state
    pub async fn terminated(&self) {
        let mut receiver = self.state.subscribe();
        // The sender lives in `self`, so the channel cannot close while we wait
        let _ = receiver.wait_for(TraversalState::is_terminal).await;
    }
}

impl Default for TraversalControl {
    fn default() -> Self {
        Self::new()
    }
}
