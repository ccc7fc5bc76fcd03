use crate::domain::logging::LogComponent;
use crate::log_debug;

/// Guards a refresh pass against re-entry. A request arriving while a
/// pass runs is remembered and replayed once the pass ends; several such
/// requests collapse into one, forced if any of them was.
#[derive(Debug, Default)]
pub struct RefreshGate {
    running: bool,
    pending: Option<bool>,
    coalesced: usize,
}

impl RefreshGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// `true` when the caller may run a pass now.
    pub fn enter(&mut self, force: bool) -> bool {
        if self.running {
            self.pending = Some(self.pending.unwrap_or(false) || force);
            self.coalesced += 1;
            log_debug!(
                LogComponent::Application("RefreshGate"),
                "refresh requested during a pass, deferred (force={})",
                force
            );
            return false;
        }
        self.running = true;
        true
    }

    /// Ends the pass. Returns the deferred request, if any, with the gate
    /// already re-entered for it.
    pub fn exit(&mut self) -> Option<bool> {
        match self.pending.take() {
            Some(force) => Some(force),
            None => {
                self.running = false;
                None
            }
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Requests folded into a trailing pass so far.
    pub fn coalesced(&self) -> usize {
        self.coalesced
    }
}
