//! Install/activate state machine.
//!
//! ```text
//! parsed ──install──▶ installing ──ok──▶ installed ──activate──▶ activating ──ok──▶ activated
//!                          │                                                       │
//!                          └──fail──▶ redundant                        (re-install keeps it active)
//! ```

use std::sync::{Mutex, MutexGuard, PoisonError};

use serde::Serialize;

use crate::Error;

/// Where the router is in its install/activate lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, schemars::JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleState {
    /// Constructed, never installed.
    #[default]
    Parsed,
    Installing,
    /// Seeded; waiting for activation.
    Installed,
    Activating,
    /// Serving requests from the cache.
    Activated,
    /// Install failed; this version will never activate.
    Redundant,
}

/// Inputs to the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleEvent {
    InstallStarted,
    InstallSucceeded,
    InstallFailed,
    ActivateStarted,
    ActivateSucceeded,
    ActivateFailed,
}

impl LifecycleState {
    pub fn as_str(&self) -> &'static str {
        match self {
            LifecycleState::Parsed => "parsed",
            LifecycleState::Installing => "installing",
            LifecycleState::Installed => "installed",
            LifecycleState::Activating => "activating",
            LifecycleState::Activated => "activated",
            LifecycleState::Redundant => "redundant",
        }
    }

    /// Next state after `event`, or `INVALID_STATE` if the event is not allowed here.
    ///
    /// An activated router stays activated through re-installs and
    /// re-activations, so requests keep being served from the cache.
    pub fn on(self, event: LifecycleEvent) -> Result<Self, Error> {
        use LifecycleEvent::*;
        use LifecycleState::*;

        let next = match (self, event) {
            (Parsed | Installed | Redundant, InstallStarted) => Installing,
            (Installing, InstallSucceeded) => Installed,
            (Installing, InstallFailed) => Redundant,
            (Installed, ActivateStarted) => Activating,
            (Activating, ActivateSucceeded) => Activated,
            (Activating, ActivateFailed) => Installed,
            (Activated, InstallStarted | InstallSucceeded | InstallFailed) => Activated,
            (Activated, ActivateStarted | ActivateSucceeded | ActivateFailed) => Activated,
            (state, event) => {
                return Err(Error::InvalidState(format!("{event:?} not allowed while {}", state.as_str())));
            }
        };
        Ok(next)
    }
}

/// Shared lifecycle state.
///
/// Never locked across an await; transitions may also be applied from
/// `Drop`.
#[derive(Debug, Default)]
pub struct Lifecycle {
    state: Mutex<LifecycleState>,
}

impl Lifecycle {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, LifecycleState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn current(&self) -> LifecycleState {
        *self.lock()
    }

    pub fn is_active(&self) -> bool {
        self.current() == LifecycleState::Activated
    }

    /// Apply an event atomically and return the new state.
    pub fn apply(&self, event: LifecycleEvent) -> Result<LifecycleState, Error> {
        let mut state = self.lock();
        let next = state.on(event)?;
        if next != *state {
            tracing::info!(from = state.as_str(), to = next.as_str(), "lifecycle transition");
        }
        *state = next;
        Ok(next)
    }

    /// Apply `start` and return a guard that applies `on_abort` if it is
    /// dropped before [`Transition::finish`].
    pub fn begin(&self, start: LifecycleEvent, on_abort: LifecycleEvent) -> Result<Transition<'_>, Error> {
        self.apply(start)?;
        Ok(Transition { lifecycle: self, on_abort, pending: true })
    }
}

/// An in-flight install or activation.
#[derive(Debug)]
pub struct Transition<'a> {
    lifecycle: &'a Lifecycle,
    on_abort: LifecycleEvent,
    pending: bool,
}

impl Transition<'_> {
    /// Complete the transition with `event`.
    pub fn finish(mut self, event: LifecycleEvent) -> Result<LifecycleState, Error> {
        self.pending = false;
        self.lifecycle.apply(event)
    }
}

impl Drop for Transition<'_> {
    fn drop(&mut self) {
        if self.pending {
            tracing::warn!(event = ?self.on_abort, "lifecycle transition cancelled");
            if let Err(e) = self.lifecycle.apply(self.on_abort) {
                tracing::warn!(error = %e, "could not roll back cancelled transition");
            }
        }
    }
}
