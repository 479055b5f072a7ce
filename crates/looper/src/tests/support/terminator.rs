use std::sync::{Arc, Mutex};

use super::{MemoryLockStore, ScriptedIdentity};
use crate::lifecycle::{LifecycleError, ProcessTerminator, Termination};

/// How a signalled instance reacts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetBehaviour {
    /// Releases its lock record and exits on the graceful request.
    ExitsAndReleases,
    /// Exits on the graceful request without touching the record.
    ExitsWithoutRelease,
    /// Survives the graceful request; only the forced kill ends it.
    IgnoresGraceful,
}

/// Terminator that records requests and simulates the target's reaction.
#[derive(Clone)]
pub struct RecordingTerminator {
    identity: ScriptedIdentity,
    store: MemoryLockStore,
    behaviour: TargetBehaviour,
    calls: Arc<Mutex<Vec<(u32, Termination)>>>,
}

impl RecordingTerminator {
    pub fn new(identity: ScriptedIdentity, store: MemoryLockStore, behaviour: TargetBehaviour) -> Self {
        Self {
            identity,
            store,
            behaviour,
            calls: Arc::default(),
        }
    }

    pub fn calls(&self) -> Vec<(u32, Termination)> {
        self.calls.lock().expect("terminator mutex poisoned").clone()
    }
}

impl ProcessTerminator for RecordingTerminator {
    fn terminate(&self, pid: u32, mode: Termination) -> Result<(), LifecycleError> {
        self.calls
            .lock()
            .expect("terminator mutex poisoned")
            .push((pid, mode));
        match (mode, self.behaviour) {
            (Termination::Forced, _) | (Termination::Graceful, TargetBehaviour::ExitsWithoutRelease) => {
                self.identity.exit(pid);
            }
            (Termination::Graceful, TargetBehaviour::ExitsAndReleases) => {
                if self.store.pid() == Some(pid) {
                    self.store.vanish();
                }
                self.identity.exit(pid);
            }
            (Termination::Graceful, TargetBehaviour::IgnoresGraceful) => {}
        }
        Ok(())
    }
}
