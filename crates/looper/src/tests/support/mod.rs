//! In-memory collaborators for lifecycle tests.

mod autostart;
mod identity;
mod lock_store;
mod playback;
mod signal;
mod terminator;

pub use autostart::FakeAutostart;
pub use identity::ScriptedIdentity;
pub use lock_store::MemoryLockStore;
pub use playback::FakePlayback;
pub use signal::{TestShutdownSignal, TestSignalSource};
pub use terminator::{RecordingTerminator, TargetBehaviour};

use std::time::Duration;

use crate::lifecycle::{InstanceController, StopPolicy};

/// Pid the controller under test claims as its own.
pub const OWN_PID: u32 = 4_100;
/// Pid of a second instance started elsewhere.
pub const OTHER_PID: u32 = 4_200;

pub type TestController = InstanceController<MemoryLockStore, ScriptedIdentity, RecordingTerminator>;

/// Short timings so stop escalation finishes quickly.
pub fn fast_policy() -> StopPolicy {
    StopPolicy {
        grace: Duration::from_millis(50),
        poll: Duration::from_millis(5),
    }
}

/// Shared fakes plus a controller built on them.
pub struct ControllerParts {
    pub store: MemoryLockStore,
    pub identity: ScriptedIdentity,
    pub terminator: RecordingTerminator,
}

impl ControllerParts {
    pub fn new(behaviour: TargetBehaviour) -> Self {
        let store = MemoryLockStore::default();
        let identity = ScriptedIdentity::default();
        // Our own process is always alive.
        identity.spawn(OWN_PID);
        let terminator = RecordingTerminator::new(identity.clone(), store.clone(), behaviour);
        Self {
            store,
            identity,
            terminator,
        }
    }

    pub fn controller(&self) -> TestController {
        InstanceController::with_pid(
            self.store.clone(),
            self.identity.clone(),
            self.terminator.clone(),
            fast_policy(),
            OWN_PID,
        )
    }

    pub fn controller_for(&self, pid: u32) -> TestController {
        InstanceController::with_pid(
            self.store.clone(),
            self.identity.clone(),
            self.terminator.clone(),
            fast_policy(),
            pid,
        )
    }
}
