use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use crate::lifecycle::ProcessIdentity;

/// Process table where the test decides which pids run this program.
#[derive(Clone, Default)]
pub struct ScriptedIdentity {
    live: Arc<Mutex<HashSet<u32>>>,
}

impl ScriptedIdentity {
    pub fn spawn(&self, pid: u32) {
        self.live.lock().expect("identity mutex poisoned").insert(pid);
    }

    pub fn exit(&self, pid: u32) {
        self.live.lock().expect("identity mutex poisoned").remove(&pid);
    }
}

impl ProcessIdentity for ScriptedIdentity {
    fn is_same_program_running(&self, pid: u32) -> bool {
        self.live
            .lock()
            .expect("identity mutex poisoned")
            .contains(&pid)
    }
}
