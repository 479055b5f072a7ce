use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::lifecycle::{LockRecord, LockStore, LockStoreError};

const LOCATION: &str = "/memory/looper.pid";

#[derive(Default)]
struct State {
    content: Option<String>,
    fail_reads: bool,
    fail_writes: bool,
    clears: usize,
}

/// Lock store kept in memory, with failure injection.
#[derive(Clone, Default)]
pub struct MemoryLockStore {
    state: Arc<Mutex<State>>,
}

impl MemoryLockStore {
    fn with_state<R>(&self, action: impl FnOnce(&mut State) -> R) -> R {
        let mut state = self.state.lock().expect("lock store mutex poisoned");
        action(&mut state)
    }

    /// Seeds a record for `pid`.
    pub fn put(&self, pid: u32) {
        self.put_raw(&format!("{pid}\n"));
    }

    /// Seeds arbitrary record content.
    pub fn put_raw(&self, content: &str) {
        self.with_state(|state| state.content = Some(content.to_owned()));
    }

    /// Removes the record without counting a clear.
    pub fn vanish(&self) {
        self.with_state(|state| state.content = None);
    }

    /// Pid currently recorded, if the content parses.
    pub fn pid(&self) -> Option<u32> {
        self.with_state(|state| {
            state
                .content
                .as_deref()
                .and_then(|content| content.trim().parse().ok())
        })
    }

    pub fn raw(&self) -> Option<String> {
        self.with_state(|state| state.content.clone())
    }

    pub fn fail_reads(&self) {
        self.with_state(|state| state.fail_reads = true);
    }

    pub fn fail_writes(&self) {
        self.with_state(|state| state.fail_writes = true);
    }

    /// Number of successful `clear` calls.
    pub fn clears(&self) -> usize {
        self.with_state(|state| state.clears)
    }
}

impl LockStore for MemoryLockStore {
    fn location(&self) -> &Path {
        Path::new(LOCATION)
    }

    fn read(&self) -> Result<Option<LockRecord>, LockStoreError> {
        self.with_state(|state| {
            if state.fail_reads {
                return Err(LockStoreError::Read {
                    path: PathBuf::from(LOCATION),
                    source: io::Error::other("injected read failure"),
                });
            }
            let Some(content) = state.content.clone() else {
                return Ok(None);
            };
            content
                .trim()
                .parse::<u32>()
                .map(|pid| Some(LockRecord::new(pid)))
                .map_err(|_| LockStoreError::Malformed {
                    path: PathBuf::from(LOCATION),
                    content,
                })
        })
    }

    fn create(&self, record: LockRecord) -> Result<bool, LockStoreError> {
        self.with_state(|state| {
            if state.fail_writes {
                return Err(LockStoreError::Write {
                    path: PathBuf::from(LOCATION),
                    source: io::Error::other("injected write failure"),
                });
            }
            if state.content.is_some() {
                return Ok(false);
            }
            state.content = Some(format!("{}\n", record.pid()));
            Ok(true)
        })
    }

    fn clear(&self) -> Result<(), LockStoreError> {
        self.with_state(|state| {
            state.content = None;
            state.clears += 1;
            Ok(())
        })
    }
}
