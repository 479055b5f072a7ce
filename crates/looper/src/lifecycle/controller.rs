//! Single-instance state machine built on the lock store.
//!
//! The controller ties the persistent lock record to an in-memory state so
//! that release runs exactly once per acquisition, however many shutdown
//! paths race to trigger it.

use std::sync::atomic::{AtomicU8, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use super::LIFECYCLE_TARGET;
use super::error::LifecycleError;
use super::identity::ProcessIdentity;
use super::lock_store::{LockRecord, LockStore, LockStoreError};
use super::terminate::{ProcessTerminator, Termination};

const EXIT_POLL_INTERVAL: Duration = Duration::from_millis(100);
const ACQUIRE_ATTEMPTS: u32 = 3;

/// In-memory lifecycle state of this process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum InstanceState {
    NotRunning = 0,
    Running = 1,
    Stopping = 2,
}

impl InstanceState {
    const fn from_raw(raw: u8) -> Self {
        match raw {
            1 => Self::Running,
            2 => Self::Stopping,
            _ => Self::NotRunning,
        }
    }
}

/// What the lock record says about the instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstanceStatus {
    /// A live instance of this program owns the lock.
    Running { pid: u32 },
    /// No live owner. `stale_pid` names a leftover record, if one exists.
    NotRunning { stale_pid: Option<u32> },
}

/// Timing used when stopping another instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StopPolicy {
    /// How long a graceful request may take before the kill escalates.
    pub grace: Duration,
    /// Interval between exit checks.
    pub poll: Duration,
}

impl StopPolicy {
    /// Policy with the given grace period and the default poll interval.
    pub const fn with_grace(grace: Duration) -> Self {
        Self {
            grace,
            poll: EXIT_POLL_INTERVAL,
        }
    }
}

/// The release side of the controller, shared with shutdown paths.
pub trait Release: Send + Sync {
    /// Gives up ownership. Returns `true` only for the call that released.
    fn release(&self) -> Result<bool, LifecycleError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RecordCheck {
    Absent,
    Live(u32),
    Stale(Option<u32>),
}

/// Coordinates ownership of the single instance.
pub struct InstanceController<S, I, T> {
    store: S,
    identity: I,
    terminator: T,
    own_pid: u32,
    policy: StopPolicy,
    state: AtomicU8,
}

impl<S, I, T> InstanceController<S, I, T>
where
    S: LockStore,
    I: ProcessIdentity,
    T: ProcessTerminator,
{
    /// Builds a controller acting on behalf of the calling process.
    pub fn new(store: S, identity: I, terminator: T, policy: StopPolicy) -> Self {
        Self::with_pid(store, identity, terminator, policy, std::process::id())
    }

    /// Builds a controller acting on behalf of `own_pid`.
    pub fn with_pid(store: S, identity: I, terminator: T, policy: StopPolicy, own_pid: u32) -> Self {
        Self {
            store,
            identity,
            terminator,
            own_pid,
            policy,
            state: AtomicU8::new(InstanceState::NotRunning as u8),
        }
    }

    /// Current in-memory state.
    pub fn state(&self) -> InstanceState {
        InstanceState::from_raw(self.state.load(Ordering::Acquire))
    }

    /// Lock store backing the controller.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Claims the instance for this process.
    ///
    /// A record naming a live instance of this program refuses the claim.
    /// Stale and malformed records are cleared first. The record is then
    /// created exclusively; losing that race to another starter re-checks
    /// the record it left.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::AlreadyRunning`] when another instance owns
    /// the lock, [`LifecycleError::LockContended`] when the record keeps
    /// changing underneath us, or a store error when the record cannot be
    /// read or written.
    pub fn acquire(&self) -> Result<LockRecord, LifecycleError> {
        let record = LockRecord::new(self.own_pid);
        for attempt in 1..=ACQUIRE_ATTEMPTS {
            match self.check_record()? {
                RecordCheck::Live(pid) => {
                    info!(
                        target: LIFECYCLE_TARGET,
                        pid,
                        "refusing to start: existing instance alive"
                    );
                    return Err(LifecycleError::AlreadyRunning {
                        pid,
                        lock_path: self.store.location().to_path_buf(),
                    });
                }
                RecordCheck::Stale(pid) => {
                    warn!(
                        target: LIFECYCLE_TARGET,
                        stale_pid = ?pid,
                        "clearing stale lock record"
                    );
                    self.store.clear()?;
                }
                RecordCheck::Absent => {}
            }

            if self.store.create(record)? {
                self.state
                    .store(InstanceState::Running as u8, Ordering::Release);
                info!(
                    target: LIFECYCLE_TARGET,
                    pid = self.own_pid,
                    file = %self.store.location().display(),
                    "instance lock acquired"
                );
                return Ok(record);
            }
            debug!(
                target: LIFECYCLE_TARGET,
                attempt,
                "lock record appeared while acquiring; checking it again"
            );
        }
        Err(LifecycleError::LockContended {
            lock_path: self.store.location().to_path_buf(),
        })
    }

    /// Reports whether a live instance owns the lock. Never mutates state.
    ///
    /// # Errors
    ///
    /// Returns a store error when the record exists but cannot be read.
    pub fn status(&self) -> Result<InstanceStatus, LifecycleError> {
        Ok(match self.check_record()? {
            RecordCheck::Live(pid) => InstanceStatus::Running { pid },
            RecordCheck::Stale(stale_pid) => InstanceStatus::NotRunning { stale_pid },
            RecordCheck::Absent => InstanceStatus::NotRunning { stale_pid: None },
        })
    }

    /// Stops the instance named by the lock record and waits for it to exit.
    ///
    /// The target is asked to terminate gracefully, then killed if it is
    /// still alive after the grace period. Once it has exited, a record that
    /// still names it is cleared. Returns the stopped pid.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::NotRunning`] when no live instance owns the
    /// lock, and propagates signalling or store failures.
    pub fn request_stop(&self) -> Result<u32, LifecycleError> {
        let pid = match self.check_record()? {
            RecordCheck::Live(pid) => pid,
            RecordCheck::Absent | RecordCheck::Stale(_) => return Err(LifecycleError::NotRunning),
        };

        self.terminator.terminate(pid, Termination::Graceful)?;
        let deadline = Instant::now() + self.policy.grace;
        if !self.wait_for_exit(pid, Some(deadline)) {
            warn!(
                target: LIFECYCLE_TARGET,
                pid,
                grace_ms = self.policy.grace.as_millis(),
                "instance ignored graceful stop; killing"
            );
            self.terminator.terminate(pid, Termination::Forced)?;
            self.wait_for_exit(pid, None);
        }

        match self.store.read() {
            Ok(Some(record)) if record.pid() == pid => self.store.clear()?,
            Ok(_) | Err(LockStoreError::Malformed { .. }) => {}
            Err(error) => return Err(error.into()),
        }
        info!(target: LIFECYCLE_TARGET, pid, "instance stopped");
        Ok(pid)
    }

    fn check_record(&self) -> Result<RecordCheck, LifecycleError> {
        match self.store.read() {
            Ok(None) => Ok(RecordCheck::Absent),
            Ok(Some(record)) => {
                let pid = record.pid();
                if self.identity.is_same_program_running(pid) {
                    Ok(RecordCheck::Live(pid))
                } else {
                    Ok(RecordCheck::Stale(Some(pid)))
                }
            }
            Err(LockStoreError::Malformed { path, content }) => {
                debug!(
                    target: LIFECYCLE_TARGET,
                    file = %path.display(),
                    content = %content,
                    "lock record is malformed"
                );
                Ok(RecordCheck::Stale(None))
            }
            Err(error) => Err(error.into()),
        }
    }

    /// Polls until `pid` no longer runs this program. Returns `false` if the
    /// deadline passes first; without a deadline it only returns `true`.
    fn wait_for_exit(&self, pid: u32, deadline: Option<Instant>) -> bool {
        loop {
            if !self.identity.is_same_program_running(pid) {
                return true;
            }
            if deadline.is_some_and(|deadline| Instant::now() >= deadline) {
                return false;
            }
            thread::sleep(self.policy.poll);
        }
    }
}

impl<S, I, T> Release for InstanceController<S, I, T>
where
    S: LockStore,
    I: ProcessIdentity,
    T: ProcessTerminator,
{
    fn release(&self) -> Result<bool, LifecycleError> {
        if self
            .state
            .compare_exchange(
                InstanceState::Running as u8,
                InstanceState::Stopping as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_err()
        {
            return Ok(false);
        }

        let outcome = match self.store.read() {
            Ok(Some(record)) if record.pid() == self.own_pid => self.store.clear(),
            Ok(None) => Ok(()),
            Ok(Some(record)) => {
                warn!(
                    target: LIFECYCLE_TARGET,
                    pid = record.pid(),
                    "lock record names another process; leaving it in place"
                );
                Ok(())
            }
            Err(error) => Err(error),
        };
        self.state
            .store(InstanceState::NotRunning as u8, Ordering::Release);
        outcome?;
        info!(target: LIFECYCLE_TARGET, pid = self.own_pid, "instance lock released");
        Ok(true)
    }
}
