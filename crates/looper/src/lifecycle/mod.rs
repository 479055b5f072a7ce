//! Single-instance lifecycle for `looper`.
//!
//! The module is split into focused submodules:
//! - [`lock_store`] persists the pid of the owning instance.
//! - [`identity`] decides whether a recorded pid is still this program.
//! - [`terminate`] delivers graceful and forced stop signals.
//! - [`controller`] implements acquire, status, stop and release.
//! - [`shutdown`] listens for termination signals.
//! - [`coordinator`] supervises playback until it ends or is interrupted.
//! - [`dispatch`] maps CLI commands onto the pieces above.
//! - [`types`] defines the command model and output helpers.

mod controller;
mod coordinator;
mod dispatch;
mod error;
mod files;
mod identity;
mod lock_store;
mod shutdown;
mod terminate;
mod types;

pub(crate) const LIFECYCLE_TARGET: &str = "looper::lifecycle";

pub use controller::{InstanceController, InstanceState, InstanceStatus, Release, StopPolicy};
pub use coordinator::{ExitReason, ShutdownCoordinator};
pub use dispatch::{Lifecycle, RunSettings, SystemLifecycle};
pub use error::LifecycleError;
pub use identity::{ProcTableIdentity, ProcessIdentity};
pub use lock_store::{FileLockStore, LockRecord, LockStore, LockStoreError};
pub use shutdown::{
    ShutdownError, ShutdownSignal, ShutdownSignalSource, SystemShutdownSignal, SystemSignalSource,
};
pub use terminate::{ProcessTerminator, SignalTerminator, Termination};
pub use types::{LifecycleCommand, LifecycleOutput};
