//! Maps lifecycle commands onto the instance controller and its collaborators.

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use looper_config::{APP_ID, Config, RuntimePaths};
use tracing::warn;

use super::LIFECYCLE_TARGET;
use super::controller::{InstanceController, InstanceStatus, Release, StopPolicy};
use super::coordinator::{ExitReason, ShutdownCoordinator};
use super::error::LifecycleError;
use super::identity::{ProcTableIdentity, ProcessIdentity};
use super::lock_store::{FileLockStore, LockRecord, LockStore};
use super::shutdown::{ShutdownSignal, ShutdownSignalSource, SystemSignalSource};
use super::terminate::{ProcessTerminator, SignalTerminator};
use super::types::{LifecycleCommand, LifecycleOutput};
use crate::autostart::{AutostartRegistrar, XdgAutostart};
use crate::playback::{LoopCount, PlaybackEngine, SystemPlaybackEngine};

/// Playback parameters for `start`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSettings {
    /// Asset to play, already resolved to an absolute path.
    pub asset: PathBuf,
    pub loops: LoopCount,
    /// Interval between playback completion checks.
    pub poll: Duration,
}

/// Executes lifecycle commands.
pub struct Lifecycle<S, I, T> {
    controller: Arc<InstanceController<S, I, T>>,
    playback: Box<dyn PlaybackEngine>,
    autostart: Box<dyn AutostartRegistrar>,
    signals: Box<dyn ShutdownSignalSource>,
    settings: RunSettings,
}

/// Lifecycle wired to the real filesystem, process table and signals.
pub type SystemLifecycle = Lifecycle<FileLockStore, ProcTableIdentity, SignalTerminator>;

impl SystemLifecycle {
    /// Wires the production collaborators from `config`.
    ///
    /// # Errors
    ///
    /// Fails when the running executable or the user configuration directory
    /// cannot be resolved.
    pub fn from_config(config: &Config) -> Result<Self, LifecycleError> {
        let identity = ProcTableIdentity::for_current_process()?;
        let executable = identity.executable().to_path_buf();
        let base_dir = executable
            .parent()
            .map_or_else(PathBuf::new, PathBuf::from);
        let paths = RuntimePaths::system();
        let controller = InstanceController::new(
            FileLockStore::new(paths.lock_path()),
            identity,
            SignalTerminator,
            StopPolicy::with_grace(config.stop_grace()),
        );
        let settings = RunSettings {
            asset: config.resolve_asset_path(&base_dir),
            loops: LoopCount::from(config.loop_count()),
            poll: config.poll_interval(),
        };
        Ok(Self::new(
            controller,
            Box::new(SystemPlaybackEngine::default()),
            Box::new(XdgAutostart::for_current_user(executable)?),
            Box::new(SystemSignalSource),
            settings,
        ))
    }
}

impl<S, I, T> Lifecycle<S, I, T>
where
    S: LockStore + 'static,
    I: ProcessIdentity + 'static,
    T: ProcessTerminator + 'static,
{
    pub fn new(
        controller: InstanceController<S, I, T>,
        playback: Box<dyn PlaybackEngine>,
        autostart: Box<dyn AutostartRegistrar>,
        signals: Box<dyn ShutdownSignalSource>,
        settings: RunSettings,
    ) -> Self {
        Self {
            controller: Arc::new(controller),
            playback,
            autostart,
            signals,
            settings,
        }
    }

    /// Controller shared with the shutdown paths.
    pub fn controller(&self) -> &InstanceController<S, I, T> {
        &self.controller
    }

    /// Runs `command`, writing operator messages to `output`.
    ///
    /// `start` blocks until playback ends or a termination signal arrives.
    /// An interrupted run exits with failure.
    pub fn handle<W: Write>(
        &self,
        command: LifecycleCommand,
        output: &mut LifecycleOutput<W>,
    ) -> Result<ExitCode, LifecycleError> {
        match command {
            LifecycleCommand::Start => self.start(output),
            LifecycleCommand::Stop => self.stop(output),
            LifecycleCommand::Status => self.status(output),
            LifecycleCommand::Install => self.install(output),
            LifecycleCommand::Uninstall => self.uninstall(output),
        }
    }

    fn start<W: Write>(
        &self,
        output: &mut LifecycleOutput<W>,
    ) -> Result<ExitCode, LifecycleError> {
        // Armed before acquisition so a signal in between still triggers release.
        let signal: Arc<dyn ShutdownSignal> = Arc::from(self.signals.arm()?);
        let record = match self.controller.acquire() {
            Ok(record) => record,
            Err(error) => {
                signal.disarm();
                return Err(error);
            }
        };
        self.run_acquired(record, Arc::clone(&signal), output)
            .inspect_err(|_| {
                signal.disarm();
                if let Err(error) = self.controller.release() {
                    warn!(
                        target: LIFECYCLE_TARGET,
                        error = %error,
                        "failed to release lock after start failure"
                    );
                }
            })
    }

    fn run_acquired<W: Write>(
        &self,
        record: LockRecord,
        signal: Arc<dyn ShutdownSignal>,
        output: &mut LifecycleOutput<W>,
    ) -> Result<ExitCode, LifecycleError> {
        output.stdout_line(format_args!("{APP_ID} started with pid {}", record.pid()))?;
        let playback = self
            .playback
            .play(&self.settings.asset, self.settings.loops)?;
        let coordinator = ShutdownCoordinator::new(Arc::clone(&self.controller), self.settings.poll);
        match coordinator.run(signal, playback)? {
            ExitReason::Completed => {
                output.stdout_line(format_args!(
                    "{APP_ID} finished playing {}",
                    self.settings.asset.display()
                ))?;
                Ok(ExitCode::SUCCESS)
            }
            ExitReason::Interrupted { signal } => {
                output.stdout_line(format_args!("{APP_ID} stopped by signal {signal}"))?;
                Ok(ExitCode::FAILURE)
            }
        }
    }

    fn stop<W: Write>(
        &self,
        output: &mut LifecycleOutput<W>,
    ) -> Result<ExitCode, LifecycleError> {
        let pid = self.controller.request_stop()?;
        output.stdout_line(format_args!("{APP_ID} (pid {pid}) stopped"))?;
        Ok(ExitCode::SUCCESS)
    }

    fn status<W: Write>(
        &self,
        output: &mut LifecycleOutput<W>,
    ) -> Result<ExitCode, LifecycleError> {
        match self.controller.status()? {
            InstanceStatus::Running { pid } => {
                output.stdout_line(format_args!("{APP_ID} is running (pid {pid})"))?;
            }
            InstanceStatus::NotRunning {
                stale_pid: Some(pid),
            } => {
                output.stdout_line(format_args!(
                    "{APP_ID} is not running (stale lock for pid {pid} at {})",
                    self.controller.store().location().display()
                ))?;
            }
            InstanceStatus::NotRunning { stale_pid: None } => {
                output.stdout_line(format_args!("{APP_ID} is not running"))?;
            }
        }
        if self.autostart.is_enabled()? {
            output.stdout_line(format_args!(
                "{APP_ID} is installed ({})",
                self.autostart.location().display()
            ))?;
        } else {
            output.stdout_line(format_args!("{APP_ID} is not installed"))?;
        }
        Ok(ExitCode::SUCCESS)
    }

    fn install<W: Write>(
        &self,
        output: &mut LifecycleOutput<W>,
    ) -> Result<ExitCode, LifecycleError> {
        if self.autostart.is_enabled()? {
            return Err(LifecycleError::AlreadyInstalled {
                path: self.autostart.location().to_path_buf(),
            });
        }
        self.autostart.enable()?;
        output.stdout_line(format_args!(
            "{APP_ID} installed; it will start at login ({})",
            self.autostart.location().display()
        ))?;
        Ok(ExitCode::SUCCESS)
    }

    fn uninstall<W: Write>(
        &self,
        output: &mut LifecycleOutput<W>,
    ) -> Result<ExitCode, LifecycleError> {
        if !self.autostart.is_enabled()? {
            return Err(LifecycleError::NotInstalled);
        }
        self.autostart.disable()?;
        output.stdout_line(format_args!("{APP_ID} uninstalled"))?;
        Ok(ExitCode::SUCCESS)
    }
}
