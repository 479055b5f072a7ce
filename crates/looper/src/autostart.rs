//! Login autostart registration through an XDG desktop entry.
//!
//! Installing writes `looper.desktop` into the user's autostart directory with
//! an `Exec` line that runs `<executable> start`; uninstalling removes it.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use looper_config::APP_ID;
use thiserror::Error;
use tracing::info;

const AUTOSTART_TARGET: &str = "looper::autostart";

/// Errors raised while managing the autostart entry.
#[derive(Debug, Error)]
pub enum AutostartError {
    #[error("could not determine the user configuration directory")]
    MissingConfigDir,
    #[error("failed to inspect autostart entry {path:?}: {source}")]
    Inspect {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to write autostart entry {path:?}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to remove autostart entry {path:?}: {source}")]
    Remove {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Registers the program to start at login.
pub trait AutostartRegistrar {
    /// Where the registration lives, for operator messages.
    fn location(&self) -> &Path;

    /// Whether a registration exists.
    fn is_enabled(&self) -> Result<bool, AutostartError>;

    /// Creates or replaces the registration.
    fn enable(&self) -> Result<(), AutostartError>;

    /// Removes the registration. Succeeds when none exists.
    fn disable(&self) -> Result<(), AutostartError>;
}

/// Desktop entry in `$XDG_CONFIG_HOME/autostart`.
#[derive(Debug, Clone)]
pub struct XdgAutostart {
    entry: PathBuf,
    executable: PathBuf,
}

impl XdgAutostart {
    /// Registrar for the current user that launches `executable`.
    ///
    /// # Errors
    ///
    /// Returns [`AutostartError::MissingConfigDir`] when the platform reports
    /// no configuration directory.
    pub fn for_current_user(executable: impl Into<PathBuf>) -> Result<Self, AutostartError> {
        let config_dir = dirs::config_dir().ok_or(AutostartError::MissingConfigDir)?;
        Ok(Self::in_dir(config_dir.join("autostart"), executable))
    }

    /// Registrar that writes its entry into `directory`.
    pub fn in_dir(directory: impl AsRef<Path>, executable: impl Into<PathBuf>) -> Self {
        Self {
            entry: directory.as_ref().join(format!("{APP_ID}.desktop")),
            executable: executable.into(),
        }
    }

    fn render(&self) -> String {
        let exec = quote_exec_argument(&self.executable.to_string_lossy());
        format!(
            "[Desktop Entry]\n\
             Type=Application\n\
             Name={APP_ID} v{version}\n\
             Comment=Loops an audio asset in the background\n\
             Exec={exec} start\n\
             Terminal=false\n\
             X-GNOME-Autostart-enabled=true\n",
            version = env!("CARGO_PKG_VERSION"),
        )
    }
}

impl AutostartRegistrar for XdgAutostart {
    fn location(&self) -> &Path {
        &self.entry
    }

    fn is_enabled(&self) -> Result<bool, AutostartError> {
        self.entry
            .try_exists()
            .map_err(|source| AutostartError::Inspect {
                path: self.entry.clone(),
                source,
            })
    }

    fn enable(&self) -> Result<(), AutostartError> {
        let write_error = |source| AutostartError::Write {
            path: self.entry.clone(),
            source,
        };
        if let Some(parent) = self.entry.parent() {
            fs::create_dir_all(parent).map_err(write_error)?;
        }
        fs::write(&self.entry, self.render()).map_err(write_error)?;
        info!(
            target: AUTOSTART_TARGET,
            entry = %self.entry.display(),
            "autostart entry written"
        );
        Ok(())
    }

    fn disable(&self) -> Result<(), AutostartError> {
        match fs::remove_file(&self.entry) {
            Ok(()) => {
                info!(
                    target: AUTOSTART_TARGET,
                    entry = %self.entry.display(),
                    "autostart entry removed"
                );
                Ok(())
            }
            Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(AutostartError::Remove {
                path: self.entry.clone(),
                source,
            }),
        }
    }
}

/// Quotes an `Exec` argument per the desktop entry specification.
fn quote_exec_argument(argument: &str) -> String {
    const RESERVED: &[char] = &[
        ' ', '\t', '\n', '"', '\'', '\\', '>', '<', '~', '|', '&', ';', '$', '*', '?', '#', '(',
        ')', '`',
    ];
    if !argument.contains(RESERVED) {
        return argument.to_owned();
    }
    let mut quoted = String::with_capacity(argument.len() + 2);
    quoted.push('"');
    for character in argument.chars() {
        if matches!(character, '"' | '`' | '$' | '\\') {
            quoted.push('\\');
        }
        quoted.push(character);
    }
    quoted.push('"');
    quoted
}
