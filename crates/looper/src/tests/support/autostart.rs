use std::path::Path;
use std::sync::{Arc, Mutex};

use crate::autostart::{AutostartError, AutostartRegistrar};

/// Autostart registration held in memory.
#[derive(Clone, Default)]
pub struct FakeAutostart {
    enabled: Arc<Mutex<bool>>,
}

impl FakeAutostart {
    pub fn installed() -> Self {
        let registrar = Self::default();
        *registrar.enabled.lock().expect("autostart mutex poisoned") = true;
        registrar
    }

    pub fn enabled(&self) -> bool {
        *self.enabled.lock().expect("autostart mutex poisoned")
    }
}

impl AutostartRegistrar for FakeAutostart {
    fn location(&self) -> &Path {
        Path::new("/autostart/looper.desktop")
    }

    fn is_enabled(&self) -> Result<bool, AutostartError> {
        Ok(self.enabled())
    }

    fn enable(&self) -> Result<(), AutostartError> {
        *self.enabled.lock().expect("autostart mutex poisoned") = true;
        Ok(())
    }

    fn disable(&self) -> Result<(), AutostartError> {
        *self.enabled.lock().expect("autostart mutex poisoned") = false;
        Ok(())
    }
}
