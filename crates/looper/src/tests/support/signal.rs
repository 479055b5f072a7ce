use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Condvar, Mutex};

use crate::lifecycle::{ShutdownError, ShutdownSignal, ShutdownSignalSource};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Pending,
    Fired(i32),
    Disarmed,
}

/// Shutdown signal fired by the test.
#[derive(Clone)]
pub struct TestShutdownSignal {
    inner: Arc<(Mutex<State>, Condvar)>,
}

impl Default for TestShutdownSignal {
    fn default() -> Self {
        Self {
            inner: Arc::new((Mutex::new(State::Pending), Condvar::new())),
        }
    }
}

impl TestShutdownSignal {
    pub fn fire(&self, signal: i32) {
        self.transition(State::Fired(signal));
    }

    pub fn is_disarmed(&self) -> bool {
        let (lock, _) = &*self.inner;
        *lock.lock().expect("signal mutex poisoned") == State::Disarmed
    }

    fn transition(&self, next: State) {
        let (lock, cvar) = &*self.inner;
        let mut state = lock.lock().expect("signal mutex poisoned");
        if *state == State::Pending {
            *state = next;
        } else if next == State::Disarmed {
            *state = State::Disarmed;
        }
        cvar.notify_all();
    }
}

impl ShutdownSignal for TestShutdownSignal {
    fn wait(&self) -> Result<Option<i32>, ShutdownError> {
        let (lock, cvar) = &*self.inner;
        let mut state = lock.lock().expect("signal mutex poisoned");
        while *state == State::Pending {
            state = cvar.wait(state).expect("signal mutex poisoned during wait");
        }
        Ok(match *state {
            State::Fired(signal) => Some(signal),
            State::Pending | State::Disarmed => None,
        })
    }

    fn disarm(&self) {
        self.transition(State::Disarmed);
    }
}

/// Hands out clones of one [`TestShutdownSignal`] and counts arming.
#[derive(Clone, Default)]
pub struct TestSignalSource {
    signal: TestShutdownSignal,
    arms: Arc<AtomicUsize>,
}

impl TestSignalSource {
    pub fn signal(&self) -> &TestShutdownSignal {
        &self.signal
    }

    pub fn arms(&self) -> usize {
        self.arms.load(Ordering::SeqCst)
    }
}

impl ShutdownSignalSource for TestSignalSource {
    fn arm(&self) -> Result<Box<dyn ShutdownSignal>, ShutdownError> {
        self.arms.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(self.signal.clone()))
    }
}
