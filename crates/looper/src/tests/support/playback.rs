use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::playback::{LoopCount, PlaybackEngine, PlaybackError, PlaybackHandle};

#[derive(Default)]
struct State {
    done: AtomicBool,
    closes: AtomicUsize,
    fail: AtomicBool,
    plays: Mutex<Vec<(PathBuf, LoopCount)>>,
}

/// Playback engine whose completion is driven by the test.
#[derive(Clone, Default)]
pub struct FakePlayback {
    state: Arc<State>,
}

impl FakePlayback {
    /// Engine whose playback is already complete when started.
    pub fn finished() -> Self {
        let engine = Self::default();
        engine.finish();
        engine
    }

    pub fn finish(&self) {
        self.state.done.store(true, Ordering::SeqCst);
    }

    pub fn fail_to_start(&self) {
        self.state.fail.store(true, Ordering::SeqCst);
    }

    pub fn closes(&self) -> usize {
        self.state.closes.load(Ordering::SeqCst)
    }

    pub fn plays(&self) -> Vec<(PathBuf, LoopCount)> {
        self.state.plays.lock().expect("playback mutex poisoned").clone()
    }
}

struct FakeHandle {
    state: Arc<State>,
}

impl PlaybackEngine for FakePlayback {
    fn play(&self, asset: &Path, loops: LoopCount) -> Result<Box<dyn PlaybackHandle>, PlaybackError> {
        if self.state.fail.load(Ordering::SeqCst) {
            return Err(PlaybackError::Output {
                message: "no output device".to_owned(),
            });
        }
        self.state
            .plays
            .lock()
            .expect("playback mutex poisoned")
            .push((asset.to_path_buf(), loops));
        Ok(Box::new(FakeHandle {
            state: Arc::clone(&self.state),
        }))
    }
}

impl PlaybackHandle for FakeHandle {
    fn is_done(&self) -> bool {
        self.state.done.load(Ordering::SeqCst)
    }

    fn close(&mut self) {
        self.state.closes.fetch_add(1, Ordering::SeqCst);
    }
}
