use std::fs::File;
use std::io::BufReader;
use std::iter::{self, Repeat, Take};
use std::path::Path;

use rodio::source::{self, FromIter};
use rodio::{Decoder, OutputStream, Sample, Sink, Source};
use tracing::info;

use super::{LoopCount, PlaybackEngine, PlaybackError, PlaybackHandle};

const PLAYBACK_TARGET: &str = "looper::playback";

/// Plays through the default output device.
#[derive(Debug, Clone, Copy, Default)]
pub struct RodioEngine;

struct RodioPlayback {
    _stream: OutputStream,
    sink: Sink,
}

impl PlaybackEngine for RodioEngine {
    fn play(&self, asset: &Path, loops: LoopCount) -> Result<Box<dyn PlaybackHandle>, PlaybackError> {
        let file = File::open(asset).map_err(|source| PlaybackError::Open {
            path: asset.to_path_buf(),
            source,
        })?;
        let decoder = Decoder::new(BufReader::new(file)).map_err(|error| PlaybackError::Decode {
            path: asset.to_path_buf(),
            message: error.to_string(),
        })?;

        let (stream, handle) = OutputStream::try_default().map_err(|error| PlaybackError::Output {
            message: error.to_string(),
        })?;
        let sink = Sink::try_new(&handle).map_err(|error| PlaybackError::Output {
            message: error.to_string(),
        })?;

        match loops {
            LoopCount::Infinite => sink.append(decoder.repeat_infinite()),
            LoopCount::Finite(count) => sink.append(looped(decoder.buffered(), count)),
        }
        info!(
            target: PLAYBACK_TARGET,
            asset = %asset.display(),
            loops = ?loops,
            "playback started"
        );
        Ok(Box::new(RodioPlayback {
            _stream: stream,
            sink,
        }))
    }
}

/// Chains `count` plays of `clip`, each one cloned only when the previous
/// play ends.
fn looped<S>(clip: S, count: u32) -> FromIter<Take<Repeat<S>>>
where
    S: Source + Clone,
    S::Item: Sample,
{
    let count = usize::try_from(count).unwrap_or(usize::MAX);
    source::from_iter(iter::repeat(clip).take(count))
}

impl PlaybackHandle for RodioPlayback {
    fn is_done(&self) -> bool {
        self.sink.empty()
    }

    fn close(&mut self) {
        self.sink.stop();
        info!(target: PLAYBACK_TARGET, "playback stopped");
    }
}
