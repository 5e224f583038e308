use std::time::Duration;

use tracing::debug;

/// Fire-and-forget sound cues addressed by name. Calls never block on
/// playback and never report failure to the caller.
pub trait AudioBackend {
    /// Starts `cue`, restarting it if it is already playing. `start_offset`
    /// seeks into the clip before playback.
    fn play(&mut self, cue: &str, start_offset: Option<Duration>);
    fn stop(&mut self, cue: &str);
    fn pause_all(&mut self);
    fn resume_all(&mut self);
}

/// Backend used when no audio device is wired up: cues only show up in logs.
#[derive(Debug, Default)]
pub struct LoggingAudio;

impl AudioBackend for LoggingAudio {
    fn play(&mut self, cue: &str, start_offset: Option<Duration>) {
        debug!(
            cue,
            start_offset_ms = start_offset.map(|offset| offset.as_millis() as u64),
            "audio_play"
        );
    }

    fn stop(&mut self, cue: &str) {
        debug!(cue, "audio_stop");
    }

    fn pause_all(&mut self) {
        debug!("audio_pause_all");
    }

    fn resume_all(&mut self) {
        debug!("audio_resume_all");
    }
}

#[cfg(feature = "audio")]
pub use rodio_backend::{AudioError, RodioAudio};

#[cfg(feature = "audio")]
mod rodio_backend {
    use std::collections::HashMap;
    use std::fs;
    use std::io::Cursor;
    use std::path::{Path, PathBuf};
    use std::sync::Arc;
    use std::time::Duration;

    use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink, Source};
    use thiserror::Error;
    use tracing::{debug, info, warn};

    use super::AudioBackend;

    #[derive(Debug, Error)]
    pub enum AudioError {
        #[error("failed to open default audio output: {0}")]
        Device(#[source] rodio::StreamError),
        #[error("failed to read audio clip {path}: {source}")]
        Read {
            path: PathBuf,
            #[source]
            source: std::io::Error,
        },
    }

    /// Plays `<dir>/<cue>.wav` clips on the default output device, one sink per
    /// cue so restarting a cue cuts off only its own previous instance.
    pub struct RodioAudio {
        _stream: OutputStream,
        handle: OutputStreamHandle,
        clips: HashMap<String, Arc<Vec<u8>>>,
        playing: HashMap<String, Sink>,
        paused: bool,
    }

    impl RodioAudio {
        pub fn open(dir: &Path, cues: &[&str]) -> Result<Self, AudioError> {
            let (stream, handle) = OutputStream::try_default().map_err(AudioError::Device)?;
            let mut clips = HashMap::with_capacity(cues.len());
            for cue in cues {
                let path = dir.join(format!("{cue}.wav"));
                let bytes =
                    fs::read(&path).map_err(|source| AudioError::Read { path, source })?;
                clips.insert((*cue).to_string(), Arc::new(bytes));
            }
            info!(clip_count = clips.len(), "audio_ready");
            Ok(Self {
                _stream: stream,
                handle,
                clips,
                playing: HashMap::new(),
                paused: false,
            })
        }
    }

    impl AudioBackend for RodioAudio {
        fn play(&mut self, cue: &str, start_offset: Option<Duration>) {
            self.playing.retain(|_, sink| !sink.empty());
            let Some(bytes) = self.clips.get(cue) else {
                warn!(cue, "audio_cue_unknown");
                return;
            };
            let decoder = match Decoder::new(Cursor::new(bytes.as_ref().clone())) {
                Ok(decoder) => decoder,
                Err(error) => {
                    warn!(cue, error = %error, "audio_decode_failed");
                    return;
                }
            };
            let sink = match Sink::try_new(&self.handle) {
                Ok(sink) => sink,
                Err(error) => {
                    warn!(cue, error = %error, "audio_sink_failed");
                    return;
                }
            };
            sink.append(decoder.skip_duration(start_offset.unwrap_or(Duration::ZERO)));
            if self.paused {
                sink.pause();
            }
            debug!(cue, "audio_play");
            self.playing.insert(cue.to_string(), sink);
        }

        fn stop(&mut self, cue: &str) {
            if let Some(sink) = self.playing.remove(cue) {
                sink.stop();
                debug!(cue, "audio_stop");
            }
        }

        fn pause_all(&mut self) {
            self.paused = true;
            for sink in self.playing.values() {
                sink.pause();
            }
        }

        fn resume_all(&mut self) {
            self.paused = false;
            for sink in self.playing.values() {
                sink.play();
            }
        }
    }
}
