//! The tone port: inbound text messages in, scheduled tones out.

use tracing::{info, warn};

use crate::backend::AudioBackend;
use crate::config::ToneConfig;
use crate::error::{BackendError, PlaybackError, ToneError};
use crate::gate::{ActivationGate, AudioOutput};
use crate::message::{self, ToneRequest};
use crate::scheduler::{PlaybackScheduler, TimerId};
use crate::synth::{self, Voice};

/// A tone that was started, and the timer that will stop it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlayedTone<N> {
    pub voice: Voice<N>,
    pub stop_timer: TimerId,
}

/// Runs the whole pipeline for one audio output:
/// parse -> synthesize -> start -> schedule stop.
///
/// The backend is opened lazily by [`activate`](Self::activate), which the
/// host calls on the first user gesture. Messages that arrive earlier, or that
/// fail to parse, are logged and skipped.
///
/// Everything runs on the caller's thread. The host must call
/// [`poll`](Self::poll) regularly (e.g. after each rendered block) so that
/// due stops fire.
pub struct TonePort<B: AudioBackend, F> {
    config: ToneConfig,
    open: F,
    gate: ActivationGate<B>,
    scheduler: PlaybackScheduler<B::Node>,
}

impl<B, F> TonePort<B, F>
where
    B: AudioBackend,
    F: FnMut() -> Result<B, BackendError>,
{
    /// Create a port that opens its backend with `open` on activation
    pub fn new(config: ToneConfig, open: F) -> Self {
        Self {
            config,
            open,
            gate: ActivationGate::new(),
            scheduler: PlaybackScheduler::new(),
        }
    }

    pub fn config(&self) -> &ToneConfig {
        &self.config
    }

    /// Handle the user gesture: open the backend on the first call only.
    ///
    /// Returns `Ok(true)` if this call opened the backend.
    pub fn activate(&mut self) -> Result<bool, BackendError> {
        let open = &mut self.open;
        self.gate.activate(&self.config, || open()).map_err(|err| {
            warn!(%err, "could not open audio output");
            err
        })
    }

    pub fn is_ready(&self) -> bool {
        self.gate.is_ready()
    }

    pub fn output(&self) -> Option<&AudioOutput<B>> {
        self.gate.output()
    }

    /// Access the live backend, e.g. to render audio blocks
    pub fn backend_mut(&mut self) -> Option<&mut B> {
        self.gate.output_mut().map(AudioOutput::backend_mut)
    }

    /// Parse an inbound message and play it.
    ///
    /// Failures are logged here; callers may ignore the result.
    pub fn play(&mut self, raw: &str) -> Result<PlayedTone<B::Node>, ToneError> {
        let request = message::parse_with_fallback(raw, &self.config.fallback_harmonics)?;
        info!(frequency = request.frequency, harmonics = ?request.harmonics, "playing sound");
        Ok(self.play_request(&request)?)
    }

    /// Play an already validated request.
    pub fn play_request(&mut self, request: &ToneRequest) -> Result<PlayedTone<B::Node>, PlaybackError> {
        let voice = synth::synthesize(&mut self.gate, request, &self.config).map_err(|err| {
            warn!(%err, frequency = request.frequency, "tone skipped");
            err
        })?;

        // synthesize only succeeds on an active gate
        let output = self.gate.output_mut().ok_or(PlaybackError::BackendNotReady)?;
        let backend = output.backend_mut();
        self.scheduler.start(backend, &voice);
        let stop_timer = self.scheduler.schedule_stop(backend, voice, self.config.stop_after);

        Ok(PlayedTone { voice, stop_timer })
    }

    /// Fire every due stop. Returns how many voices were stopped.
    pub fn poll(&mut self) -> usize {
        match self.gate.output_mut() {
            Some(output) => self.scheduler.fire_due(output.backend_mut()),
            None => 0,
        }
    }

    /// Voices started and not yet stopped
    pub fn active_voices(&self) -> usize {
        self.scheduler.pending()
    }
}
