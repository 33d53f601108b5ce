//! Deferred audio output activation.
//!
//! Audio hardware may only be opened after a user gesture. The gate starts
//! out waiting; the first [`activate`](ActivationGate::activate) opens the
//! backend, and every later call is a no-op.

use tracing::{debug, info};

use crate::backend::AudioBackend;
use crate::config::{Envelope, ToneConfig};
use crate::error::BackendError;

/// A live audio backend plus the shared master gain stage, if the
/// configuration uses one.
pub struct AudioOutput<B: AudioBackend> {
    backend: B,
    master: Option<B::Node>,
}

impl<B: AudioBackend> AudioOutput<B> {
    #[inline]
    pub fn backend(&self) -> &B {
        &self.backend
    }

    #[inline]
    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    /// The shared master gain stage, written once at activation
    #[inline]
    pub fn master(&self) -> Option<B::Node> {
        self.master
    }
}

/// Activation state of the audio output: `Waiting -> Ready`, never back.
pub enum ActivationGate<B: AudioBackend> {
    Waiting,
    Ready(AudioOutput<B>),
}

impl<B: AudioBackend> Default for ActivationGate<B> {
    fn default() -> Self {
        ActivationGate::Waiting
    }
}

impl<B: AudioBackend> ActivationGate<B> {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn is_ready(&self) -> bool {
        matches!(self, ActivationGate::Ready(_))
    }

    pub fn output(&self) -> Option<&AudioOutput<B>> {
        match self {
            ActivationGate::Ready(output) => Some(output),
            ActivationGate::Waiting => None,
        }
    }

    pub fn output_mut(&mut self) -> Option<&mut AudioOutput<B>> {
        match self {
            ActivationGate::Ready(output) => Some(output),
            ActivationGate::Waiting => None,
        }
    }

    /// Open the backend with `open` unless it is already open.
    ///
    /// Returns `Ok(true)` if this call opened the backend and `Ok(false)` if
    /// it was already open, in which case `open` is not called. On error the
    /// gate stays waiting and a later call may try again.
    pub fn activate<F>(&mut self, config: &ToneConfig, open: F) -> Result<bool, BackendError>
    where
        F: FnOnce() -> Result<B, BackendError>,
    {
        if self.is_ready() {
            debug!("audio output already active");
            return Ok(false);
        }

        let mut backend = open()?;
        let master = match config.envelope {
            Envelope::Master { gain } => {
                let stage = backend.create_gain(gain)?;
                let destination = backend.destination();
                backend.connect(stage, destination)?;
                Some(stage)
            }
            Envelope::Decay { .. } => None,
        };

        *self = ActivationGate::Ready(AudioOutput { backend, master });
        info!("audio output activated");
        Ok(true)
    }
}
