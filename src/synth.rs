//! Tone synthesis: request in, connected voice out.

use tracing::debug;

use crate::backend::AudioBackend;
use crate::config::{Envelope, ToneConfig};
use crate::error::{BackendError, PlaybackError};
use crate::gate::ActivationGate;
use crate::message::ToneRequest;

/// The backend nodes making up one tone.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Voice<N> {
    /// The oscillator; started and stopped by the scheduler
    pub source: N,
    /// The per-tone gain stage, absent when tones share the master gain
    pub gain: Option<N>,
    pub frequency: f32,
}

/// Build the node chain for `request` without starting it.
///
/// The oscillator plays a periodic wave whose sine terms are the request's
/// harmonics and whose cosine terms are all zero. With a [`Envelope::Decay`]
/// envelope it feeds a fresh gain stage that holds `peak` now and ramps
/// exponentially to `floor` over `duration`; with [`Envelope::Master`] it feeds
/// the shared master stage.
///
/// Fails with [`PlaybackError::BackendNotReady`] before activation, without
/// touching any backend. If the backend fails part way, the nodes already
/// created are released before the error is returned.
pub fn synthesize<B: AudioBackend>(
    gate: &mut ActivationGate<B>,
    request: &ToneRequest,
    config: &ToneConfig,
) -> Result<Voice<B::Node>, PlaybackError> {
    let output = gate.output_mut().ok_or(PlaybackError::BackendNotReady)?;
    let master = output.master();
    let backend = output.backend_mut();

    let imag: Vec<f32> = request.harmonics.iter().map(|&h| h as f32).collect();
    let real = vec![0.0; imag.len()];
    let wave = backend.create_periodic_wave(real, imag);

    let frequency = request.frequency as f32;
    let source = backend.create_oscillator(frequency, &wave)?;

    let gain = match config.envelope {
        Envelope::Decay { peak, floor, duration } => {
            let gain = backend.create_gain(peak).map_err(|err| abandon(backend, &[source], err))?;
            decay(backend, source, gain, peak, floor, duration.as_secs_f64())
                .map_err(|err| abandon(backend, &[source, gain], err))?;
            Some(gain)
        }
        Envelope::Master { .. } => {
            let target = master.unwrap_or_else(|| backend.destination());
            backend.connect(source, target).map_err(|err| abandon(backend, &[source], err))?;
            None
        }
    };

    debug!(frequency, harmonics = wave.len(), ?source, "tone synthesized");

    Ok(Voice { source, gain, frequency })
}

/// Hold `peak` now, ramp to `floor` over `duration` seconds, and wire
/// source -> gain -> destination
fn decay<B: AudioBackend>(
    backend: &mut B,
    source: B::Node,
    gain: B::Node,
    peak: f32,
    floor: f32,
    duration: f64,
) -> Result<(), BackendError> {
    let now = backend.current_time();
    backend.set_value_at_time(gain, peak, now)?;
    backend.exponential_ramp_to_value_at_time(gain, floor, now + duration)?;
    backend.connect(source, gain)?;
    let destination = backend.destination();
    backend.connect(gain, destination)
}

/// Release the nodes of a tone that could not be wired; no stop will ever reach them
fn abandon<B: AudioBackend>(backend: &mut B, nodes: &[B::Node], err: BackendError) -> BackendError {
    for &node in nodes {
        backend.release(node);
    }
    debug!(%err, ?nodes, "tone abandoned, nodes released");
    err
}
