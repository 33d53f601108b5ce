//! Tone pipeline configuration.

use std::time::Duration;

/// Sine terms used when a message carries no harmonics of its own:
/// silence at harmonics 1 and 3, full amplitude at harmonics 2 and 4.
pub const DEFAULT_HARMONICS: [f64; 5] = [0.0, 0.0, 1.0, 0.0, 1.0];

/// How a tone's amplitude is shaped.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Envelope {
    /// Each tone gets its own gain stage that starts at `peak` and decays
    /// exponentially to `floor` over `duration`.
    Decay {
        peak: f32,
        floor: f32,
        duration: Duration,
    },
    /// Every tone feeds one shared gain stage, created once at activation
    /// and fixed at `gain`.
    Master { gain: f32 },
}

impl Envelope {
    /// 10% of full scale decaying to 0.0001 over three seconds
    pub const DECAY: Envelope = Envelope::Decay {
        peak: 0.1,
        floor: 0.0001,
        duration: Duration::from_secs(3),
    };

    /// Flat 10% master volume
    pub const MASTER: Envelope = Envelope::Master { gain: 0.1 };
}

/// Configuration for a [`TonePort`](crate::TonePort).
///
/// The default is the full-fidelity design: per-tone decaying envelopes and a
/// stop after 3 s, once the tone is already silent. [`ToneConfig::blip`] is
/// the simplified design: a shared master gain and a 500 ms stop.
///
/// ```
/// # use std::time::Duration;
/// # use toneport::{Envelope, ToneConfig};
/// let config = ToneConfig::default()
///     .with_stop_after(Duration::from_millis(1500))
///     .with_fallback_harmonics(vec![0.0, 1.0]);
/// assert_eq!(config.envelope, Envelope::DECAY);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct ToneConfig {
    pub envelope: Envelope,
    /// Delay between starting a tone and stopping it
    pub stop_after: Duration,
    /// Sine terms for bare-frequency messages and messages without `sineTerms`
    pub fallback_harmonics: Vec<f64>,
}

impl Default for ToneConfig {
    fn default() -> Self {
        Self {
            envelope: Envelope::DECAY,
            stop_after: Duration::from_millis(3000),
            fallback_harmonics: DEFAULT_HARMONICS.to_vec(),
        }
    }
}

impl ToneConfig {
    /// Short fixed-volume blips through a shared master gain
    pub fn blip() -> Self {
        Self {
            envelope: Envelope::MASTER,
            stop_after: Duration::from_millis(500),
            ..Self::default()
        }
    }

    pub fn with_envelope(mut self, envelope: Envelope) -> Self {
        self.envelope = envelope;
        self
    }

    pub fn with_stop_after(mut self, stop_after: Duration) -> Self {
        self.stop_after = stop_after;
        self
    }

    pub fn with_fallback_harmonics(mut self, harmonics: Vec<f64>) -> Self {
        self.fallback_harmonics = harmonics;
        self
    }

    /// Whether activation must build a shared master gain stage
    #[inline]
    pub fn uses_master_gain(&self) -> bool {
        matches!(self.envelope, Envelope::Master { .. })
    }
}
