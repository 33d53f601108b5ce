//! The audio backend capability set.
//!
//! The tone pipeline never talks to an audio device directly. It asks an
//! [`AudioBackend`] for a periodic wave, an oscillator, a gain stage and the
//! connections between them. [`Engine`](crate::Engine) is the real
//! implementation; tests substitute a recording fake.

use std::fmt::Debug;

use crate::error::BackendError;
use crate::wave::PeriodicWave;

/// Operations the tone pipeline needs from an audio output.
///
/// Times are in seconds on the backend's own clock ([`current_time`](Self::current_time)).
pub trait AudioBackend {
    /// Handle to a node created by this backend
    type Node: Copy + Eq + Debug;

    /// Current time of the backend clock in seconds, starting at 0
    fn current_time(&self) -> f64;

    /// Final output bus; everything audible is connected here
    fn destination(&self) -> Self::Node;

    /// Build a periodic waveform from cosine (`real`) and sine (`imag`) terms
    fn create_periodic_wave(&mut self, real: Vec<f32>, imag: Vec<f32>) -> PeriodicWave {
        PeriodicWave::new(real, imag)
    }

    /// Create an oscillator that plays `wave` at `frequency` Hz once started
    fn create_oscillator(&mut self, frequency: f32, wave: &PeriodicWave) -> Result<Self::Node, BackendError>;

    /// Create a gain stage with an initial multiplier
    fn create_gain(&mut self, value: f32) -> Result<Self::Node, BackendError>;

    /// Schedule a gain stage to jump to `value` at time `at`
    fn set_value_at_time(&mut self, gain: Self::Node, value: f32, at: f64) -> Result<(), BackendError>;

    /// Schedule a true exponential ramp from the gain's previous scheduled value to `value`, ending at `end`
    fn exponential_ramp_to_value_at_time(&mut self, gain: Self::Node, value: f32, end: f64) -> Result<(), BackendError>;

    /// Route the output of `from` into `to`
    fn connect(&mut self, from: Self::Node, to: Self::Node) -> Result<(), BackendError>;

    /// Start a source at time `at`. A source can only be started once.
    fn start(&mut self, source: Self::Node, at: f64);

    /// Stop a source at time `at`
    fn stop(&mut self, source: Self::Node, at: f64);

    /// Free a node whose tone has ended
    fn release(&mut self, _node: Self::Node) {}
}
