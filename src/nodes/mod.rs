//! Built-in audio nodes.
//!
//! ## Sources ([`source`])
//! - [`Oscillator`] - Wavetable oscillator built from a [`PeriodicWave`](crate::PeriodicWave)
//!
//! ## Effects ([`effect`])
//! - [`Gain`] - Amplitude stage with scheduled automation (per-tone envelopes, master volume)
//! - [`Bus`] - Mono summing bus; the engine's destination
//!
//! ## Sinks ([`sink`])
//! - [`CpalSink`] - Output to system audio device (requires `cpal_sink` feature)
//! - [`RtrbSink`] - Write to ring buffer (offline rendering, analysis)

pub mod source;
pub mod effect;
pub mod sink;

pub use source::{Oscillator, OscillatorMessage};
pub use effect::{Bus, Gain, GainMessage};
pub use sink::RtrbSink;

#[cfg(feature = "cpal_sink")]
pub use sink::CpalSink;
