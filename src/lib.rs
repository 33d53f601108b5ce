//! Toneport - message-driven tone synthesis
//!
//! A host hands [`TonePort`] text messages such as
//! `{"frequency": 523.25, "sineTerms": [0, 0, 1, 0, 1]}`. Each accepted
//! message becomes an oscillator playing a custom periodic wave, shaped by a
//! gain envelope, started immediately and stopped after a fixed delay.
//!
//! - [`message`] parses and validates inbound text into a [`ToneRequest`]
//! - [`synth`] builds the oscillator and gain chain on an [`AudioBackend`]
//! - [`scheduler`] starts voices and fires their deferred stops
//! - [`gate`] holds off opening the backend until the first user gesture
//!
//! [`Engine`] is the bundled backend: a block-based audio graph that renders
//! to a device (feature `cpal_sink`) or to a ring buffer.

mod node;
mod graph;
mod engine;
pub mod nodes;
pub mod param;
pub mod wave;

pub mod backend;
pub mod config;
pub mod error;
pub mod gate;
pub mod message;
pub mod port;
pub mod scheduler;
pub mod synth;

#[cfg(feature = "cpal_sink")]
mod device;

pub use node::{AudioNode, ProcessContext, NodeId};
pub use engine::{Engine, Handle};
pub use nodes::RtrbSink;
pub use wave::PeriodicWave;

pub use backend::AudioBackend;
pub use config::{Envelope, ToneConfig, DEFAULT_HARMONICS};
pub use error::{BackendError, ParseError, PlaybackError, ToneError};
pub use gate::{ActivationGate, AudioOutput};
pub use message::{parse, parse_with_fallback, ToneRequest, C5_FREQUENCY};
pub use port::{PlayedTone, TonePort};
pub use scheduler::{PlaybackScheduler, TimerId, TimerQueue};
pub use synth::{synthesize, Voice};

#[cfg(feature = "cpal_sink")]
pub use device::CpalDevice;
