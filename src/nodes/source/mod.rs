//! Audio source nodes (generators with no audio inputs)

mod oscillator;

pub use oscillator::{Oscillator, OscillatorMessage};
