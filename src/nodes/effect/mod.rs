//! Audio effect nodes (processors with audio inputs and outputs)

mod gain;
mod bus;

pub use gain::{Gain, GainMessage};
pub use bus::Bus;
