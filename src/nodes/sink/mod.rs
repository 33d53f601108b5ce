//! Audio sink nodes (consumers with no audio outputs)

use dasp_graph::Input;
use rtrb::Producer;

mod rtrb_sink;
#[cfg(feature = "cpal_sink")]
mod cpal_sink;

pub use rtrb_sink::RtrbSink;
#[cfg(feature = "cpal_sink")]
pub use cpal_sink::CpalSink;

/// Push the first input into `producer` as interleaved frames of `channels`
/// samples. Inputs with fewer channels repeat their last one.
///
/// Writes the whole block or nothing. Returns `false` when the block was
/// dropped for lack of space.
pub(crate) fn push_interleaved(inputs: &[Input], channels: usize, producer: &mut Producer<f32>) -> bool {
    let Some(buffers) = inputs.first().map(Input::buffers).filter(|b| !b.is_empty()) else {
        return true;
    };

    let frames = buffers[0].len();
    if producer.slots() < frames * channels {
        return false;
    }

    let last = buffers.len() - 1;
    for i in 0..frames {
        for ch in 0..channels {
            let _ = producer.push(buffers[ch.min(last)][i]);
        }
    }
    true
}
