//! Ring buffer sink for offline rendering

use dasp_graph::{Buffer, Input};
use rtrb::Producer;
use tracing::trace;

use super::push_interleaved;
use crate::node::{AudioNode, ProcessContext};

/// A sink that pushes interleaved audio into an rtrb ring buffer
///
/// Lets an [`Engine`](crate::Engine) render without an audio device: the
/// consumer side can be drained by a test, a file writer or another thread.
pub struct RtrbSink {
    producer: Producer<f32>,
    channels: usize,
    dropped_blocks: u64,
}

impl RtrbSink {
    /// Create a sink that writes `channels` interleaved samples per frame.
    ///
    /// A block that does not fit in the ring buffer is dropped whole.
    pub fn new(producer: Producer<f32>, channels: usize) -> Self {
        Self {
            producer,
            channels: channels.max(1),
            dropped_blocks: 0,
        }
    }

    /// Create a sink for mono audio
    pub fn mono(producer: Producer<f32>) -> Self {
        Self::new(producer, 1)
    }
}

impl AudioNode for RtrbSink {
    type Message = ();

    fn process(
        &mut self,
        _ctx: &ProcessContext,
        _messages: impl Iterator<Item = ()>,
        inputs: &[Input],
        _outputs: &mut [Buffer],
    ) {
        if !push_interleaved(inputs, self.channels, &mut self.producer) {
            self.dropped_blocks += 1;
            trace!(dropped = self.dropped_blocks, "ring buffer full, dropping block");
        }
    }

    #[inline]
    fn num_inputs(&self) -> usize { 1 }

    #[inline]
    fn num_outputs(&self) -> usize { 0 }
}
