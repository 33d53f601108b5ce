//! Core node trait and context types.

use dasp_graph::{Buffer, Input};

/// Information available during audio processing.
///
/// Passed to every [`AudioNode::process`] call.
#[derive(Clone, Copy, Debug)]
pub struct ProcessContext {
    /// Sample rate of the graph in Hz (e.g., 44100, 48000)
    pub sample_rate: u32,
    /// Number of samples per buffer (always 64, the dasp_graph buffer length)
    pub buffer_size: usize,
    /// Index of the first frame of this block since the graph was created
    pub frame: u64,
}

impl ProcessContext {
    /// Absolute time in seconds of sample `i` within the current block.
    #[inline]
    pub fn time_at(&self, i: usize) -> f64 {
        (self.frame + i as u64) as f64 / self.sample_rate as f64
    }

    /// Time in seconds of the first sample of the block.
    #[inline]
    pub fn block_start(&self) -> f64 {
        self.time_at(0)
    }
}

/// Unique identifier for a node within a graph.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct NodeId(pub(crate) u32);

/// The core trait for audio processing nodes.
///
/// Nodes can be:
/// - **Sources**: Generate audio (0 inputs, 1+ outputs) - oscillators
/// - **Effects**: Process audio (1+ inputs, 1+ outputs) - gain, mixing
/// - **Sinks**: Consume audio (1+ inputs, 0 outputs) - device outputs, ring buffers
///
/// # Message-Based Parameters
///
/// Instead of shared mutable state, nodes receive parameter updates via messages
/// drained at the start of each block:
///
/// ```
/// use toneport::{AudioNode, ProcessContext};
/// use dasp_graph::{Buffer, Input};
///
/// enum ClickMessage {
///     Fire,
/// }
///
/// struct Click {
///     pending: bool,
/// }
///
/// impl AudioNode for Click {
///     type Message = ClickMessage;
///
///     fn process(
///         &mut self,
///         _ctx: &ProcessContext,
///         messages: impl Iterator<Item = ClickMessage>,
///         _inputs: &[Input],
///         outputs: &mut [Buffer],
///     ) {
///         for msg in messages {
///             match msg {
///                 ClickMessage::Fire => self.pending = true,
///             }
///         }
///
///         for buffer in outputs.iter_mut() {
///             buffer.iter_mut().for_each(|s| *s = 0.0);
///             if self.pending {
///                 buffer[0] = 1.0;
///             }
///         }
///         self.pending = false;
///     }
/// }
/// ```
pub trait AudioNode: Send + 'static {
    /// Message type for parameter updates.
    ///
    /// Use a custom enum for nodes with parameters, or `()` for nodes without.
    type Message: Send + 'static;

    /// Process one block of audio.
    ///
    /// 1. Drain and handle all pending messages
    /// 2. Read from `inputs` (if any)
    /// 3. Write to `outputs`
    fn process(
        &mut self,
        ctx: &ProcessContext,
        messages: impl Iterator<Item = Self::Message>,
        inputs: &[Input],
        outputs: &mut [Buffer],
    );

    /// Number of audio input channels (0 for sources).
    fn num_inputs(&self) -> usize { 0 }

    /// Number of audio output channels.
    fn num_outputs(&self) -> usize { 1 }
}
