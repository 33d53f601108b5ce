//! Gain/amplitude stage with scheduled automation

use dasp_graph::{Buffer, Input};

use crate::node::{AudioNode, ProcessContext};
use crate::param::Param;

/// Messages to control gain
#[derive(Clone, Copy, Debug)]
pub enum GainMessage {
    /// Set the gain multiplier immediately, dropping any scheduled automation
    SetGain(f32),
    /// Jump to `value` at time `at` (seconds)
    SetValueAtTime { value: f32, at: f64 },
    /// Ramp exponentially from the previous scheduled value to `value`, arriving at `end`
    ExponentialRampToValueAtTime { value: f32, end: f64 },
}

/// A gain stage that scales its input by an automatable multiplier
///
/// Mono output. Every connected input is summed, multi-channel inputs
/// contribute their first channel.
pub struct Gain {
    gain: Param,
}

impl Gain {
    /// Create a mono gain node with the specified gain value
    pub fn new(gain: f32) -> Self {
        Self { gain: Param::new(gain) }
    }

    /// Gain at time `t` in seconds
    #[inline]
    pub fn gain_at(&self, t: f64) -> f32 {
        self.gain.value_at(t)
    }
}

impl AudioNode for Gain {
    type Message = GainMessage;

    fn process(
        &mut self,
        ctx: &ProcessContext,
        messages: impl Iterator<Item = GainMessage>,
        inputs: &[Input],
        outputs: &mut [Buffer],
    ) {
        let now = ctx.block_start();

        for msg in messages {
            match msg {
                GainMessage::SetGain(g) => self.gain.set_value(g, now),
                GainMessage::SetValueAtTime { value, at } => self.gain.set_value_at_time(value, at),
                GainMessage::ExponentialRampToValueAtTime { value, end } => {
                    self.gain.exponential_ramp_to_value_at_time(value, end)
                }
            }
        }
        self.gain.advance(now);

        let mut gains = [0.0f32; Buffer::LEN];
        for (i, g) in gains.iter_mut().enumerate() {
            *g = self.gain.value_at(ctx.time_at(i));
        }

        for buffer in outputs.iter_mut() {
            buffer.iter_mut().for_each(|s| *s = 0.0);
        }

        // Every connected input is summed; the master stage has one per voice
        for input in inputs {
            let in_buffers = input.buffers();
            let Some(last) = in_buffers.last() else {
                continue;
            };
            for (ch, out_buffer) in outputs.iter_mut().enumerate() {
                let in_buffer = in_buffers.get(ch).unwrap_or(last);
                for ((out, &x), &g) in out_buffer.iter_mut().zip(in_buffer.iter()).zip(gains.iter()) {
                    *out += x * g;
                }
            }
        }
    }

    #[inline]
    fn num_inputs(&self) -> usize { usize::MAX }
}
