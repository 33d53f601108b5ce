//! Summing output bus

use dasp_graph::{Buffer, Input};
use crate::node::{AudioNode, ProcessContext};

/// Mono bus that every voice connects to.
///
/// Each input is folded down to mono (channels averaged) and added to the
/// output. With no inputs the bus renders silence.
#[derive(Default)]
pub struct Bus;

impl Bus {
    pub fn new() -> Self {
        Self
    }
}

impl AudioNode for Bus {
    type Message = ();

    fn process(
        &mut self,
        _ctx: &ProcessContext,
        _messages: impl Iterator<Item = Self::Message>,
        inputs: &[Input],
        outputs: &mut [Buffer],
    ) {
        let Some(out) = outputs.first_mut() else {
            return;
        };
        out.iter_mut().for_each(|s| *s = 0.0);

        for input in inputs {
            let channels = input.buffers();
            if channels.is_empty() {
                continue;
            }

            let scale = 1.0 / channels.len() as f32;
            for channel in channels {
                for (acc, s) in out.iter_mut().zip(channel.iter()) {
                    *acc += *s * scale;
                }
            }
        }
    }

    fn num_inputs(&self) -> usize {
        usize::MAX
    }
}
