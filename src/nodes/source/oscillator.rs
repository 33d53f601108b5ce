//! Wavetable oscillator driven by a periodic wave

use dasp_graph::{Buffer, Input};
use tracing::{debug, warn};

use crate::node::{AudioNode, ProcessContext};
use crate::wave::{PeriodicWave, TABLE_SIZE};

/// Messages to control an Oscillator
#[derive(Clone, Copy, Debug)]
pub enum OscillatorMessage {
    /// Begin producing sound at the given time in seconds. Only the first start counts.
    Start(f64),
    /// Fall silent at the given time in seconds
    Stop(f64),
}

/// A single-cycle wavetable oscillator (mono source)
///
/// Silent until started, and silent again once its stop time has passed.
pub struct Oscillator {
    table: Vec<f32>,
    frequency: f32,
    phase: f32,
    start_at: Option<f64>,
    stop_at: Option<f64>,
    warned: bool,
}

impl Oscillator {
    pub fn new(frequency: f32, wave: &PeriodicWave) -> Self {
        Self {
            table: wave.render(),
            frequency,
            phase: 0.0,
            start_at: None,
            stop_at: None,
            warned: false,
        }
    }

    /// Whether the oscillator sounds at time `t`
    #[inline]
    fn is_playing(&self, t: f64) -> bool {
        match self.start_at {
            Some(start) => t >= start && self.stop_at.map_or(true, |stop| t < stop),
            None => false,
        }
    }

    #[inline]
    fn lookup(&self) -> f32 {
        let pos = self.phase * TABLE_SIZE as f32;
        let i = pos as usize % TABLE_SIZE;
        let frac = pos - pos.floor();
        let a = self.table[i];
        let b = self.table[(i + 1) % TABLE_SIZE];
        a + (b - a) * frac
    }
}

impl AudioNode for Oscillator {
    type Message = OscillatorMessage;

    fn process(
        &mut self,
        ctx: &ProcessContext,
        messages: impl Iterator<Item = OscillatorMessage>,
        _inputs: &[Input],
        outputs: &mut [Buffer],
    ) {
        for msg in messages {
            match msg {
                OscillatorMessage::Start(at) => {
                    if self.start_at.is_some() {
                        debug!(at, "oscillator already started, ignoring start");
                    } else {
                        self.start_at = Some(at);
                    }
                }
                OscillatorMessage::Stop(at) => self.stop_at = Some(at),
            }
        }

        let phase_inc = self.frequency / ctx.sample_rate as f32;
        if !phase_inc.is_finite() {
            if !self.warned {
                warn!(frequency = self.frequency, "oscillator frequency out of range, rendering silence");
                self.warned = true;
            }
            for buffer in outputs.iter_mut() {
                buffer.iter_mut().for_each(|s| *s = 0.0);
            }
            return;
        }

        let Some((first, rest)) = outputs.split_first_mut() else {
            return;
        };

        for (i, sample) in first.iter_mut().enumerate() {
            if !self.is_playing(ctx.time_at(i)) {
                *sample = 0.0;
                continue;
            }

            *sample = self.lookup();

            self.phase += phase_inc;
            self.phase -= self.phase.floor();
        }

        // Copy to remaining output channels (if any)
        for buffer in rest.iter_mut() {
            buffer.copy_from_slice(first);
        }
    }

    #[inline]
    fn num_inputs(&self) -> usize { 0 }

    #[inline]
    fn num_outputs(&self) -> usize { 1 }
}
