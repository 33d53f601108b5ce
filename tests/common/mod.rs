//! Recording backend shared by the integration tests.

#![allow(dead_code)]

use std::cell::Cell;
use std::rc::Rc;

use toneport::{AudioBackend, BackendError, PeriodicWave};

pub const DESTINATION: u32 = 0;

#[derive(Clone, Debug, PartialEq)]
pub enum Call {
    CreateWave { real: Vec<f32>, imag: Vec<f32> },
    CreateOscillator { id: u32, frequency: f32 },
    CreateGain { id: u32, value: f32 },
    SetValueAtTime { gain: u32, value: f32, at: f64 },
    ExponentialRamp { gain: u32, value: f32, end: f64 },
    Connect { from: u32, to: u32 },
    Start { source: u32, at: f64 },
    Stop { source: u32, at: f64 },
    Release { node: u32 },
}

/// Backend that records every call and whose clock is set by the test
#[derive(Debug, Default)]
pub struct FakeBackend {
    pub now: f64,
    pub calls: Vec<Call>,
    /// Make every `create_gain` fail
    pub fail_gains: bool,
    /// Make every `connect` fail
    pub fail_connects: bool,
    next_id: u32,
}

impl FakeBackend {
    fn next(&mut self) -> u32 {
        self.next_id += 1;
        self.next_id
    }

    pub fn count(&self, matches: impl Fn(&Call) -> bool) -> usize {
        self.calls.iter().filter(|c| matches(c)).count()
    }

    pub fn waves(&self) -> Vec<(Vec<f32>, Vec<f32>)> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                Call::CreateWave { real, imag } => Some((real.clone(), imag.clone())),
                _ => None,
            })
            .collect()
    }
}

impl AudioBackend for FakeBackend {
    type Node = u32;

    fn current_time(&self) -> f64 {
        self.now
    }

    fn destination(&self) -> u32 {
        DESTINATION
    }

    fn create_periodic_wave(&mut self, real: Vec<f32>, imag: Vec<f32>) -> PeriodicWave {
        self.calls.push(Call::CreateWave { real: real.clone(), imag: imag.clone() });
        PeriodicWave::new(real, imag)
    }

    fn create_oscillator(&mut self, frequency: f32, _wave: &PeriodicWave) -> Result<u32, BackendError> {
        let id = self.next();
        self.calls.push(Call::CreateOscillator { id, frequency });
        Ok(id)
    }

    fn create_gain(&mut self, value: f32) -> Result<u32, BackendError> {
        if self.fail_gains {
            return Err(BackendError::QueueFull);
        }
        let id = self.next();
        self.calls.push(Call::CreateGain { id, value });
        Ok(id)
    }

    fn set_value_at_time(&mut self, gain: u32, value: f32, at: f64) -> Result<(), BackendError> {
        self.calls.push(Call::SetValueAtTime { gain, value, at });
        Ok(())
    }

    fn exponential_ramp_to_value_at_time(&mut self, gain: u32, value: f32, end: f64) -> Result<(), BackendError> {
        self.calls.push(Call::ExponentialRamp { gain, value, end });
        Ok(())
    }

    fn connect(&mut self, from: u32, to: u32) -> Result<(), BackendError> {
        if self.fail_connects {
            return Err(BackendError::UnknownNode);
        }
        self.calls.push(Call::Connect { from, to });
        Ok(())
    }

    fn start(&mut self, source: u32, at: f64) {
        self.calls.push(Call::Start { source, at });
    }

    fn stop(&mut self, source: u32, at: f64) {
        self.calls.push(Call::Stop { source, at });
    }

    fn release(&mut self, node: u32) {
        self.calls.push(Call::Release { node });
    }
}

/// A backend factory that counts how often it was called
pub fn counting_factory() -> (Rc<Cell<usize>>, impl FnMut() -> Result<FakeBackend, BackendError>) {
    let opened = Rc::new(Cell::new(0));
    let counter = Rc::clone(&opened);
    let factory = move || {
        counter.set(counter.get() + 1);
        Ok(FakeBackend::default())
    };
    (opened, factory)
}
