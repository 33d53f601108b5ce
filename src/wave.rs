//! Periodic waveform descriptors.
//!
//! A [`PeriodicWave`] defines one cycle of a repeating waveform by Fourier
//! coefficients: `real[k]` is the cosine amplitude and `imag[k]` the sine
//! amplitude of harmonic `k`. Index 0 is the DC slot; only its cosine term
//! contributes, and oscillators drop it along with the rest of the DC offset.

use std::f64::consts::TAU;

/// Number of points in a rendered single-cycle table
pub const TABLE_SIZE: usize = 2048;

/// Fourier description of one waveform cycle.
#[derive(Clone, Debug, PartialEq)]
pub struct PeriodicWave {
    real: Vec<f32>,
    imag: Vec<f32>,
    normalize: bool,
}

impl PeriodicWave {
    /// Create a normalized wave from cosine (`real`) and sine (`imag`) terms.
    ///
    /// The shorter sequence is padded with zeros to the length of the longer one.
    pub fn new(mut real: Vec<f32>, mut imag: Vec<f32>) -> Self {
        let len = real.len().max(imag.len());
        real.resize(len, 0.0);
        imag.resize(len, 0.0);
        Self {
            real,
            imag,
            normalize: true,
        }
    }

    /// A wave made only of sine terms; every cosine coefficient is zero.
    pub fn from_sine_terms(imag: &[f32]) -> Self {
        Self::new(vec![0.0; imag.len()], imag.to_vec())
    }

    /// Keep the raw amplitudes instead of scaling the peak to 1.0.
    pub fn without_normalization(mut self) -> Self {
        self.normalize = false;
        self
    }

    #[inline]
    pub fn real(&self) -> &[f32] {
        &self.real
    }

    #[inline]
    pub fn imag(&self) -> &[f32] {
        &self.imag
    }

    /// Number of coefficient pairs
    #[inline]
    pub fn len(&self) -> usize {
        self.imag.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.imag.is_empty()
    }


    /// Render one cycle into a table of [`TABLE_SIZE`] points.
    ///
    /// A wave with no non-DC content renders as silence.
    pub fn render(&self) -> Vec<f32> {
        let mut table = vec![0.0f64; TABLE_SIZE];

        for k in 1..self.len() {
            let a = self.real[k] as f64;
            let b = self.imag[k] as f64;
            if a == 0.0 && b == 0.0 {
                continue;
            }
            for (i, point) in table.iter_mut().enumerate() {
                let phase = TAU * k as f64 * i as f64 / TABLE_SIZE as f64;
                *point += a * phase.cos() + b * phase.sin();
            }
        }

        if self.normalize {
            let peak = table.iter().fold(0.0f64, |m, s| m.max(s.abs()));
            if peak > 0.0 {
                table.iter_mut().for_each(|s| *s /= peak);
            }
        }

        table.into_iter().map(|s| s as f32).collect()
    }
}
