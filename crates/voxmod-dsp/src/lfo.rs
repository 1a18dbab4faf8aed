//! Low Frequency Oscillator driving the modulated delays.

use std::f32::consts::TAU;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LfoShape {
    #[default]
    Sine,
    Triangle,
}

impl LfoShape {
    /// Value in `[-1, 1]` for a phase in `[0, 1)`.
    #[inline]
    pub fn evaluate(&self, phase: f32) -> f32 {
        match self {
            LfoShape::Sine => (phase * TAU).sin(),
            LfoShape::Triangle => {
                let p = phase * 4.0;
                if p < 1.0 {
                    p
                } else if p < 3.0 {
                    2.0 - p
                } else {
                    p - 4.0
                }
            }
        }
    }
}

/// Free-running oscillator with a normalized phase.
#[derive(Debug, Clone, Default)]
pub struct Lfo {
    shape: LfoShape,
    phase: f32,
}

impl Lfo {
    pub fn new(shape: LfoShape) -> Self {
        Self { shape, phase: 0.0 }
    }

    pub fn phase(&self) -> f32 {
        self.phase
    }

    /// Sample the current phase, then advance by `frequency / sample_rate`.
    #[inline]
    pub fn next(&mut self, frequency: f32, sample_rate: f32) -> f32 {
        let value = self.shape.evaluate(self.phase);
        self.phase += frequency / sample_rate;
        if self.phase >= 1.0 {
            self.phase -= self.phase.floor();
        }
        value
    }

    pub fn reset(&mut self) {
        self.phase = 0.0;
    }
}
