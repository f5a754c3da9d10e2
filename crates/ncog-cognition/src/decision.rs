//! Decision layer: evidence accumulation to a signed threshold
//!
//! A drift-diffusion style accumulator without injected noise: callers fold
//! any stochastic component into the evidence signal, keeping the layer
//! deterministic. The accumulated value drifts by
//! `dt * (evidence + bias + emotion)` and a choice is reported once its
//! magnitude reaches the threshold.

use crate::error::*;

/// Outcome of a threshold crossing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Choice {
    /// The accumulator crossed the positive threshold
    Accept,
    /// The accumulator crossed the negative threshold
    Reject,
}

/// Deterministic evidence accumulator
#[derive(Debug, Clone)]
pub struct EvidenceAccumulator {
    value: f64,
    threshold: f64,
    bias: f64,
}

impl EvidenceAccumulator {
    /// Create an accumulator; `threshold` must be positive and finite
    pub fn new(threshold: f64, bias: f64) -> Result<Self> {
        if !(threshold > 0.0) || !threshold.is_finite() {
            return Err(CognitionError::invalid_input(format!(
                "decision threshold must be positive and finite, got {}",
                threshold
            )));
        }
        if !bias.is_finite() {
            return Err(CognitionError::invalid_input(format!(
                "decision bias must be finite, got {}",
                bias
            )));
        }
        Ok(Self {
            value: 0.0,
            threshold,
            bias,
        })
    }

    /// Integrate one step of evidence and report a choice on crossing.
    ///
    /// The accumulated value is retained after a crossing; callers decide
    /// when to `reset` for the next trial.
    pub fn accumulate(&mut self, dt: f64, evidence: f64, emotion: f64) -> Result<Option<Choice>> {
        if !(dt > 0.0) || !dt.is_finite() {
            return Err(CognitionError::invalid_input(format!(
                "dt must be positive and finite, got {}",
                dt
            )));
        }
        let drift = evidence + self.bias + emotion;
        if !drift.is_finite() {
            log::warn!("non-finite decision drift, skipping step");
            return Ok(None);
        }
        self.value += dt * drift;

        if self.value >= self.threshold {
            Ok(Some(Choice::Accept))
        } else if self.value <= -self.threshold {
            Ok(Some(Choice::Reject))
        } else {
            Ok(None)
        }
    }

    /// Clear the accumulated evidence for a new trial
    pub fn reset(&mut self) {
        self.value = 0.0;
    }

    /// The current accumulated value
    pub fn value(&self) -> f64 {
        self.value
    }

    /// The decision threshold
    pub fn threshold(&self) -> f64 {
        self.threshold
    }
}

impl Default for EvidenceAccumulator {
    fn default() -> Self {
        Self {
            value: 0.0,
            threshold: 1.0,
            bias: 0.0,
        }
    }
}
