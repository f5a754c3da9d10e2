//! Attention layer: relevance-driven multiplicative gain
//!
//! The layer turns a scalar relevance signal into the attention gain that
//! `updatePotential` applies multiplicatively to input current. Gain is
//! `1 + relevance` with relevance clamped to [0, 1], so an unattended
//! stimulus passes through unchanged and a fully attended one is doubled.

/// Relevance-to-gain mapping with a record of the current focus
#[derive(Debug, Clone)]
pub struct AttentionLayer {
    gain: f64,
}

impl AttentionLayer {
    /// Create a layer with neutral gain (1.0)
    pub fn new() -> Self {
        Self { gain: 1.0 }
    }

    /// Update the focus from a relevance signal and return the new gain.
    ///
    /// Relevance is clamped to [0, 1]; non-finite values are treated as 0.
    pub fn focus(&mut self, relevance: f64) -> f64 {
        let relevance = if relevance.is_finite() {
            relevance.clamp(0.0, 1.0)
        } else {
            log::warn!("non-finite relevance signal, treating as 0");
            0.0
        };
        self.gain = 1.0 + relevance;
        self.gain
    }

    /// Index of the most salient entry, if any
    pub fn most_salient(saliences: &[f64]) -> Option<usize> {
        saliences
            .iter()
            .enumerate()
            .filter(|(_, s)| s.is_finite())
            .max_by(|(_, a), (_, b)| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal))
            .map(|(i, _)| i)
    }

    /// The current gain, in [1, 2]
    pub fn gain(&self) -> f64 {
        self.gain
    }
}

impl Default for AttentionLayer {
    fn default() -> Self {
        Self::new()
    }
}
