//! Emotion layer: leaky scalar states over a closed set of emotions
//!
//! Each emotion level relaxes toward its drive with a slow time constant:
//! `E += dt * (-E + drive) / tau_e`, clamped to [0, 1]. The layer exposes
//! an additive bias for neuron integration (fear raises excitability) and a
//! signed valence used by the decision layer.

use crate::error::*;

/// The closed set of modeled emotions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Emotion {
    /// Positive reward response
    Joy,
    /// Negative reward response
    Sadness,
    /// Threat response
    Fear,
    /// Frustration response
    Anger,
    /// Novelty response
    Surprise,
    /// Aversion response
    Disgust,
}

impl Emotion {
    /// All emotions, in fixed order
    pub const ALL: [Emotion; 6] = [
        Emotion::Joy,
        Emotion::Sadness,
        Emotion::Fear,
        Emotion::Anger,
        Emotion::Surprise,
        Emotion::Disgust,
    ];

    fn index(self) -> usize {
        match self {
            Emotion::Joy => 0,
            Emotion::Sadness => 1,
            Emotion::Fear => 2,
            Emotion::Anger => 3,
            Emotion::Surprise => 4,
            Emotion::Disgust => 5,
        }
    }
}

/// External events driving the emotion states for one step
#[derive(Debug, Clone, Copy, Default)]
pub struct EmotionDrive {
    /// Signed reward signal; positive drives joy, negative drives sadness
    pub reward: f64,
    /// Threat present this step
    pub threat: bool,
    /// Goal blocked this step
    pub frustration: bool,
    /// Unexpectedness of the current percept, in [0, 1]
    pub novelty: f64,
}

impl EmotionDrive {
    fn target(&self, emotion: Emotion) -> f64 {
        match emotion {
            Emotion::Joy => self.reward.max(0.0),
            Emotion::Sadness => (-self.reward).max(0.0),
            Emotion::Fear => {
                if self.threat {
                    1.0
                } else {
                    0.0
                }
            }
            Emotion::Anger => {
                if self.frustration {
                    0.5
                } else {
                    0.0
                }
            }
            Emotion::Surprise => self.novelty.clamp(0.0, 1.0),
            Emotion::Disgust => 0.0,
        }
    }
}

/// Fear contribution to the neuron bias current
const FEAR_BIAS_SCALE: f64 = 0.1;

/// Leaky emotion state over the closed emotion set
#[derive(Debug, Clone)]
pub struct EmotionLayer {
    levels: [f64; 6],
    tau_e: f64,
}

impl EmotionLayer {
    /// Create a layer with all levels at zero and the default time constant
    pub fn new() -> Self {
        Self {
            levels: [0.0; 6],
            tau_e: 100.0, // ms
        }
    }

    /// Create a layer with an explicit time constant (ms)
    pub fn with_time_constant(tau_e: f64) -> Result<Self> {
        if !(tau_e > 0.0) || !tau_e.is_finite() {
            return Err(CognitionError::invalid_input(format!(
                "emotion time constant must be positive and finite, got {}",
                tau_e
            )));
        }
        Ok(Self {
            levels: [0.0; 6],
            tau_e,
        })
    }

    /// Relax every level toward its drive target for one step
    pub fn update(&mut self, dt: f64, drive: &EmotionDrive) -> Result<()> {
        if !(dt > 0.0) || !dt.is_finite() {
            return Err(CognitionError::invalid_input(format!(
                "dt must be positive and finite, got {}",
                dt
            )));
        }
        for emotion in Emotion::ALL {
            let i = emotion.index();
            let target = drive.target(emotion);
            self.levels[i] += dt * (-self.levels[i] + target) / self.tau_e;
            self.levels[i] = self.levels[i].clamp(0.0, 1.0);
        }
        Ok(())
    }

    /// Current level of one emotion, in [0, 1]
    pub fn level(&self, emotion: Emotion) -> f64 {
        self.levels[emotion.index()]
    }

    /// Additive bias current for neuron integration
    pub fn neuron_bias(&self) -> f64 {
        FEAR_BIAS_SCALE * self.level(Emotion::Fear)
    }

    /// Signed valence: joy minus sadness, in [-1, 1]
    pub fn valence(&self) -> f64 {
        self.level(Emotion::Joy) - self.level(Emotion::Sadness)
    }
}

impl Default for EmotionLayer {
    fn default() -> Self {
        Self::new()
    }
}
