//! Statically configured cognitive pipeline
//!
//! Module kinds form a closed set resolved once at startup from a
//! configuration list; there is no directory scanning or dynamic loading.
//! Every stage conforms to a single `process` contract over a shared
//! per-step signal, so stages communicate only through the signal and never
//! write into each other's state.

use serde::Deserialize;

use crate::attention::AttentionLayer;
use crate::decision::{Choice, EvidenceAccumulator};
use crate::emotion::{EmotionDrive, EmotionLayer};
use crate::error::*;
use crate::language::{NgramModel, TextGeneration};

/// The closed set of cognitive module kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModuleKind {
    /// Relevance-driven gain
    Attention,
    /// Leaky emotion states
    Emotion,
    /// Evidence accumulation
    Decision,
    /// N-gram text model
    Language,
}

impl ModuleKind {
    /// Resolve a configured kind name; unknown names are an error
    pub fn parse(name: &str) -> Result<Self> {
        match name {
            "attention" => Ok(ModuleKind::Attention),
            "emotion" => Ok(ModuleKind::Emotion),
            "decision" => Ok(ModuleKind::Decision),
            "language" => Ok(ModuleKind::Language),
            other => Err(CognitionError::unknown_module(other)),
        }
    }

    /// The configuration name of this kind
    pub fn name(&self) -> &'static str {
        match self {
            ModuleKind::Attention => "attention",
            ModuleKind::Emotion => "emotion",
            ModuleKind::Decision => "decision",
            ModuleKind::Language => "language",
        }
    }
}

/// One stage entry in a pipeline configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StageConfig {
    /// Kind name, resolved against `ModuleKind`
    pub kind: String,
    /// Decision threshold (decision stages only)
    #[serde(default)]
    pub threshold: Option<f64>,
    /// Decision drift bias (decision stages only)
    #[serde(default)]
    pub bias: Option<f64>,
    /// Emotion time constant in ms (emotion stages only)
    #[serde(default)]
    pub tau_e: Option<f64>,
}

/// Declarative pipeline configuration, typically loaded from JSON
#[derive(Debug, Clone, Deserialize)]
pub struct PipelineConfig {
    /// Stages in execution order
    pub stages: Vec<StageConfig>,
}

/// External percept for one step
#[derive(Debug, Clone, Default)]
pub struct Percept {
    /// Relevance of the current stimulus, in [0, 1]
    pub relevance: f64,
    /// Signed reward signal
    pub reward: f64,
    /// Threat present
    pub threat: bool,
    /// Goal blocked
    pub frustration: bool,
    /// Unexpectedness, in [0, 1]
    pub novelty: f64,
    /// Evidence toward the current decision
    pub evidence: f64,
    /// Text observed this step, if any
    pub text: Option<String>,
}

/// Per-step signal threaded through the pipeline stages
#[derive(Debug, Clone)]
pub struct CognitiveSignal {
    /// Step width (ms)
    pub dt: f64,
    /// The percept driving this step
    pub percept: Percept,
    /// Attention gain produced so far (neutral 1.0)
    pub attention_gain: f64,
    /// Additive neuron bias produced so far
    pub emotion_bias: f64,
    /// Signed emotional valence produced so far
    pub valence: f64,
    /// Decision reached this step, if any
    pub decision: Option<Choice>,
    /// Fluency score of the observed text, if scored
    pub fluency: Option<f64>,
}

impl CognitiveSignal {
    /// Build the step signal from a percept
    pub fn new(dt: f64, percept: Percept) -> Self {
        Self {
            dt,
            percept,
            attention_gain: 1.0,
            emotion_bias: 0.0,
            valence: 0.0,
            decision: None,
            fluency: None,
        }
    }
}

/// A resolved pipeline stage
#[derive(Debug)]
pub enum CognitiveStage {
    /// Relevance-to-gain stage
    Attention(AttentionLayer),
    /// Emotion state stage
    Emotion(EmotionLayer),
    /// Evidence accumulation stage
    Decision(EvidenceAccumulator),
    /// Text observation stage
    Language(NgramModel),
}

impl CognitiveStage {
    /// The kind of this stage
    pub fn kind(&self) -> ModuleKind {
        match self {
            CognitiveStage::Attention(_) => ModuleKind::Attention,
            CognitiveStage::Emotion(_) => ModuleKind::Emotion,
            CognitiveStage::Decision(_) => ModuleKind::Decision,
            CognitiveStage::Language(_) => ModuleKind::Language,
        }
    }

    /// Run this stage against the step signal
    pub fn process(&mut self, signal: &mut CognitiveSignal) -> Result<()> {
        match self {
            CognitiveStage::Attention(layer) => {
                signal.attention_gain = layer.focus(signal.percept.relevance);
            }
            CognitiveStage::Emotion(layer) => {
                let drive = EmotionDrive {
                    reward: signal.percept.reward,
                    threat: signal.percept.threat,
                    frustration: signal.percept.frustration,
                    novelty: signal.percept.novelty,
                };
                layer.update(signal.dt, &drive)?;
                signal.emotion_bias = layer.neuron_bias();
                signal.valence = layer.valence();
            }
            CognitiveStage::Decision(acc) => {
                signal.decision =
                    acc.accumulate(signal.dt, signal.percept.evidence, signal.valence)?;
            }
            CognitiveStage::Language(model) => {
                if let Some(text) = signal.percept.text.clone() {
                    model.train_on_text(&text)?;
                    signal.fluency = Some(model.score_fluency(&text)?);
                }
            }
        }
        Ok(())
    }
}

/// An ordered list of resolved stages
#[derive(Debug, Default)]
pub struct Pipeline {
    stages: Vec<CognitiveStage>,
}

impl Pipeline {
    /// Resolve a configuration into stages, once, at startup
    pub fn from_config(config: &PipelineConfig) -> Result<Self> {
        let mut stages = Vec::with_capacity(config.stages.len());
        for stage in &config.stages {
            let resolved = match ModuleKind::parse(&stage.kind)? {
                ModuleKind::Attention => CognitiveStage::Attention(AttentionLayer::new()),
                ModuleKind::Emotion => CognitiveStage::Emotion(match stage.tau_e {
                    Some(tau_e) => EmotionLayer::with_time_constant(tau_e)?,
                    None => EmotionLayer::new(),
                }),
                ModuleKind::Decision => CognitiveStage::Decision(EvidenceAccumulator::new(
                    stage.threshold.unwrap_or(1.0),
                    stage.bias.unwrap_or(0.0),
                )?),
                ModuleKind::Language => CognitiveStage::Language(NgramModel::new()),
            };
            stages.push(resolved);
        }
        log::info!(
            "resolved pipeline: [{}]",
            stages
                .iter()
                .map(|s| s.kind().name())
                .collect::<Vec<_>>()
                .join(", ")
        );
        Ok(Self { stages })
    }

    /// Run every stage in order against the signal
    pub fn process(&mut self, signal: &mut CognitiveSignal) -> Result<()> {
        for stage in &mut self.stages {
            stage.process(signal)?;
        }
        Ok(())
    }

    /// Reset every decision stage for a new trial
    pub fn reset_decisions(&mut self) {
        for stage in &mut self.stages {
            if let CognitiveStage::Decision(acc) = stage {
                acc.reset();
            }
        }
    }

    /// The resolved stages, in execution order
    pub fn stages(&self) -> &[CognitiveStage] {
        &self.stages
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_from_json(json: &str) -> PipelineConfig {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_resolves_configured_stages_in_order() {
        let config = config_from_json(
            r#"{"stages": [
                {"kind": "attention"},
                {"kind": "emotion"},
                {"kind": "decision", "threshold": 2.0}
            ]}"#,
        );
        let pipeline = Pipeline::from_config(&config).unwrap();
        let kinds: Vec<_> = pipeline.stages().iter().map(|s| s.kind()).collect();
        assert_eq!(
            kinds,
            vec![ModuleKind::Attention, ModuleKind::Emotion, ModuleKind::Decision]
        );
    }

    #[test]
    fn test_unknown_kind_fails_at_resolution() {
        let config = config_from_json(r#"{"stages": [{"kind": "telepathy"}]}"#);
        match Pipeline::from_config(&config) {
            Err(CognitionError::UnknownModule { name }) => assert_eq!(name, "telepathy"),
            other => panic!("expected UnknownModule, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_stages_communicate_through_the_signal() {
        let config = config_from_json(
            r#"{"stages": [
                {"kind": "attention"},
                {"kind": "emotion"},
                {"kind": "decision", "threshold": 0.5}
            ]}"#,
        );
        let mut pipeline = Pipeline::from_config(&config).unwrap();

        let percept = Percept {
            relevance: 0.8,
            reward: 1.0,
            evidence: 0.6,
            ..Default::default()
        };
        let mut signal = CognitiveSignal::new(1.0, percept);
        pipeline.process(&mut signal).unwrap();

        assert!((signal.attention_gain - 1.8).abs() < 1e-12);
        assert!(signal.valence > 0.0);
        assert_eq!(signal.decision, Some(Choice::Accept));
    }

    #[test]
    fn test_language_stage_scores_observed_text() {
        let config = config_from_json(r#"{"stages": [{"kind": "language"}]}"#);
        let mut pipeline = Pipeline::from_config(&config).unwrap();

        let percept = Percept {
            text: Some("spikes propagate forward".to_string()),
            ..Default::default()
        };
        let mut signal = CognitiveSignal::new(1.0, percept);
        pipeline.process(&mut signal).unwrap();
        assert_eq!(signal.fluency, Some(1.0));
    }

    #[test]
    fn test_reset_decisions() {
        let config = config_from_json(r#"{"stages": [{"kind": "decision"}]}"#);
        let mut pipeline = Pipeline::from_config(&config).unwrap();

        let percept = Percept {
            evidence: 2.0,
            ..Default::default()
        };
        let mut signal = CognitiveSignal::new(1.0, percept.clone());
        pipeline.process(&mut signal).unwrap();
        assert_eq!(signal.decision, Some(Choice::Accept));

        pipeline.reset_decisions();
        let calm = Percept::default();
        let mut signal = CognitiveSignal::new(1.0, calm);
        pipeline.process(&mut signal).unwrap();
        assert_eq!(signal.decision, None);
    }
}
