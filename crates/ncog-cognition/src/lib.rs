//! Scalar cognitive layers over the ncog simulation core
//!
//! The layers here are simple independent update functions on top of
//! network output: relevance-driven attention gain, leaky emotion states,
//! a deterministic evidence accumulator, and a text-generation capability
//! with a bigram reference model. They are assembled into a `Pipeline`
//! resolved once from configuration over a closed set of module kinds, and
//! a `CognitiveAgent` that wires a pipeline, a `Network`, and a
//! `MemoryStore` together. Stages never write into the simulation core or
//! into each other; everything flows through an explicit per-step signal.

#![deny(missing_docs)]
#![warn(clippy::all)]

pub mod agent;
pub mod attention;
pub mod decision;
pub mod emotion;
pub mod error;
pub mod language;
pub mod pipeline;

pub use agent::{CognitiveAgent, StepOutcome};
pub use attention::AttentionLayer;
pub use decision::{Choice, EvidenceAccumulator};
pub use emotion::{Emotion, EmotionDrive, EmotionLayer};
pub use error::{CognitionError, Result};
pub use language::{NgramModel, TextGeneration};
pub use pipeline::{
    CognitiveSignal, CognitiveStage, ModuleKind, Percept, Pipeline, PipelineConfig, StageConfig,
};
