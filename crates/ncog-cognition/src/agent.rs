//! The agent wiring network, pipeline, and memory together
//!
//! `CognitiveAgent` drives one network step per `step` call: the pipeline
//! runs first to produce this step's modulation, the network advances under
//! that modulation, and the outcome lands in short-term memory. Parameter
//! persistence happens only between steps, never mid-phase.

use std::collections::HashMap;

use serde_json::json;

use ncog_memory::MemoryStore;
use ncog_runtime::{Modulation, Network, NeuronId, SpikeEvent};

use crate::decision::Choice;
use crate::error::*;
use crate::pipeline::{CognitiveSignal, Percept, Pipeline};

/// What one agent step produced
#[derive(Debug, Clone)]
pub struct StepOutcome {
    /// Simulation time after the step (ms)
    pub time_ms: f64,
    /// Spikes emitted during the step
    pub spikes: Vec<SpikeEvent>,
    /// Decision reached this step, if any
    pub decision: Option<Choice>,
    /// Signed emotional valence after the step
    pub valence: f64,
    /// Attention gain applied during the step
    pub attention_gain: f64,
}

/// A network, a cognitive pipeline, and a memory store acting as one agent
#[derive(Debug)]
pub struct CognitiveAgent {
    network: Network,
    pipeline: Pipeline,
    memory: MemoryStore,
}

impl CognitiveAgent {
    /// Assemble an agent from its three parts
    pub fn new(network: Network, pipeline: Pipeline, memory: MemoryStore) -> Self {
        Self {
            network,
            pipeline,
            memory,
        }
    }

    /// Inject external bias current, consumed by the next step
    pub fn inject(&mut self, neuron: NeuronId, current: f64) -> Result<()> {
        self.network.inject(neuron, current)?;
        Ok(())
    }

    /// Run one step: pipeline, then network update under the resulting
    /// modulation, then record the outcome in short-term memory.
    ///
    /// A step that reaches a decision resets the accumulator so the next
    /// trial starts clean.
    pub fn step(&mut self, dt: f64, percept: Percept) -> Result<StepOutcome> {
        let mut signal = CognitiveSignal::new(dt, percept);
        self.pipeline.process(&mut signal)?;

        let modulation = Modulation {
            attention_gain: signal.attention_gain,
            emotion_bias: signal.emotion_bias,
        };
        let modulations: HashMap<NeuronId, Modulation> = self
            .network
            .neuron_ids()
            .into_iter()
            .map(|id| (id, modulation))
            .collect();

        let spikes = self.network.update_with(dt, &modulations)?;

        if signal.decision.is_some() {
            self.pipeline.reset_decisions();
        }

        let outcome = StepOutcome {
            time_ms: self.network.now(),
            spikes,
            decision: signal.decision,
            valence: signal.valence,
            attention_gain: signal.attention_gain,
        };

        self.memory.store_short_term(json!({
            "time_ms": outcome.time_ms,
            "spike_count": outcome.spikes.len(),
            "decision": outcome.decision.map(|c| format!("{:?}", c)),
            "valence": outcome.valence,
        }));

        Ok(outcome)
    }

    /// Serialize neuron and synapse parameters into long-term memory.
    ///
    /// Call only between steps; a file-backed store persists immediately.
    pub fn persist_parameters(&mut self) -> Result<()> {
        let neurons: Vec<_> = self
            .network
            .neurons()
            .map(|n| {
                json!({
                    "id": n.id().raw(),
                    "tau_m": n.params.tau_m,
                    "v_rest": n.params.v_rest,
                    "v_reset": n.params.v_reset,
                    "v_thresh": n.params.v_thresh,
                    "r_m": n.params.r_m,
                })
            })
            .collect();
        let synapses: Vec<_> = self
            .network
            .synapses()
            .map(|s| {
                json!({
                    "pre": s.pre().raw(),
                    "post": s.post().raw(),
                    "weight": s.weight(),
                    "delay": s.delay(),
                })
            })
            .collect();

        self.memory.store_long_term(
            "network_parameters",
            json!({
                "time_ms": self.network.now(),
                "neurons": neurons,
                "synapses": synapses,
            }),
        )?;
        log::debug!(
            "persisted {} neurons and {} synapses",
            self.network.neuron_count(),
            self.network.synapse_count()
        );
        Ok(())
    }

    /// The underlying network
    pub fn network(&self) -> &Network {
        &self.network
    }

    /// Mutable access to the underlying network
    pub fn network_mut(&mut self) -> &mut Network {
        &mut self.network
    }

    /// The memory store
    pub fn memory(&self) -> &MemoryStore {
        &self.memory
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::PipelineConfig;
    use ncog_runtime::NeuronParams;

    fn two_neuron_agent() -> CognitiveAgent {
        let mut network = Network::new();
        let a = network.add_neuron(NeuronParams::default()).unwrap();
        let b = network.add_neuron(NeuronParams::default()).unwrap();
        network.connect(a, b, 0.5, 1.0).unwrap();

        let config: PipelineConfig = serde_json::from_str(
            r#"{"stages": [
                {"kind": "attention"},
                {"kind": "emotion"},
                {"kind": "decision", "threshold": 1.0}
            ]}"#,
        )
        .unwrap();
        let pipeline = Pipeline::from_config(&config).unwrap();
        CognitiveAgent::new(network, pipeline, MemoryStore::new())
    }

    #[test]
    fn test_step_records_outcome_in_short_term_memory() {
        let mut agent = two_neuron_agent();
        let outcome = agent.step(1.0, Percept::default()).unwrap();
        assert_eq!(outcome.time_ms, 1.0);
        assert_eq!(agent.memory().short_term_len(), 1);
    }

    #[test]
    fn test_attention_gain_reaches_the_network() {
        let mut relaxed = two_neuron_agent();
        let mut focused = two_neuron_agent();
        let a = NeuronId::new(0);

        // 200 nA under gain 1.0 gives dv = 10 mV, below the 15 mV gap;
        // under gain 2.0 it gives 20 mV and crosses threshold.
        relaxed.inject(a, 200.0).unwrap();
        focused.inject(a, 200.0).unwrap();

        let calm = relaxed.step(1.0, Percept::default()).unwrap();
        let attentive = focused
            .step(
                1.0,
                Percept {
                    relevance: 1.0,
                    ..Default::default()
                },
            )
            .unwrap();

        assert_eq!(calm.spikes.len(), 0);
        assert_eq!(attentive.spikes.len(), 1);
        assert_eq!(attentive.attention_gain, 2.0);
    }

    #[test]
    fn test_decision_resets_after_crossing() {
        let mut agent = two_neuron_agent();
        let push = Percept {
            evidence: 2.0,
            ..Default::default()
        };
        let outcome = agent.step(1.0, push).unwrap();
        assert_eq!(outcome.decision, Some(Choice::Accept));

        // The accumulator was reset, so a neutral step decides nothing.
        let outcome = agent.step(1.0, Percept::default()).unwrap();
        assert_eq!(outcome.decision, None);
    }

    #[test]
    fn test_persist_parameters_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("agent.json");

        let mut network = Network::new();
        let a = network.add_neuron(NeuronParams::default()).unwrap();
        let b = network.add_neuron(NeuronParams::default()).unwrap();
        network.connect(a, b, 0.75, 2.0).unwrap();

        let pipeline = Pipeline::from_config(
            &serde_json::from_str(r#"{"stages": []}"#).unwrap(),
        )
        .unwrap();
        let memory = MemoryStore::open(&path).unwrap();
        let mut agent = CognitiveAgent::new(network, pipeline, memory);

        agent.step(1.0, Percept::default()).unwrap();
        agent.persist_parameters().unwrap();

        let restored = MemoryStore::open(&path).unwrap();
        let params = restored.retrieve_long_term("network_parameters").unwrap();
        assert_eq!(params["neurons"].as_array().unwrap().len(), 2);
        assert_eq!(params["synapses"][0]["weight"], 0.75);
        assert_eq!(params["synapses"][0]["delay"], 2.0);
    }
}
