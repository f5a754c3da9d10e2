//! End-to-end agent loop: pipeline, network update, and memory together

use ncog_cognition::{CognitiveAgent, Percept, Pipeline, PipelineConfig};
use ncog_memory::MemoryStore;
use ncog_runtime::{Network, NeuronId, NeuronParams};

fn full_pipeline() -> Pipeline {
    let config: PipelineConfig = serde_json::from_str(
        r#"{"stages": [
            {"kind": "attention"},
            {"kind": "emotion"},
            {"kind": "decision", "threshold": 1.5},
            {"kind": "language"}
        ]}"#,
    )
    .unwrap();
    Pipeline::from_config(&config).unwrap()
}

fn chain_network(n: usize) -> Network {
    let mut network = Network::new();
    let ids: Vec<NeuronId> = (0..n)
        .map(|_| network.add_neuron(NeuronParams::default()).unwrap())
        .collect();
    for pair in ids.windows(2) {
        network.connect(pair[0], pair[1], 0.8, 1.0).unwrap();
    }
    network
}

#[test]
fn test_short_term_memory_keeps_last_five_outcomes() {
    let mut agent = CognitiveAgent::new(chain_network(3), full_pipeline(), MemoryStore::new());
    for _ in 0..8 {
        agent.step(1.0, Percept::default()).unwrap();
    }
    let items = agent.memory().retrieve_short_term();
    assert_eq!(items.len(), 5);
    // Oldest retained outcome is from step 4 (steps 1 through 3 evicted).
    assert_eq!(items[0]["time_ms"], 4.0);
    assert_eq!(items[4]["time_ms"], 8.0);
}

#[test]
fn test_identical_percept_sequences_give_identical_spikes() {
    let drive = |step: usize| Percept {
        relevance: if step % 2 == 0 { 1.0 } else { 0.0 },
        reward: 0.5,
        threat: step % 5 == 0,
        evidence: 0.1,
        ..Default::default()
    };

    let run = || {
        let mut agent =
            CognitiveAgent::new(chain_network(4), full_pipeline(), MemoryStore::new());
        let input = NeuronId::new(0);
        let mut spikes = Vec::new();
        for step in 0..50 {
            agent.inject(input, 350.0).unwrap();
            let outcome = agent.step(1.0, drive(step)).unwrap();
            spikes.extend(outcome.spikes.iter().map(|s| (s.neuron, s.time.to_bits())));
        }
        spikes
    };

    assert_eq!(run(), run());
}

#[test]
fn test_parameters_survive_a_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("agent_memory.json");

    {
        let memory = MemoryStore::open(&path).unwrap();
        let mut agent = CognitiveAgent::new(chain_network(3), full_pipeline(), memory);
        let input = NeuronId::new(0);
        for _ in 0..20 {
            agent.inject(input, 400.0).unwrap();
            agent.step(1.0, Percept::default()).unwrap();
        }
        agent.persist_parameters().unwrap();
    }

    let restored = MemoryStore::open(&path).unwrap();
    let params = restored.retrieve_long_term("network_parameters").unwrap();
    assert_eq!(params["time_ms"], 20.0);
    assert_eq!(params["neurons"].as_array().unwrap().len(), 3);
    let synapses = params["synapses"].as_array().unwrap();
    assert_eq!(synapses.len(), 2);
    for synapse in synapses {
        let weight = synapse["weight"].as_f64().unwrap();
        assert!((0.0..=1.0).contains(&weight));
    }
}

#[test]
fn test_text_percepts_train_the_language_stage() {
    let mut agent = CognitiveAgent::new(chain_network(2), full_pipeline(), MemoryStore::new());
    agent
        .step(
            1.0,
            Percept {
                text: Some("spikes travel along axons".to_string()),
                ..Default::default()
            },
        )
        .unwrap();
    // Same text seen again scores as fully fluent; checked indirectly via a
    // second step not erroring and the outcome being recorded.
    let outcome = agent
        .step(
            1.0,
            Percept {
                text: Some("spikes travel".to_string()),
                ..Default::default()
            },
        )
        .unwrap();
    assert_eq!(outcome.time_ms, 2.0);
    assert_eq!(agent.memory().short_term_len(), 2);
}
