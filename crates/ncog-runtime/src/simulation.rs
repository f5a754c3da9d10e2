//! Fixed-step simulation driver
//!
//! Wraps a [`Network`] with stimulus scheduling, spike/potential recording,
//! and reproducible seeded Poisson input. All randomness lives here; the
//! network step itself is strictly deterministic.

use std::collections::HashMap;

use crate::{
    error::*,
    network::{Network, SpikeEvent},
    neuron::Modulation,
    NeuronId,
};

/// Simulation parameters
#[derive(Debug, Clone)]
pub struct SimulationParams {
    /// Time step (ms)
    pub dt_ms: f64,
    /// Total simulated duration (ms)
    pub duration_ms: f64,
    /// Record spikes from these neurons (None = all)
    pub record_neurons: Option<Vec<NeuronId>>,
    /// Record membrane potentials every step (expensive)
    pub record_potentials: bool,
    /// Seed for stochastic stimuli; a fixed seed reproduces runs exactly
    pub seed: u64,
    /// Cap on recorded spikes to bound memory
    pub max_recorded_spikes: usize,
}

impl Default for SimulationParams {
    fn default() -> Self {
        Self {
            dt_ms: 1.0,           // 1ms timestep
            duration_ms: 1000.0,  // 1 second
            record_neurons: None, // record everything
            record_potentials: false,
            seed: 42,
            max_recorded_spikes: 1_000_000,
        }
    }
}

impl SimulationParams {
    /// Create new simulation parameters with validation
    pub fn new(dt_ms: f64, duration_ms: f64) -> Result<Self> {
        if !(dt_ms > 0.0) || !dt_ms.is_finite() {
            return Err(RuntimeError::invalid_parameter(
                "dt_ms",
                dt_ms.to_string(),
                "> 0.0 and finite",
            ));
        }
        if !(duration_ms >= dt_ms) {
            return Err(RuntimeError::invalid_parameter(
                "duration_ms",
                format!("{} (with dt_ms={})", duration_ms, dt_ms),
                ">= dt_ms",
            ));
        }
        Ok(Self {
            dt_ms,
            duration_ms,
            ..Default::default()
        })
    }

    /// Set the neurons to record
    pub fn with_recorded_neurons(mut self, neurons: Vec<NeuronId>) -> Self {
        self.record_neurons = Some(neurons);
        self
    }

    /// Enable membrane potential recording
    pub fn with_potential_recording(mut self, enabled: bool) -> Self {
        self.record_potentials = enabled;
        self
    }

    /// Set the stimulus seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Number of simulation steps
    pub fn num_steps(&self) -> usize {
        (self.duration_ms / self.dt_ms).round() as usize
    }

    /// Validate parameters
    pub fn validate(&self) -> Result<()> {
        Self::new(self.dt_ms, self.duration_ms)?;
        Ok(())
    }
}

/// Input stimulus pattern
#[derive(Debug, Clone)]
pub enum StimulusPattern {
    /// Constant current injection over a window
    Constant {
        /// Target neuron
        neuron: NeuronId,
        /// Current amplitude (nA)
        amplitude: f64,
        /// Start time (ms)
        start_ms: f64,
        /// Duration (ms)
        duration_ms: f64,
    },
    /// Poisson spike train drawn from the engine's seeded generator
    Poisson {
        /// Target neuron
        neuron: NeuronId,
        /// Event rate (Hz)
        rate_hz: f64,
        /// Current amplitude per event (nA)
        amplitude: f64,
        /// Start time (ms)
        start_ms: f64,
        /// Duration (ms)
        duration_ms: f64,
    },
    /// Explicit injection times
    SpikeTrain {
        /// Target neuron
        neuron: NeuronId,
        /// Current amplitude per event (nA)
        amplitude: f64,
        /// Injection times (ms), matched against step start times
        times_ms: Vec<f64>,
    },
}

/// Recorded membrane potential sample
#[derive(Debug, Clone, Copy)]
pub struct PotentialSample {
    /// Neuron ID
    pub neuron: NeuronId,
    /// Sample time (ms)
    pub time_ms: f64,
    /// Membrane potential (mV)
    pub potential: f64,
}

/// Results of a simulation run
#[derive(Debug, Clone, Default)]
pub struct SimulationResult {
    /// All recorded spikes in emission order
    pub spikes: Vec<SpikeEvent>,
    /// Membrane potential traces, if recorded
    pub potentials: Vec<PotentialSample>,
    /// Final synaptic weights keyed by (pre, post)
    pub final_weights: HashMap<(NeuronId, NeuronId), f64>,
    /// Simulated duration (ms)
    pub duration_ms: f64,
    /// Steps executed
    pub steps_executed: usize,
}

impl SimulationResult {
    /// Spikes emitted by a specific neuron
    pub fn spikes_for(&self, neuron: NeuronId) -> Vec<&SpikeEvent> {
        self.spikes.iter().filter(|s| s.neuron == neuron).collect()
    }

    /// Firing rate of a neuron over the run (Hz)
    pub fn firing_rate(&self, neuron: NeuronId) -> f64 {
        let count = self.spikes_for(neuron).len();
        count as f64 / (self.duration_ms / 1000.0)
    }

    /// Export spikes as (time_ms, neuron) tuples for comparison
    pub fn export_spikes(&self) -> Vec<(f64, u32)> {
        self.spikes
            .iter()
            .map(|s| (s.time, s.neuron.raw()))
            .collect()
    }
}

/// Fixed-step simulation engine owning a network
#[derive(Debug)]
pub struct SimulationEngine {
    network: Network,
    params: SimulationParams,
    stimuli: Vec<StimulusPattern>,
    modulation: HashMap<NeuronId, Modulation>,
    rng_state: u64,
}

impl SimulationEngine {
    /// Create a new engine around an existing network
    pub fn new(network: Network, params: SimulationParams) -> Result<Self> {
        params.validate()?;
        let rng_state = params.seed;
        Ok(Self {
            network,
            params,
            stimuli: Vec::new(),
            modulation: HashMap::new(),
            rng_state,
        })
    }

    /// Add an input stimulus
    pub fn add_stimulus(&mut self, stimulus: StimulusPattern) {
        self.stimuli.push(stimulus);
    }

    /// Set the per-step modulation for a neuron; persists until replaced
    pub fn set_modulation(&mut self, neuron: NeuronId, modulation: Modulation) {
        self.modulation.insert(neuron, modulation);
    }

    /// Run the full simulation from a freshly reset network
    pub fn run(&mut self) -> Result<SimulationResult> {
        log::info!(
            "starting simulation: {}ms at dt={}ms",
            self.params.duration_ms,
            self.params.dt_ms
        );

        self.network.reset();
        self.rng_state = self.params.seed;

        let num_steps = self.params.num_steps();
        let dt = self.params.dt_ms;
        let mut result = SimulationResult {
            duration_ms: self.params.duration_ms,
            ..Default::default()
        };

        for step in 0..num_steps {
            let step_start_ms = step as f64 * dt;
            self.apply_stimuli(step_start_ms, dt)?;

            let spikes = self
                .network
                .update_with(dt, &self.modulation)
                .map_err(|e| RuntimeError::simulation_step(step_start_ms, e.to_string()))?;

            for spike in spikes {
                let recorded = match &self.params.record_neurons {
                    Some(list) => list.contains(&spike.neuron),
                    None => true,
                };
                if recorded {
                    result.spikes.push(spike);
                }
            }

            if self.params.record_potentials {
                self.record_potentials(&mut result);
            }

            if result.spikes.len() >= self.params.max_recorded_spikes {
                log::warn!(
                    "spike recording limit reached: {}",
                    self.params.max_recorded_spikes
                );
                result.steps_executed = step + 1;
                break;
            }

            if step % (num_steps / 10).max(1) == 0 {
                log::debug!(
                    "simulation progress: {:.1}%",
                    step as f64 / num_steps as f64 * 100.0
                );
            }
            result.steps_executed = step + 1;
        }

        for synapse in self.network.synapses() {
            result
                .final_weights
                .insert((synapse.pre(), synapse.post()), synapse.weight());
        }

        log::info!(
            "simulation completed: {} spikes in {} steps",
            result.spikes.len(),
            result.steps_executed
        );
        Ok(result)
    }

    /// Apply stimuli for the step starting at `step_start_ms`
    fn apply_stimuli(&mut self, step_start_ms: f64, dt: f64) -> Result<()> {
        // Patterns are resolved against a local copy so the generator can be
        // advanced while the network is injected into.
        let stimuli = self.stimuli.clone();
        for stimulus in &stimuli {
            match stimulus {
                StimulusPattern::Constant {
                    neuron,
                    amplitude,
                    start_ms,
                    duration_ms,
                } => {
                    if step_start_ms >= *start_ms && step_start_ms < start_ms + duration_ms {
                        self.network.inject(*neuron, *amplitude)?;
                    }
                }
                StimulusPattern::Poisson {
                    neuron,
                    rate_hz,
                    amplitude,
                    start_ms,
                    duration_ms,
                } => {
                    if step_start_ms >= *start_ms && step_start_ms < start_ms + duration_ms {
                        let event_prob = rate_hz * dt / 1000.0;
                        if self.random_uniform() < event_prob {
                            self.network.inject(*neuron, *amplitude)?;
                        }
                    }
                }
                StimulusPattern::SpikeTrain {
                    neuron,
                    amplitude,
                    times_ms,
                } => {
                    for &t in times_ms {
                        if t >= step_start_ms && t < step_start_ms + dt {
                            self.network.inject(*neuron, *amplitude)?;
                        }
                    }
                }
            }
        }
        Ok(())
    }

    /// Record membrane potentials for the configured neurons
    fn record_potentials(&self, result: &mut SimulationResult) {
        let ids = match &self.params.record_neurons {
            Some(list) => list.clone(),
            None => self.network.neuron_ids(),
        };
        for id in ids {
            if let Ok(potential) = self.network.membrane_potential(id) {
                result.potentials.push(PotentialSample {
                    neuron: id,
                    time_ms: self.network.now(),
                    potential,
                });
            }
        }
    }

    /// Uniform value in [0, 1) from a simple LCG, kept for reproducibility
    fn random_uniform(&mut self) -> f64 {
        self.rng_state = self
            .rng_state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        (self.rng_state >> 11) as f64 / (1u64 << 53) as f64
    }

    /// The simulated network
    pub fn network(&self) -> &Network {
        &self.network
    }

    /// Mutable access to the simulated network
    pub fn network_mut(&mut self) -> &mut Network {
        &mut self.network
    }

    /// Simulation parameters
    pub fn params(&self) -> &SimulationParams {
        &self.params
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::neuron::NeuronParams;

    fn line_network(n: usize) -> Network {
        let mut net = Network::new();
        let ids: Vec<_> = (0..n)
            .map(|_| net.add_neuron(NeuronParams::default()).unwrap())
            .collect();
        for pair in ids.windows(2) {
            net.connect(pair[0], pair[1], 0.8, 1.0).unwrap();
        }
        net
    }

    #[test]
    fn test_params_validation() {
        assert!(SimulationParams::new(0.0, 100.0).is_err());
        assert!(SimulationParams::new(-1.0, 100.0).is_err());
        assert!(SimulationParams::new(10.0, 5.0).is_err());
        assert!(SimulationParams::new(1.0, 100.0).is_ok());
    }

    #[test]
    fn test_num_steps() {
        let params = SimulationParams::new(0.5, 10.0).unwrap();
        assert_eq!(params.num_steps(), 20);
    }

    #[test]
    fn test_constant_stimulus_drives_spikes() {
        let net = line_network(2);
        let params = SimulationParams::new(1.0, 50.0).unwrap();
        let mut engine = SimulationEngine::new(net, params).unwrap();
        engine.add_stimulus(StimulusPattern::Constant {
            neuron: NeuronId::new(0),
            amplitude: 400.0,
            start_ms: 0.0,
            duration_ms: 50.0,
        });

        let result = engine.run().unwrap();
        assert_eq!(result.steps_executed, 50);
        assert!(!result.spikes_for(NeuronId::new(0)).is_empty());
    }

    #[test]
    fn test_spike_train_stimulus_timing() {
        let net = line_network(1);
        let params = SimulationParams::new(1.0, 10.0).unwrap();
        let mut engine = SimulationEngine::new(net, params).unwrap();
        engine.add_stimulus(StimulusPattern::SpikeTrain {
            neuron: NeuronId::new(0),
            amplitude: 400.0,
            times_ms: vec![3.0],
        });

        let result = engine.run().unwrap();
        let spikes = result.spikes_for(NeuronId::new(0));
        assert_eq!(spikes.len(), 1);
        // Injected during the step starting at 3ms, observed at its end.
        assert_eq!(spikes[0].time, 4.0);
    }

    #[test]
    fn test_seeded_poisson_is_reproducible() {
        let run = |seed: u64| {
            let net = line_network(3);
            let params = SimulationParams::new(1.0, 200.0).unwrap().with_seed(seed);
            let mut engine = SimulationEngine::new(net, params).unwrap();
            engine.add_stimulus(StimulusPattern::Poisson {
                neuron: NeuronId::new(0),
                rate_hz: 500.0,
                amplitude: 400.0,
                start_ms: 0.0,
                duration_ms: 200.0,
            });
            engine.run().unwrap().export_spikes()
        };

        assert_eq!(run(7), run(7));
        assert_ne!(run(7), run(8));
    }

    #[test]
    fn test_potential_recording() {
        let net = line_network(1);
        let params = SimulationParams::new(1.0, 5.0)
            .unwrap()
            .with_potential_recording(true);
        let mut engine = SimulationEngine::new(net, params).unwrap();
        let result = engine.run().unwrap();
        assert_eq!(result.potentials.len(), 5);
    }

    #[test]
    fn test_recorded_neuron_filter() {
        let net = line_network(2);
        let params = SimulationParams::new(1.0, 50.0)
            .unwrap()
            .with_recorded_neurons(vec![NeuronId::new(1)]);
        let mut engine = SimulationEngine::new(net, params).unwrap();
        engine.add_stimulus(StimulusPattern::Constant {
            neuron: NeuronId::new(0),
            amplitude: 400.0,
            start_ms: 0.0,
            duration_ms: 50.0,
        });
        let result = engine.run().unwrap();
        assert!(result.spikes_for(NeuronId::new(0)).is_empty());
    }
}
