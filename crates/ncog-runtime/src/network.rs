//! Network orchestration and the four-phase step protocol

use std::collections::HashMap;

use crate::{
    error::*,
    neuron::{Modulation, Neuron, NeuronParams},
    synapse::{Synapse, SynapseParams},
    NeuronId, SynapseId,
};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// A spike emitted by a neuron during a step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpikeEvent {
    /// Neuron that spiked
    pub neuron: NeuronId,
    /// Simulation time of the spike (ms)
    pub time: f64,
}

/// The network owns all neurons and synapses in insertion order and is the
/// only component that decides ordering and inter-entity data flow.
///
/// Each `update` runs four strictly ordered phases:
///
/// 1. **Integrate**: every neuron consumes the input staged by the previous
///    step plus externally injected bias and integrates one Euler step.
/// 2. **Emit**: every neuron that spiked transmits on its outgoing
///    synapses.
/// 3. **Propagate & Plasticize**: every synapse relaxes its astrocyte
///    state, computes its output current (staged on the post-neuron for the
///    next step), and, if its post-neuron spiked this step, runs its
///    plasticity updates.
/// 4. **Clear**: staged input buffers are promoted/zeroed for the next
///    call.
///
/// Spike generation (phases 1–2) always completes before any plasticity
/// update (phase 3) reads spike flags, and current emitted in step N is
/// integrated no earlier than step N+1.
#[derive(Debug, Default)]
pub struct Network {
    neurons: Vec<Neuron>,
    synapses: Vec<Synapse>,
    now: f64,
}

impl Network {
    /// Create an empty network at t = 0
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a neuron, returning its ID
    pub fn add_neuron(&mut self, params: NeuronParams) -> Result<NeuronId> {
        let id = NeuronId::new(self.neurons.len() as u32);
        self.neurons.push(Neuron::new(id, params)?);
        Ok(id)
    }

    /// Connect two existing neurons with default plasticity parameters
    pub fn connect(
        &mut self,
        pre: NeuronId,
        post: NeuronId,
        weight: f64,
        delay: f64,
    ) -> Result<SynapseId> {
        self.connect_with(
            pre,
            post,
            SynapseParams {
                weight,
                delay,
                ..SynapseParams::default()
            },
        )
    }

    /// Connect two existing neurons with explicit synapse parameters.
    ///
    /// The synapse is appended to the network-wide list and registered in
    /// the pre-neuron's outgoing and the post-neuron's incoming lists.
    /// Endpoints are fixed for the synapse's lifetime; there is no removal.
    pub fn connect_with(
        &mut self,
        pre: NeuronId,
        post: NeuronId,
        params: SynapseParams,
    ) -> Result<SynapseId> {
        if pre.index() >= self.neurons.len() {
            return Err(RuntimeError::NeuronNotFound {
                neuron_id: pre.raw(),
            });
        }
        if post.index() >= self.neurons.len() {
            return Err(RuntimeError::NeuronNotFound {
                neuron_id: post.raw(),
            });
        }

        let id = SynapseId::new(self.synapses.len() as u32);
        self.synapses.push(Synapse::new(pre, post, params)?);
        self.neurons[pre.index()].outgoing.push(id);
        self.neurons[post.index()].incoming.push(id);
        Ok(id)
    }

    /// Inject external bias current into a neuron, consumed by the next
    /// Integrate phase
    pub fn inject(&mut self, neuron: NeuronId, current: f64) -> Result<()> {
        let neuron = self
            .neurons
            .get_mut(neuron.index())
            .ok_or(RuntimeError::NeuronNotFound {
                neuron_id: neuron.raw(),
            })?;
        neuron.inject(current);
        Ok(())
    }

    /// Advance the simulation by one step with neutral modulation
    pub fn update(&mut self, dt: f64) -> Result<Vec<SpikeEvent>> {
        self.update_with(dt, &HashMap::new())
    }

    /// Advance the simulation by one step.
    ///
    /// `modulation` supplies per-neuron attention gain and emotion bias for
    /// this step; absent neurons use the neutral default. A non-positive or
    /// non-finite `dt` fails before any phase runs, so the network state is
    /// left exactly as of the previous completed step.
    pub fn update_with(
        &mut self,
        dt: f64,
        modulation: &HashMap<NeuronId, Modulation>,
    ) -> Result<Vec<SpikeEvent>> {
        if !(dt > 0.0) || !dt.is_finite() {
            return Err(RuntimeError::invalid_parameter(
                "dt",
                dt.to_string(),
                "> 0.0 and finite",
            ));
        }

        self.now += dt;
        let now = self.now;

        // Phase 1: Integrate. Per-neuron work is independent; under the
        // `parallel` feature this is the only phase that fans out, keeping
        // the barrier before phase 3 intact.
        #[cfg(feature = "parallel")]
        self.neurons.par_iter_mut().try_for_each(|neuron| {
            let m = modulation.get(&neuron.id()).copied().unwrap_or_default();
            neuron
                .update_potential(neuron.staged_input(), dt, now, m)
                .map(|_| ())
        })?;

        #[cfg(not(feature = "parallel"))]
        for neuron in &mut self.neurons {
            let m = modulation.get(&neuron.id()).copied().unwrap_or_default();
            neuron.update_potential(neuron.staged_input(), dt, now, m)?;
        }

        // Phase 2: Emit.
        let mut events = Vec::new();
        for i in 0..self.neurons.len() {
            if self.neurons[i].spiked() {
                events.push(SpikeEvent {
                    neuron: self.neurons[i].id(),
                    time: now,
                });
                for &sid in &self.neurons[i].outgoing {
                    self.synapses[sid.index()].transmit_spike(now);
                }
            }
        }

        // Phase 3: Propagate & Plasticize. Runs for every synapse in
        // insertion order regardless of spike activity.
        for synapse in &mut self.synapses {
            synapse.astrocyte_update(dt);
            let current = synapse.get_current(now);
            let post = &mut self.neurons[synapse.post().index()];
            post.stage_pending(current);
            if post.spiked() {
                synapse.receive_spike(now, dt);
            }
        }

        // Phase 4: Clear.
        for neuron in &mut self.neurons {
            neuron.promote_pending();
        }

        Ok(events)
    }

    /// Number of neurons
    pub fn neuron_count(&self) -> usize {
        self.neurons.len()
    }

    /// Number of synapses
    pub fn synapse_count(&self) -> usize {
        self.synapses.len()
    }

    /// Current simulation time (ms)
    pub fn now(&self) -> f64 {
        self.now
    }

    /// Look up a neuron
    pub fn neuron(&self, id: NeuronId) -> Result<&Neuron> {
        self.neurons
            .get(id.index())
            .ok_or(RuntimeError::NeuronNotFound { neuron_id: id.raw() })
    }

    /// Look up a synapse
    pub fn synapse(&self, id: SynapseId) -> Result<&Synapse> {
        self.synapses
            .get(id.index())
            .ok_or(RuntimeError::SynapseNotFound {
                synapse_id: id.raw(),
            })
    }

    /// Membrane potential of a neuron (mV)
    pub fn membrane_potential(&self, id: NeuronId) -> Result<f64> {
        Ok(self.neuron(id)?.membrane_potential())
    }

    /// Weight of the first synapse from `pre` to `post`
    pub fn weight(&self, pre: NeuronId, post: NeuronId) -> Result<f64> {
        self.synapses
            .iter()
            .find(|s| s.pre() == pre && s.post() == post)
            .map(Synapse::weight)
            .ok_or_else(|| {
                RuntimeError::invalid_config(format!("no synapse from {} to {}", pre, post))
            })
    }

    /// Iterate neurons in insertion order
    pub fn neurons(&self) -> impl Iterator<Item = &Neuron> {
        self.neurons.iter()
    }

    /// Iterate synapses in insertion order
    pub fn synapses(&self) -> impl Iterator<Item = &Synapse> {
        self.synapses.iter()
    }

    /// All neuron IDs in insertion order
    pub fn neuron_ids(&self) -> Vec<NeuronId> {
        self.neurons.iter().map(Neuron::id).collect()
    }

    /// Reset time and all activity state; learned weights are retained
    pub fn reset(&mut self) {
        self.now = 0.0;
        for neuron in &mut self.neurons {
            neuron.reset();
        }
        for synapse in &mut self.synapses {
            synapse.clear_activity();
        }
    }
}
