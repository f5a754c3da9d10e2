//! Leaky integrate-and-fire neuron model

use crate::{error::*, NeuronId, SynapseId};

/// Parameters for leaky integrate-and-fire neurons
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NeuronParams {
    /// Membrane time constant (ms)
    pub tau_m: f64,
    /// Resting potential (mV)
    pub v_rest: f64,
    /// Reset potential (mV)
    pub v_reset: f64,
    /// Threshold potential (mV)
    pub v_thresh: f64,
    /// Membrane resistance (MΩ)
    pub r_m: f64,
}

impl Default for NeuronParams {
    fn default() -> Self {
        Self {
            tau_m: 20.0,     // 20ms membrane time constant
            v_rest: -65.0,   // -65mV resting potential
            v_reset: -65.0,  // -65mV reset potential
            v_thresh: -50.0, // -50mV threshold
            r_m: 1.0,        // 1MΩ resistance
        }
    }
}

impl NeuronParams {
    /// Create new neuron parameters with validation
    pub fn new(tau_m: f64, v_rest: f64, v_reset: f64, v_thresh: f64, r_m: f64) -> Result<Self> {
        if !(tau_m > 0.0) || !tau_m.is_finite() {
            return Err(RuntimeError::invalid_parameter(
                "tau_m",
                tau_m.to_string(),
                "> 0.0",
            ));
        }
        if !(r_m > 0.0) || !r_m.is_finite() {
            return Err(RuntimeError::invalid_parameter(
                "r_m",
                r_m.to_string(),
                "> 0.0",
            ));
        }
        if v_thresh <= v_reset {
            return Err(RuntimeError::invalid_parameter(
                "v_thresh",
                format!("{} (with v_reset={})", v_thresh, v_reset),
                "> v_reset",
            ));
        }
        if v_thresh <= v_rest {
            return Err(RuntimeError::invalid_parameter(
                "v_thresh",
                format!("{} (with v_rest={})", v_thresh, v_rest),
                "> v_rest",
            ));
        }

        Ok(Self {
            tau_m,
            v_rest,
            v_reset,
            v_thresh,
            r_m,
        })
    }

    /// Validate parameters
    pub fn validate(&self) -> Result<()> {
        Self::new(self.tau_m, self.v_rest, self.v_reset, self.v_thresh, self.r_m)?;
        Ok(())
    }
}

/// Per-step modulation inputs for a neuron.
///
/// Attention gain and emotion bias are supplied explicitly for the step being
/// computed; no other subsystem writes neuron state behind the network's back.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Modulation {
    /// Multiplicative attention gain on input current
    pub attention_gain: f64,
    /// Additive emotional bias current (nA)
    pub emotion_bias: f64,
}

impl Default for Modulation {
    fn default() -> Self {
        Self {
            attention_gain: 1.0,
            emotion_bias: 0.0,
        }
    }
}

/// A leaky integrate-and-fire neuron with double-buffered input staging.
///
/// `input_current` holds what the Integrate phase consumes this step; the
/// Propagate phase accumulates synaptic deliveries into `input_pending`,
/// which the Clear phase promotes for the next step. Spikes emitted in step
/// N therefore cannot influence any potential before step N+1.
#[derive(Debug, Clone)]
pub struct Neuron {
    /// Fixed parameters
    pub params: NeuronParams,
    id: NeuronId,
    v_m: f64,
    spiked: bool,
    last_spike_time: Option<f64>,
    input_current: f64,
    input_pending: f64,
    pub(crate) incoming: Vec<SynapseId>,
    pub(crate) outgoing: Vec<SynapseId>,
}

impl Neuron {
    /// Create a new neuron at resting potential
    pub fn new(id: NeuronId, params: NeuronParams) -> Result<Self> {
        params.validate()?;
        Ok(Self {
            v_m: params.v_rest,
            params,
            id,
            spiked: false,
            last_spike_time: None,
            input_current: 0.0,
            input_pending: 0.0,
            incoming: Vec::new(),
            outgoing: Vec::new(),
        })
    }

    /// Integrate one time step of the membrane equation.
    ///
    /// dv/dt = (-(v_m - v_rest) + r_m * gain * I) / tau_m, forward Euler.
    /// On a threshold crossing the potential is reset in the same step, the
    /// spike flag is raised and the spike time recorded. There is no
    /// refractory period. Returns whether the neuron spiked.
    pub fn update_potential(
        &mut self,
        total_input: f64,
        dt: f64,
        now: f64,
        modulation: Modulation,
    ) -> Result<bool> {
        if !(dt > 0.0) || !dt.is_finite() {
            return Err(RuntimeError::invalid_parameter(
                "dt",
                dt.to_string(),
                "> 0.0 and finite",
            ));
        }

        let current = total_input + modulation.emotion_bias;
        let dv_dt = (-(self.v_m - self.params.v_rest)
            + self.params.r_m * modulation.attention_gain * current)
            / self.params.tau_m;
        self.v_m += dt * dv_dt;

        if self.v_m >= self.params.v_thresh {
            self.v_m = self.params.v_reset;
            self.spiked = true;
            self.last_spike_time = Some(now);
        } else {
            self.spiked = false;
        }
        Ok(self.spiked)
    }

    /// Restore the neuron to its initial state
    pub fn reset(&mut self) {
        self.v_m = self.params.v_rest;
        self.spiked = false;
        self.last_spike_time = None;
        self.input_current = 0.0;
        self.input_pending = 0.0;
    }

    /// Add externally injected bias current, consumed by the next Integrate
    pub fn inject(&mut self, current: f64) {
        self.input_current += current;
    }

    /// Staged input to be consumed by this step's Integrate phase
    pub(crate) fn staged_input(&self) -> f64 {
        self.input_current
    }

    /// Accumulate a synaptic delivery for the next step
    pub(crate) fn stage_pending(&mut self, current: f64) {
        self.input_pending += current;
    }

    /// Clear phase: promote pending deliveries and zero the pending buffer
    pub(crate) fn promote_pending(&mut self) {
        self.input_current = self.input_pending;
        self.input_pending = 0.0;
    }

    /// Get the neuron ID
    pub fn id(&self) -> NeuronId {
        self.id
    }

    /// Current membrane potential (mV)
    pub fn membrane_potential(&self) -> f64 {
        self.v_m
    }

    /// Spike flag for the step just computed
    pub fn spiked(&self) -> bool {
        self.spiked
    }

    /// Time of the most recent spike, if any
    pub fn last_spike_time(&self) -> Option<f64> {
        self.last_spike_time
    }

    /// Incoming synapse references
    pub fn incoming(&self) -> &[SynapseId] {
        &self.incoming
    }

    /// Outgoing synapse references
    pub fn outgoing(&self) -> &[SynapseId] {
        &self.outgoing
    }
}
