//! Discrete-time simulation core for small spiking neural networks
//!
//! This crate provides leaky integrate-and-fire neurons connected by delayed
//! synapses with four interacting plasticity mechanisms (STDP, short-term
//! facilitation/depression, homeostatic regulation, and a slow astrocyte-like
//! gain). The network drives a strictly ordered four-phase step protocol so
//! that spike generation, delayed transmission, and plasticity updates always
//! observe a consistent, reproducible state.

#![deny(missing_docs)]
#![warn(clippy::all)]

use core::fmt;

// Core modules
pub mod error;
pub mod network;
pub mod neuron;
pub mod simulation;
pub mod synapse;

// Re-export essential types
pub use error::{Result, RuntimeError};
pub use network::{Network, SpikeEvent};
pub use neuron::{Modulation, Neuron, NeuronParams};
pub use simulation::{
    PotentialSample, SimulationEngine, SimulationParams, SimulationResult, StimulusPattern,
};
pub use synapse::{
    AstrocyteParams, HomeostaticParams, ShortTermParams, StdpParams, Synapse, SynapseParams,
};

/// Unique identifier for a neuron, indexing the network's insertion order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NeuronId(pub u32);

impl NeuronId {
    /// Create a new neuron ID
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw ID value
    pub const fn raw(&self) -> u32 {
        self.0
    }

    /// Get the index into the network's neuron list
    pub const fn index(&self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NeuronId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "N{}", self.0)
    }
}

/// Unique identifier for a synapse, indexing the network's insertion order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SynapseId(pub u32);

impl SynapseId {
    /// Create a new synapse ID
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw ID value
    pub const fn raw(&self) -> u32 {
        self.0
    }

    /// Get the index into the network's synapse list
    pub const fn index(&self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for SynapseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "S{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_roundtrip() {
        let n = NeuronId::new(3);
        assert_eq!(n.raw(), 3);
        assert_eq!(n.index(), 3);
        assert_eq!(format!("{}", n), "N3");

        let s = SynapseId::new(9);
        assert_eq!(s.raw(), 9);
        assert_eq!(format!("{}", s), "S9");
    }

    #[test]
    fn test_basic_integration() {
        let params = NeuronParams::default();
        assert!(params.tau_m > 0.0);

        let stdp = StdpParams::default();
        assert!(stdp.a_plus > 0.0);

        let sim = SimulationParams::default();
        assert!(sim.dt_ms > 0.0);
    }
}
