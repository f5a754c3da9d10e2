//! Error types for the simulation core

use thiserror::Error;

/// Result type for runtime operations
pub type Result<T> = std::result::Result<T, RuntimeError>;

/// Errors that can occur in the simulation core
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// Invalid numeric parameter value (the fatal domain error class)
    #[error("Invalid parameter {parameter}: {value} (expected {constraint})")]
    InvalidParameter {
        /// Parameter name
        parameter: String,
        /// Invalid value
        value: String,
        /// Constraint description
        constraint: String,
    },

    /// Neuron not found
    #[error("Neuron {neuron_id} not found")]
    NeuronNotFound {
        /// Neuron ID that was not found
        neuron_id: u32,
    },

    /// Synapse not found
    #[error("Synapse {synapse_id} not found")]
    SynapseNotFound {
        /// Synapse ID that was not found
        synapse_id: u32,
    },

    /// Invalid network configuration
    #[error("Invalid network configuration: {reason}")]
    InvalidConfiguration {
        /// Reason for invalid configuration
        reason: String,
    },

    /// Simulation step failed
    #[error("Simulation step failed at t={time_ms}ms: {reason}")]
    SimulationStep {
        /// Simulation time when the step failed
        time_ms: f64,
        /// Reason for failure
        reason: String,
    },
}

impl RuntimeError {
    /// Create an invalid parameter error
    pub fn invalid_parameter(
        parameter: impl Into<String>,
        value: impl Into<String>,
        constraint: impl Into<String>,
    ) -> Self {
        Self::InvalidParameter {
            parameter: parameter.into(),
            value: value.into(),
            constraint: constraint.into(),
        }
    }

    /// Create an invalid configuration error
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfiguration {
            reason: reason.into(),
        }
    }

    /// Create a simulation step error
    pub fn simulation_step(time_ms: f64, reason: impl Into<String>) -> Self {
        Self::SimulationStep {
            time_ms,
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = RuntimeError::invalid_parameter("dt", "0.0", "> 0.0");
        assert!(matches!(err, RuntimeError::InvalidParameter { .. }));

        let err = RuntimeError::invalid_config("no neurons");
        assert!(matches!(err, RuntimeError::InvalidConfiguration { .. }));
    }

    #[test]
    fn test_error_display() {
        let err = RuntimeError::NeuronNotFound { neuron_id: 7 };
        let msg = format!("{}", err);
        assert!(msg.contains("Neuron 7 not found"));
    }
}
