//! Delayed synapse with four interacting plasticity mechanisms
//!
//! Each synapse owns a FIFO queue of scheduled delivery times plus the state
//! for spike-timing-dependent plasticity, short-term facilitation/depression,
//! homeostatic regulation, and a slow astrocyte-like gain. All updates mutate
//! only the synapse's own state; ordering across synapses is the network's
//! responsibility.

use std::collections::VecDeque;

use crate::{error::*, NeuronId};

/// Additive epsilon for the inter-spike-interval rate estimate
const RATE_EPSILON: f64 = 1e-6;

/// Parameters for spike-timing-dependent plasticity
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StdpParams {
    /// Potentiation amplitude
    pub a_plus: f64,
    /// Depression amplitude
    pub a_minus: f64,
    /// Potentiation time constant (ms)
    pub tau_plus: f64,
    /// Depression time constant (ms)
    pub tau_minus: f64,
}

impl Default for StdpParams {
    fn default() -> Self {
        Self {
            a_plus: 0.01,    // 1% potentiation rate
            a_minus: 0.012,  // 1.2% depression rate (slightly stronger)
            tau_plus: 20.0,  // 20ms potentiation window
            tau_minus: 20.0, // 20ms depression window
        }
    }
}

impl StdpParams {
    /// Create new STDP parameters with validation
    pub fn new(a_plus: f64, a_minus: f64, tau_plus: f64, tau_minus: f64) -> Result<Self> {
        if !(a_plus > 0.0) {
            return Err(RuntimeError::invalid_parameter(
                "a_plus",
                a_plus.to_string(),
                "> 0.0",
            ));
        }
        if !(a_minus > 0.0) {
            return Err(RuntimeError::invalid_parameter(
                "a_minus",
                a_minus.to_string(),
                "> 0.0",
            ));
        }
        if !(tau_plus > 0.0) {
            return Err(RuntimeError::invalid_parameter(
                "tau_plus",
                tau_plus.to_string(),
                "> 0.0",
            ));
        }
        if !(tau_minus > 0.0) {
            return Err(RuntimeError::invalid_parameter(
                "tau_minus",
                tau_minus.to_string(),
                "> 0.0",
            ));
        }
        Ok(Self {
            a_plus,
            a_minus,
            tau_plus,
            tau_minus,
        })
    }

    /// Validate parameters
    pub fn validate(&self) -> Result<()> {
        Self::new(self.a_plus, self.a_minus, self.tau_plus, self.tau_minus)?;
        Ok(())
    }
}

/// Parameters for short-term facilitation/depression
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ShortTermParams {
    /// Baseline utilization U
    pub baseline_u: f64,
    /// Recovery time constant (ms) shared by utilization and efficacy
    pub tau_p: f64,
}

impl Default for ShortTermParams {
    fn default() -> Self {
        Self {
            baseline_u: 0.2, // 20% baseline release probability
            tau_p: 200.0,    // 200ms recovery
        }
    }
}

impl ShortTermParams {
    /// Create new short-term parameters with validation
    pub fn new(baseline_u: f64, tau_p: f64) -> Result<Self> {
        if !(0.0..=1.0).contains(&baseline_u) {
            return Err(RuntimeError::invalid_parameter(
                "baseline_u",
                baseline_u.to_string(),
                "in [0.0, 1.0]",
            ));
        }
        if !(tau_p > 0.0) {
            return Err(RuntimeError::invalid_parameter(
                "tau_p",
                tau_p.to_string(),
                "> 0.0",
            ));
        }
        Ok(Self { baseline_u, tau_p })
    }

    /// Validate parameters
    pub fn validate(&self) -> Result<()> {
        Self::new(self.baseline_u, self.tau_p)?;
        Ok(())
    }
}

/// Parameters for homeostatic weight regulation
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HomeostaticParams {
    /// Target firing rate (1/ms)
    pub target_rate: f64,
    /// Learning rate toward the target
    pub learning_rate: f64,
}

impl Default for HomeostaticParams {
    fn default() -> Self {
        Self {
            target_rate: 0.1,     // one spike per 10ms
            learning_rate: 0.001, // slow regulation
        }
    }
}

impl HomeostaticParams {
    /// Create new homeostatic parameters with validation
    pub fn new(target_rate: f64, learning_rate: f64) -> Result<Self> {
        if !target_rate.is_finite() || target_rate < 0.0 {
            return Err(RuntimeError::invalid_parameter(
                "target_rate",
                target_rate.to_string(),
                ">= 0.0 and finite",
            ));
        }
        if !learning_rate.is_finite() || learning_rate < 0.0 {
            return Err(RuntimeError::invalid_parameter(
                "learning_rate",
                learning_rate.to_string(),
                ">= 0.0 and finite",
            ));
        }
        Ok(Self {
            target_rate,
            learning_rate,
        })
    }

    /// Validate parameters
    pub fn validate(&self) -> Result<()> {
        Self::new(self.target_rate, self.learning_rate)?;
        Ok(())
    }
}

/// Parameters for the astrocyte gain process
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AstrocyteParams {
    /// Relaxation time constant (ms) toward full calcium
    pub tau_astro: f64,
}

impl Default for AstrocyteParams {
    fn default() -> Self {
        Self { tau_astro: 100.0 }
    }
}

impl AstrocyteParams {
    /// Create new astrocyte parameters with validation
    pub fn new(tau_astro: f64) -> Result<Self> {
        if !(tau_astro > 0.0) {
            return Err(RuntimeError::invalid_parameter(
                "tau_astro",
                tau_astro.to_string(),
                "> 0.0",
            ));
        }
        Ok(Self { tau_astro })
    }

    /// Validate parameters
    pub fn validate(&self) -> Result<()> {
        Self::new(self.tau_astro)?;
        Ok(())
    }
}

/// Full parameter set for a synapse
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SynapseParams {
    /// Initial weight, clamped to [0, 1]
    pub weight: f64,
    /// Transmission delay (ms), immutable for the synapse's lifetime
    pub delay: f64,
    /// Current amplitude per pending delivery (nA)
    pub amplitude: f64,
    /// STDP parameters
    pub stdp: StdpParams,
    /// Short-term plasticity parameters
    pub short_term: ShortTermParams,
    /// Homeostatic regulation parameters
    pub homeostatic: HomeostaticParams,
    /// Astrocyte gain parameters
    pub astrocyte: AstrocyteParams,
}

impl Default for SynapseParams {
    fn default() -> Self {
        Self {
            weight: 0.5,
            delay: 1.0,
            amplitude: 1.0,
            stdp: StdpParams::default(),
            short_term: ShortTermParams::default(),
            homeostatic: HomeostaticParams::default(),
            astrocyte: AstrocyteParams::default(),
        }
    }
}

impl SynapseParams {
    /// Validate the parameter set
    pub fn validate(&self) -> Result<()> {
        if !self.delay.is_finite() || self.delay < 0.0 {
            return Err(RuntimeError::invalid_parameter(
                "delay",
                self.delay.to_string(),
                ">= 0.0 and finite",
            ));
        }
        if !self.weight.is_finite() {
            return Err(RuntimeError::invalid_parameter(
                "weight",
                self.weight.to_string(),
                "finite",
            ));
        }
        if !self.amplitude.is_finite() {
            return Err(RuntimeError::invalid_parameter(
                "amplitude",
                self.amplitude.to_string(),
                "finite",
            ));
        }
        self.stdp.validate()?;
        self.short_term.validate()?;
        self.homeostatic.validate()?;
        self.astrocyte.validate()?;
        Ok(())
    }
}

/// A delayed synaptic connection between two neurons.
///
/// Endpoints are fixed at creation; there is no rewiring or removal path.
/// The weight is hard-clamped to [0, 1] after every mutation.
#[derive(Debug, Clone)]
pub struct Synapse {
    pre: NeuronId,
    post: NeuronId,
    weight: f64,
    delay: f64,
    amplitude: f64,
    stdp: StdpParams,
    short_term: ShortTermParams,
    homeostatic: HomeostaticParams,
    astrocyte: AstrocyteParams,
    /// Scheduled delivery times, oldest first
    deliveries: VecDeque<f64>,
    /// Short-term utilization, in [0, 1]
    u: f64,
    /// Short-term efficacy (available resources), in [0, 1]
    x: f64,
    /// Astrocyte calcium level, in [0, 1]
    astro_ca: f64,
    last_pre_spike: Option<f64>,
    last_post_spike: Option<f64>,
}

impl Synapse {
    /// Create a new synapse between two neurons
    pub fn new(pre: NeuronId, post: NeuronId, params: SynapseParams) -> Result<Self> {
        params.validate()?;
        Ok(Self {
            pre,
            post,
            weight: params.weight.clamp(0.0, 1.0),
            delay: params.delay,
            amplitude: params.amplitude,
            u: params.short_term.baseline_u,
            x: 1.0,
            astro_ca: 0.0,
            stdp: params.stdp,
            short_term: params.short_term,
            homeostatic: params.homeostatic,
            astrocyte: params.astrocyte,
            deliveries: VecDeque::new(),
            last_pre_spike: None,
            last_post_spike: None,
        })
    }

    /// Pre-synaptic spike: schedule a delayed delivery and run the
    /// short-term facilitation/depression update.
    ///
    /// Utilization relaxes toward its baseline and efficacy toward 1.0 over
    /// the interval since the previous pre-spike, then the spike itself
    /// facilitates (`u += U * (1 - u)`) and depletes (`x -= u * x`).
    pub fn transmit_spike(&mut self, now: f64) {
        self.deliveries.push_back(now + self.delay);

        if let Some(prev) = self.last_pre_spike {
            let decay = (-(now - prev) / self.short_term.tau_p).exp();
            let baseline = self.short_term.baseline_u;
            self.u = baseline + (self.u - baseline) * decay;
            self.x = 1.0 + (self.x - 1.0) * decay;
        }
        self.u += self.short_term.baseline_u * (1.0 - self.u);
        self.x -= self.u * self.x;
        self.u = self.u.clamp(0.0, 1.0);
        self.x = self.x.clamp(0.0, 1.0);

        self.last_pre_spike = Some(now);
    }

    /// Purge deliveries due at or before `now` and compute the output
    /// current.
    ///
    /// The current scales with the number of deliveries still pending after
    /// the purge (the backlog), not the number just delivered, and with the
    /// astrocyte gain `1 + 0.1 * ca`.
    pub fn get_current(&mut self, now: f64) -> f64 {
        while let Some(&due) = self.deliveries.front() {
            if due <= now {
                self.deliveries.pop_front();
            } else {
                break;
            }
        }

        let backlog = self.deliveries.len() as f64;
        let current =
            self.weight * self.amplitude * self.x * self.u * backlog * (1.0 + 0.1 * self.astro_ca);
        if current.is_finite() {
            current
        } else {
            log::warn!(
                "non-finite synaptic current {}->{} clamped to 0.0",
                self.pre,
                self.post
            );
            0.0
        }
    }

    /// Post-synaptic spike: record the timestamp, then run the STDP,
    /// homeostatic, and astrocyte updates in that order.
    pub fn receive_spike(&mut self, now: f64, dt: f64) {
        self.last_post_spike = Some(now);
        self.stdp_update();
        self.homeostatic_update();
        self.astrocyte_update(dt);
    }

    /// Relax the astrocyte calcium level toward 1.0.
    ///
    /// Runs once per step for every synapse regardless of spike activity,
    /// and again as part of `receive_spike`.
    pub fn astrocyte_update(&mut self, dt: f64) {
        self.astro_ca += (1.0 - self.astro_ca) * dt / self.astrocyte.tau_astro;
        self.astro_ca = self.astro_ca.clamp(0.0, 1.0);
    }

    /// Pairwise STDP update from the recorded pre/post timestamps.
    ///
    /// A no-op until both timestamps exist. Δt = 0 takes the depression
    /// branch.
    fn stdp_update(&mut self) {
        let (pre, post) = match (self.last_pre_spike, self.last_post_spike) {
            (Some(pre), Some(post)) => (pre, post),
            _ => return,
        };
        let delta_t = post - pre;
        let delta_w = if delta_t > 0.0 {
            self.stdp.a_plus * (-delta_t / self.stdp.tau_plus).exp()
        } else {
            -self.stdp.a_minus * (delta_t / self.stdp.tau_minus).exp()
        };
        self.set_weight(self.weight + delta_w);
    }

    /// Homeostatic regulation toward the target rate.
    ///
    /// The rate is a single inter-spike-interval estimate,
    /// `1 / (last_post - last_pre + eps)`, not a windowed average. A no-op
    /// until both timestamps exist.
    fn homeostatic_update(&mut self) {
        let (pre, post) = match (self.last_pre_spike, self.last_post_spike) {
            (Some(pre), Some(post)) => (pre, post),
            _ => return,
        };
        let rate = 1.0 / (post - pre + RATE_EPSILON);
        let delta_w = self.homeostatic.learning_rate * (self.homeostatic.target_rate - rate);
        self.set_weight(self.weight + delta_w);
    }

    /// Clamp-on-write for the weight; a non-finite candidate is discarded
    /// with a warning rather than poisoning the state.
    fn set_weight(&mut self, weight: f64) {
        if !weight.is_finite() {
            log::warn!(
                "non-finite weight update {}->{} discarded",
                self.pre,
                self.post
            );
            return;
        }
        self.weight = weight.clamp(0.0, 1.0);
    }

    /// Drop all transient activity state (queue, short-term state, calcium,
    /// spike timestamps) while keeping the learned weight
    pub fn clear_activity(&mut self) {
        self.deliveries.clear();
        self.u = self.short_term.baseline_u;
        self.x = 1.0;
        self.astro_ca = 0.0;
        self.last_pre_spike = None;
        self.last_post_spike = None;
    }

    /// Pre-synaptic neuron ID
    pub fn pre(&self) -> NeuronId {
        self.pre
    }

    /// Post-synaptic neuron ID
    pub fn post(&self) -> NeuronId {
        self.post
    }

    /// Current weight, always in [0, 1]
    pub fn weight(&self) -> f64 {
        self.weight
    }

    /// Transmission delay (ms)
    pub fn delay(&self) -> f64 {
        self.delay
    }

    /// Number of deliveries still in flight
    pub fn pending_deliveries(&self) -> usize {
        self.deliveries.len()
    }

    /// Short-term utilization u
    pub fn utilization(&self) -> f64 {
        self.u
    }

    /// Short-term efficacy x
    pub fn efficacy(&self) -> f64 {
        self.x
    }

    /// Astrocyte calcium level
    pub fn astro_ca(&self) -> f64 {
        self.astro_ca
    }

    /// Timestamp of the last pre-synaptic spike
    pub fn last_pre_spike(&self) -> Option<f64> {
        self.last_pre_spike
    }

    /// Timestamp of the last post-synaptic spike
    pub fn last_post_spike(&self) -> Option<f64> {
        self.last_post_spike
    }

    /// Snapshot of the parameter set as currently in effect
    pub fn params(&self) -> SynapseParams {
        SynapseParams {
            weight: self.weight,
            delay: self.delay,
            amplitude: self.amplitude,
            stdp: self.stdp.clone(),
            short_term: self.short_term.clone(),
            homeostatic: self.homeostatic.clone(),
            astrocyte: self.astrocyte.clone(),
        }
    }
}
