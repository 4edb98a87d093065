use crate::config::EstimatorConfig;
use crate::face::GazeState;

/// Everything the gate looks at for one scan.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GateInputs {
    /// Latest gaze coefficients.
    pub gaze: GazeState,
    /// Latest head yaw, `None` if unknown.
    pub head_yaw_degrees: Option<f32>,
    /// Number of samples already in the measurement window.
    pub sample_count: usize,
}

/// Why a scan was not attempted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// One of the eyes looks up too far.
    LookingUp,
    /// One of the eyes looks down too far.
    LookingDown,
    /// The head is turned away from frontal.
    HeadTurned,
    /// The head pose could not be derived for the latest frame.
    HeadPoseUnknown,
    /// The window already holds its quota of samples.
    QuotaReached,
}

/// Outcome of the validity gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    /// Attempt a measurement this cycle.
    Accept,
    /// Skip this cycle.
    Reject(RejectReason),
}

impl GateDecision {
    /// Whether the decision is [`GateDecision::Accept`].
    pub fn is_accept(&self) -> bool {
        matches!(self, GateDecision::Accept)
    }
}

/// Decides whether a frame is worth sending to the landmark detector.
///
/// Checks run in a fixed order and the first failing one is reported.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValidityGate {
    gaze_limit: f32,
    max_head_yaw_degrees: f32,
    max_samples: usize,
}

impl ValidityGate {
    /// Creates a gate from explicit limits.
    pub fn new(gaze_limit: f32, max_head_yaw_degrees: f32, max_samples: usize) -> Self {
        Self {
            gaze_limit,
            max_head_yaw_degrees,
            max_samples,
        }
    }

    /// Creates a gate from the engine configuration.
    pub fn from_config(config: &EstimatorConfig) -> Self {
        Self::new(
            config.gaze_limit,
            config.max_head_yaw_degrees,
            config.max_samples,
        )
    }

    /// Evaluate the gate. Has no side effects.
    ///
    /// Example:
    /// ```
    /// use optifit::gate::{GateDecision, GateInputs, RejectReason, ValidityGate};
    /// use optifit::GazeState;
    ///
    /// let gate = ValidityGate::new(0.12, 3.0, 20);
    /// let decision = gate.evaluate(&GateInputs {
    ///     gaze: GazeState::default(),
    ///     head_yaw_degrees: Some(5.0),
    ///     sample_count: 0,
    /// });
    /// assert_eq!(decision, GateDecision::Reject(RejectReason::HeadTurned));
    /// ```
    pub fn evaluate(&self, inputs: &GateInputs) -> GateDecision {
        let gaze = &inputs.gaze;

        if !(gaze.look_up_left < self.gaze_limit && gaze.look_up_right < self.gaze_limit) {
            return GateDecision::Reject(RejectReason::LookingUp);
        }

        if !(gaze.look_down_left < self.gaze_limit && gaze.look_down_right < self.gaze_limit) {
            return GateDecision::Reject(RejectReason::LookingDown);
        }

        match inputs.head_yaw_degrees {
            None => return GateDecision::Reject(RejectReason::HeadPoseUnknown),
            Some(yaw) if !(yaw > -self.max_head_yaw_degrees && yaw < self.max_head_yaw_degrees) => {
                return GateDecision::Reject(RejectReason::HeadTurned)
            }
            Some(_) => {}
        }

        if inputs.sample_count >= self.max_samples {
            return GateDecision::Reject(RejectReason::QuotaReached);
        }

        GateDecision::Accept
    }
}

impl Default for ValidityGate {
    fn default() -> Self {
        Self::from_config(&EstimatorConfig::default())
    }
}
