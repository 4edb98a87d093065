//! Single-threaded measurement session driven by explicit events.
//!
//! The embedding application forwards tracking updates, detector results,
//! user actions and clock ticks as [`SessionEvent`]s, and carries out the
//! [`SessionCommand`]s each one returns. All events must be delivered from
//! the same thread; the session holds no locks.

use std::time::Instant;

use glam::Vec2;

use optifit_3d::camera::ViewCamera;
use optifit_3d::segment::{oriented_segment, OrientedSegment};

use crate::calibration::CalibrationState;
use crate::config::EstimatorConfig;
use crate::error::{ConfigError, SessionError};
use crate::face::{FaceGeometrySample, GazeState};
use crate::gate::{GateDecision, GateInputs, ValidityGate};
use crate::landmarks::{FaceLandmarks, PupilObservation};
use crate::report::{ContactDetails, EmailReport, ReportBuilder, NOT_AVAILABLE};
use crate::scheduler::{Scheduler, TaskKind};
use crate::segment_height::{
    Eye, SegmentHeightAdjustment, SegmentHeightOverlay, SegmentHeights, StepDirection,
};
use crate::window::{MeasurementWindow, WindowState};

/// Title of the alert shown when the tracking session fails.
pub const SESSION_FAILED_TITLE: &str = "The AR session failed.";

/// What the session is currently measuring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeasurementMode {
    /// Pupillary distance, scanning continuously.
    Pd,
    /// Segment height on a frozen observation.
    SegmentHeight,
}

/// The two result labels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayLines {
    /// Upper label.
    pub first: String,
    /// Lower label.
    pub second: String,
}

impl DisplayLines {
    fn pd(far_pd: f32, near_pd: f32) -> Self {
        Self {
            first: format!("Far PD: {far_pd:.1}"),
            second: format!("Near PD: {near_pd:.1}"),
        }
    }

    fn segment_height(heights: Option<SegmentHeights>) -> Self {
        let format = |value: Option<f32>| match value {
            Some(value) => format!("{value:.1}"),
            None => NOT_AVAILABLE.to_string(),
        };
        Self {
            first: format!("Left SH: {}", format(heights.map(|h| h.left_mm))),
            second: format!("Right SH: {}", format(heights.map(|h| h.right_mm))),
        }
    }
}

/// Hard failure reported by the tracking session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackingFailure {
    /// Short description of the failure.
    pub description: String,
    /// Why it failed, if known.
    pub failure_reason: Option<String>,
    /// What the user can do about it, if known.
    pub recovery_suggestion: Option<String>,
}

impl TrackingFailure {
    /// Alert message: the available parts, one per line.
    pub fn message(&self) -> String {
        std::iter::once(self.description.as_str())
            .chain(self.failure_reason.as_deref())
            .chain(self.recovery_suggestion.as_deref())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Inputs to a [`Session`].
#[derive(Debug, Clone)]
pub enum SessionEvent {
    /// The measurement screen appeared.
    Started,
    /// The tracking session updated the face geometry.
    GeometryUpdated {
        /// Face geometry of the frame.
        sample: Box<FaceGeometrySample>,
        /// Camera rendering the frame.
        camera: ViewCamera,
    },
    /// Clock tick; runs the scheduled tasks that are due.
    Tick,
    /// The landmark detector finished a pass started by
    /// [`SessionCommand::CaptureAndDetect`].
    LandmarksDetected(Vec<FaceLandmarks>),
    /// The landmark detector failed. The pass is dropped.
    DetectionFailed(String),
    /// The tracking session reported a hard failure.
    TrackingFailed(TrackingFailure),
    /// The user asked to measure segment height.
    MeasureSegmentHeight,
    /// The user moved a segment line.
    StepSegmentHeight {
        /// Eye whose line moves.
        eye: Eye,
        /// Direction of the move.
        direction: StepDirection,
    },
    /// The user applied the results.
    Apply,
    /// The export sheet was dismissed.
    ExportDismissed,
    /// The user asked to restart tracking after a failure.
    ResumeTracking,
    /// The user restarted the measurement.
    Restart,
    /// The screen went away.
    TornDown,
}

/// Effects the embedding application must carry out.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionCommand {
    /// Run (or re-run) face tracking.
    StartTracking,
    /// Pause face tracking.
    PauseTracking,
    /// Capture the current view without the pupil line and run the landmark
    /// detector on it; report back with [`SessionEvent::LandmarksDetected`].
    CaptureAndDetect,
    /// Update the result labels.
    Display(DisplayLines),
    /// Show or hide the progress indicator (labels are hidden while it shows).
    ShowLoader(bool),
    /// Show or hide the "measure segment height" and "apply" actions.
    ShowActions(bool),
    /// Draw the line between the eye centers, in the face frame.
    DrawPupilLine(OrientedSegment),
    /// Hide the line between the eye centers.
    HidePupilLine,
    /// Draw the segment height markers over the frozen frame.
    ShowSegmentHeightOverlay(SegmentHeightOverlay),
    /// Remove the segment height markers.
    ClearSegmentHeightOverlay,
    /// Present the report for export.
    PresentReport(EmailReport),
    /// Show an alert offering to restart tracking.
    ShowError {
        /// Alert title.
        title: String,
        /// Alert body.
        message: String,
    },
}

/// State of one measurement screen.
pub struct Session {
    config: EstimatorConfig,
    gate: ValidityGate,
    contact: ContactDetails,
    view_size: Vec2,
    calibration: CalibrationState,
    window: MeasurementWindow,
    adjustment: SegmentHeightAdjustment,
    gaze: GazeState,
    observation: Option<PupilObservation>,
    mode: MeasurementMode,
    scheduler: Scheduler,
    skip_next_detection: bool,
    loader_visible: bool,
    actions_visible: bool,
    export_presented: bool,
    torn_down: bool,
}

impl Session {
    /// Creates a session for a view of `view_size` points.
    ///
    /// Nothing is scheduled until [`SessionEvent::Started`] is handled.
    pub fn new(
        config: EstimatorConfig,
        contact: ContactDetails,
        view_size: Vec2,
    ) -> Result<Self, ConfigError> {
        config.validate()?;

        Ok(Self {
            gate: ValidityGate::from_config(&config),
            window: MeasurementWindow::from_config(&config),
            skip_next_detection: config.skip_first_detection,
            config,
            contact,
            view_size,
            calibration: CalibrationState::default(),
            adjustment: SegmentHeightAdjustment::default(),
            gaze: GazeState::default(),
            observation: None,
            mode: MeasurementMode::Pd,
            scheduler: Scheduler::new(),
            loader_visible: false,
            actions_visible: false,
            export_presented: false,
            torn_down: false,
        })
    }

    /// Handle one event at time `now`.
    pub fn handle(
        &mut self,
        event: SessionEvent,
        now: Instant,
    ) -> Result<Vec<SessionCommand>, SessionError> {
        if self.torn_down {
            return Err(SessionError::TornDown);
        }

        let mut commands = Vec::new();
        match event {
            SessionEvent::Started => self.on_started(now, &mut commands),
            SessionEvent::GeometryUpdated { sample, camera } => {
                self.on_geometry(&sample, &camera, &mut commands)
            }
            SessionEvent::Tick => self.on_tick(now, &mut commands),
            SessionEvent::LandmarksDetected(faces) => self.on_landmarks(&faces, &mut commands),
            SessionEvent::DetectionFailed(reason) => {
                log::warn!("landmark detection failed, dropping pass: {reason}");
            }
            SessionEvent::TrackingFailed(failure) => {
                log::warn!("tracking session failed: {}", failure.description);
                commands.push(SessionCommand::ShowError {
                    title: SESSION_FAILED_TITLE.to_string(),
                    message: failure.message(),
                });
            }
            SessionEvent::MeasureSegmentHeight => self.on_measure_segment_height(&mut commands)?,
            SessionEvent::StepSegmentHeight { eye, direction } => {
                self.on_step_segment_height(eye, direction, &mut commands)?
            }
            SessionEvent::Apply => self.on_apply(now, &mut commands)?,
            SessionEvent::ExportDismissed => self.export_presented = false,
            SessionEvent::ResumeTracking => commands.push(SessionCommand::StartTracking),
            SessionEvent::Restart => self.on_restart(now, &mut commands),
            SessionEvent::TornDown => {
                log::debug!("session torn down");
                self.scheduler.cancel_all();
                self.torn_down = true;
                commands.push(SessionCommand::PauseTracking);
            }
        }

        Ok(commands)
    }

    fn on_started(&mut self, now: Instant, commands: &mut Vec<SessionCommand>) {
        commands.push(SessionCommand::StartTracking);
        commands.push(SessionCommand::ShowActions(false));
        self.set_loader(true, commands);
        self.arm_timers(now);
    }

    fn on_geometry(
        &mut self,
        sample: &FaceGeometrySample,
        camera: &ViewCamera,
        commands: &mut Vec<SessionCommand>,
    ) {
        // segment heights are read against the calibration they were frozen with
        if self.mode != MeasurementMode::Pd {
            log::debug!("ignoring geometry delivered after leaving PD mode");
            return;
        }

        self.gaze = sample.gaze;
        self.calibration.update(sample, camera);

        commands.push(SessionCommand::DrawPupilLine(oriented_segment(
            sample.left_eye_position(),
            sample.right_eye_position(),
        )));
    }

    fn on_tick(&mut self, now: Instant, commands: &mut Vec<SessionCommand>) {
        for task in self.scheduler.due(now) {
            match task {
                TaskKind::Scan => self.on_scan(commands),
                TaskKind::Thin => self.on_thin(commands),
                TaskKind::ExportRecheck => self.on_export_recheck(now, commands),
            }
        }
    }

    fn on_scan(&mut self, commands: &mut Vec<SessionCommand>) {
        if self.mode != MeasurementMode::Pd {
            return;
        }

        let decision = self.gate.evaluate(&GateInputs {
            gaze: self.gaze,
            head_yaw_degrees: self.calibration.head_yaw_degrees,
            sample_count: self.window.len(),
        });

        match decision {
            GateDecision::Accept => commands.push(SessionCommand::CaptureAndDetect),
            GateDecision::Reject(reason) => log::debug!("scan skipped: {reason:?}"),
        }
    }

    fn on_thin(&mut self, commands: &mut Vec<SessionCommand>) {
        if self.window.thin().is_none() {
            return;
        }

        self.set_loader(false, commands);
        if self.mode == MeasurementMode::Pd {
            if !self.actions_visible {
                log::info!("measurement settled at {:.1} mm", self.window.far_pd());
                self.actions_visible = true;
                commands.push(SessionCommand::ShowActions(true));
            }
            commands.push(SessionCommand::Display(self.display_lines()));
        }
    }

    fn on_export_recheck(&mut self, now: Instant, commands: &mut Vec<SessionCommand>) {
        if !self.export_presented && self.mode == MeasurementMode::Pd {
            log::debug!("export dismissed, resuming scan");
            commands.push(SessionCommand::StartTracking);
            self.arm_timers(now);
        } else {
            self.scheduler.schedule_once(
                TaskKind::ExportRecheck,
                self.config.export_recheck_interval(),
                now,
            );
        }
    }

    fn on_landmarks(&mut self, faces: &[FaceLandmarks], commands: &mut Vec<SessionCommand>) {
        if self.mode != MeasurementMode::Pd {
            log::debug!("ignoring landmarks delivered after leaving PD mode");
            return;
        }

        for face in faces {
            if self.skip_next_detection {
                self.skip_next_detection = false;
                log::debug!("skipping first detection");
                continue;
            }

            let Some(observation) = face.to_view(self.view_size) else {
                log::debug!("detection without pupils or nose reference");
                continue;
            };
            self.observation = Some(observation);

            let Some(distance_mm) = self
                .calibration
                .to_millimeters(observation.pupil_distance())
            else {
                log::debug!("calibration unavailable, no sample this pass");
                continue;
            };

            let sample = distance_mm + self.calibration.depth_correction_mm;
            if !sample.is_finite() {
                log::warn!("discarding non-finite PD sample");
                continue;
            }

            let before = self.window.state();
            self.window.accept(sample);
            log::debug!(
                "accepted PD sample {sample:.2} mm ({} in window)",
                self.window.len()
            );
            if before != self.window.state() {
                log::debug!("window {:?} -> {:?}", before, self.window.state());
            }

            commands.push(SessionCommand::Display(self.display_lines()));
        }
    }

    fn on_measure_segment_height(
        &mut self,
        commands: &mut Vec<SessionCommand>,
    ) -> Result<(), SessionError> {
        if self.mode == MeasurementMode::SegmentHeight {
            return Err(SessionError::AlreadyInSegmentHeightMode);
        }
        if !self.actions_visible {
            return Err(SessionError::NotSettled);
        }
        let observation = self.observation.ok_or(SessionError::NoObservation)?;
        if self.calibration.millimeters_per_pixel.is_none() {
            return Err(SessionError::CalibrationUnavailable);
        }

        log::info!("switching to segment height");
        self.mode = MeasurementMode::SegmentHeight;
        self.stop_tracking(commands);
        commands.push(SessionCommand::HidePupilLine);
        commands.push(SessionCommand::ShowSegmentHeightOverlay(
            self.adjustment.overlay(&observation),
        ));
        commands.push(SessionCommand::Display(self.display_lines()));
        Ok(())
    }

    fn on_step_segment_height(
        &mut self,
        eye: Eye,
        direction: StepDirection,
        commands: &mut Vec<SessionCommand>,
    ) -> Result<(), SessionError> {
        if self.mode != MeasurementMode::SegmentHeight {
            return Err(SessionError::NotInSegmentHeightMode);
        }
        let observation = self.observation.ok_or(SessionError::NoObservation)?;
        let ratio = self
            .calibration
            .millimeters_per_pixel
            .ok_or(SessionError::CalibrationUnavailable)?;

        self.adjustment
            .step(eye, direction, self.config.segment_height_step_mm, ratio);

        commands.push(SessionCommand::ShowSegmentHeightOverlay(
            self.adjustment.overlay(&observation),
        ));
        commands.push(SessionCommand::Display(self.display_lines()));
        Ok(())
    }

    fn on_apply(
        &mut self,
        now: Instant,
        commands: &mut Vec<SessionCommand>,
    ) -> Result<(), SessionError> {
        if !self.actions_visible {
            return Err(SessionError::NotSettled);
        }

        self.stop_tracking(commands);
        let report = self.report();
        log::info!(
            "exporting far PD {:?}, near PD {:?}",
            report.far_pd(),
            report.near_pd()
        );
        commands.push(SessionCommand::PresentReport(report));

        self.export_presented = true;
        self.scheduler.schedule_once(
            TaskKind::ExportRecheck,
            self.config.export_recheck_interval(),
            now,
        );
        Ok(())
    }

    fn on_restart(&mut self, now: Instant, commands: &mut Vec<SessionCommand>) {
        log::info!("restarting measurement");
        self.window.reset();
        self.adjustment.reset();
        self.observation = None;
        self.skip_next_detection = self.config.skip_first_detection;
        self.mode = MeasurementMode::Pd;
        self.actions_visible = false;
        self.scheduler.cancel(TaskKind::ExportRecheck);

        commands.push(SessionCommand::ShowActions(false));
        commands.push(SessionCommand::HidePupilLine);
        commands.push(SessionCommand::ClearSegmentHeightOverlay);
        commands.push(SessionCommand::StartTracking);
        self.set_loader(true, commands);
        self.arm_timers(now);
    }

    fn arm_timers(&mut self, now: Instant) {
        self.scheduler
            .schedule_repeating(TaskKind::Scan, self.config.scan_interval(), now);
        self.scheduler
            .schedule_repeating(TaskKind::Thin, self.config.thinning_interval(), now);
    }

    fn stop_tracking(&mut self, commands: &mut Vec<SessionCommand>) {
        self.scheduler.cancel(TaskKind::Scan);
        self.scheduler.cancel(TaskKind::Thin);
        commands.push(SessionCommand::PauseTracking);
    }

    fn set_loader(&mut self, visible: bool, commands: &mut Vec<SessionCommand>) {
        if self.loader_visible != visible {
            self.loader_visible = visible;
            commands.push(SessionCommand::ShowLoader(visible));
        }
    }

    /// Labels for the current mode.
    pub fn display_lines(&self) -> DisplayLines {
        match self.mode {
            MeasurementMode::Pd => DisplayLines::pd(self.window.far_pd(), self.window.near_pd()),
            MeasurementMode::SegmentHeight => DisplayLines::segment_height(self.segment_heights()),
        }
    }

    /// Segment heights of the frozen observation, only in segment height mode.
    pub fn segment_heights(&self) -> Option<SegmentHeights> {
        if self.mode != MeasurementMode::SegmentHeight {
            return None;
        }
        let observation = self.observation.as_ref()?;
        let ratio = self.calibration.millimeters_per_pixel?;
        Some(self.adjustment.heights(observation, ratio))
    }

    /// Report for the current results.
    pub fn report(&self) -> EmailReport {
        let heights = self.segment_heights();
        ReportBuilder::new()
            .contact(&self.contact)
            .far_pd(self.window.far_pd())
            .near_pd(self.window.near_pd())
            .left_sh(heights.map(|h| h.left_mm))
            .right_sh(heights.map(|h| h.right_mm))
            .build()
    }

    /// Far PD, in millimeters.
    pub fn far_pd(&self) -> f32 {
        self.window.far_pd()
    }

    /// Near PD, in millimeters.
    pub fn near_pd(&self) -> f32 {
        self.window.near_pd()
    }

    /// Current mode.
    pub fn mode(&self) -> MeasurementMode {
        self.mode
    }

    /// Fill level of the measurement window.
    pub fn window_state(&self) -> WindowState {
        self.window.state()
    }

    /// The measurement window.
    pub fn window(&self) -> &MeasurementWindow {
        &self.window
    }

    /// Calibration of the latest tracking update.
    pub fn calibration(&self) -> &CalibrationState {
        &self.calibration
    }

    /// Latest accepted pupil observation.
    pub fn observation(&self) -> Option<&PupilObservation> {
        self.observation.as_ref()
    }

    /// Whether `task` is scheduled.
    pub fn is_scheduled(&self, task: TaskKind) -> bool {
        self.scheduler.is_scheduled(task)
    }

    /// Whether the progress indicator is showing.
    pub fn loader_visible(&self) -> bool {
        self.loader_visible
    }

    /// Whether the segment height and apply actions are showing.
    pub fn actions_visible(&self) -> bool {
        self.actions_visible
    }

    /// Whether the session has been torn down.
    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tracking_failure_message() {
        let failure = TrackingFailure {
            description: "Camera unavailable".to_string(),
            failure_reason: None,
            recovery_suggestion: Some("Close other camera apps".to_string()),
        };
        assert_eq!(
            failure.message(),
            "Camera unavailable\nClose other camera apps"
        );
    }

    #[test]
    fn test_display_lines() {
        let lines = DisplayLines::pd(62.04, 59.04);
        assert_eq!(lines.first, "Far PD: 62.0");
        assert_eq!(lines.second, "Near PD: 59.0");

        let lines = DisplayLines::segment_height(None);
        assert_eq!(lines.first, "Left SH: N/A");
        assert_eq!(lines.second, "Right SH: N/A");

        let lines = DisplayLines::segment_height(Some(SegmentHeights {
            left_mm: 21.34,
            right_mm: 20.0,
        }));
        assert_eq!(lines.first, "Left SH: 21.3");
        assert_eq!(lines.second, "Right SH: 20.0");
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let contact = ContactDetails::new("Ada", "Lovelace", "ada@example.com").unwrap();
        let config = EstimatorConfig {
            max_samples: 0,
            ..Default::default()
        };
        assert!(Session::new(config, contact, Vec2::new(414.0, 896.0)).is_err());
    }
}
