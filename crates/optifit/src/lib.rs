#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]
//!
//! # Optifit
//!
//! Estimates the pupillary distance (far and near) and the segment height of
//! each eye from tracked face geometry and 2D landmark detections.
//!
//! The engine is a single threaded [`Session`] fed with [`SessionEvent`]s.
//! It never touches a camera, a renderer or a mail client itself: every
//! effect is returned as a [`SessionCommand`] for the embedding application
//! to carry out.
//!
//! ## Example
//!
//! ```rust
//! use std::time::Instant;
//!
//! use glam::Vec2;
//! use optifit::{ContactDetails, EstimatorConfig, Session, SessionCommand, SessionEvent};
//!
//! let contact = ContactDetails::new("Ada", "Lovelace", "ada@example.com").unwrap();
//! let mut session =
//!     Session::new(EstimatorConfig::default(), contact, Vec2::new(414.0, 896.0)).unwrap();
//!
//! let commands = session.handle(SessionEvent::Started, Instant::now()).unwrap();
//! assert!(commands.contains(&SessionCommand::StartTracking));
//! assert!(commands.contains(&SessionCommand::ShowLoader(true)));
//! ```

/// Per-frame millimeter calibration, head yaw and depth correction.
pub mod calibration;

/// Tunable constants of the engine.
pub mod config;

/// Error types of the engine.
pub mod error;

/// Face geometry delivered by the tracking session.
pub mod face;

/// Decides whether a landmark scan should run.
pub mod gate;

/// Landmark detector output.
pub mod landmarks;

/// Measurement report for export.
pub mod report;

/// Cancellable timers driven by an explicit clock.
pub mod scheduler;

/// Segment height adjustment and overlay.
pub mod segment_height;

/// Event driven measurement session.
pub mod session;

/// Sliding window of PD samples.
pub mod window;

pub use config::EstimatorConfig;
pub use error::{ConfigError, ReportError, SessionError};
pub use face::{FaceGeometrySample, GazeState};
pub use landmarks::FaceLandmarks;
pub use report::{ContactDetails, EmailReport, ReportBuilder};
pub use session::{Session, SessionCommand, SessionEvent};
