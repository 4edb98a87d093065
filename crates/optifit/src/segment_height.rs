use glam::Vec2;

use crate::landmarks::PupilObservation;

/// Half width of the horizontal ticks drawn by the overlay, in view points.
pub const MARKER_HALF_WIDTH: f32 = 10.0;

/// Which eye an action applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Eye {
    /// Left eye.
    Left,
    /// Right eye.
    Right,
}

/// Direction of a stepper action, in view terms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepDirection {
    /// Move the segment line up (smaller view y).
    Up,
    /// Move the segment line down (larger view y).
    Down,
}

/// Segment height of both eyes, in millimeters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentHeights {
    /// Left eye segment height.
    pub left_mm: f32,
    /// Right eye segment height.
    pub right_mm: f32,
}

/// Overlay geometry for one eye: a tick at the pupil, a vertical line down
/// to the segment line, and a tick at the segment line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentHeightMarker {
    /// Pupil center.
    pub pupil: Vec2,
    /// View y of the segment line.
    pub segment_line_y: f32,
}

impl SegmentHeightMarker {
    /// Line segments to stroke, as `(start, end)` pairs.
    pub fn lines(&self) -> [(Vec2, Vec2); 3] {
        let p = self.pupil;
        let y = self.segment_line_y;
        let w = MARKER_HALF_WIDTH;
        [
            (Vec2::new(p.x - w, p.y), Vec2::new(p.x + w, p.y)),
            (p, Vec2::new(p.x, y)),
            (Vec2::new(p.x - w, y), Vec2::new(p.x + w, y)),
        ]
    }
}

/// Overlay for both eyes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentHeightOverlay {
    /// Left eye marker.
    pub left: SegmentHeightMarker,
    /// Right eye marker.
    pub right: SegmentHeightMarker,
}

/// User adjustment of the segment line of each eye, in view points, relative
/// to the nose reference.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SegmentHeightAdjustment {
    left_px: f32,
    right_px: f32,
}

impl SegmentHeightAdjustment {
    /// Move one eye's segment line by `step_mm`, converted to view points with
    /// the current calibration ratio.
    ///
    /// A ratio that is not a positive finite number leaves the offset alone.
    pub fn step(
        &mut self,
        eye: Eye,
        direction: StepDirection,
        step_mm: f32,
        millimeters_per_pixel: f32,
    ) {
        if !(millimeters_per_pixel > 0.0 && millimeters_per_pixel.is_finite()) {
            return;
        }

        let pixels = step_mm / millimeters_per_pixel;
        let delta = match direction {
            StepDirection::Up => -pixels,
            StepDirection::Down => pixels,
        };

        match eye {
            Eye::Left => self.left_px += delta,
            Eye::Right => self.right_px += delta,
        }
    }

    /// Current offset of one eye, in view points.
    pub fn offset(&self, eye: Eye) -> f32 {
        match eye {
            Eye::Left => self.left_px,
            Eye::Right => self.right_px,
        }
    }

    /// Segment heights for an observation, computed on demand.
    pub fn heights(
        &self,
        observation: &PupilObservation,
        millimeters_per_pixel: f32,
    ) -> SegmentHeights {
        let height = |pupil: Vec2, offset: f32| {
            (observation.nose.y - pupil.y + offset) * millimeters_per_pixel
        };

        SegmentHeights {
            left_mm: height(observation.left_pupil, self.left_px),
            right_mm: height(observation.right_pupil, self.right_px),
        }
    }

    /// Overlay geometry for an observation.
    pub fn overlay(&self, observation: &PupilObservation) -> SegmentHeightOverlay {
        SegmentHeightOverlay {
            left: SegmentHeightMarker {
                pupil: observation.left_pupil,
                segment_line_y: observation.nose.y + self.left_px,
            },
            right: SegmentHeightMarker {
                pupil: observation.right_pupil,
                segment_line_y: observation.nose.y + self.right_px,
            },
        }
    }

    /// Back to zero offsets.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
