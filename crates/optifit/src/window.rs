use std::collections::VecDeque;

use crate::config::EstimatorConfig;

/// Fill level of a [`MeasurementWindow`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowState {
    /// No samples.
    Empty,
    /// Fewer samples than the settle threshold.
    Filling,
    /// At least the settle threshold.
    Settled,
}

/// Bounded FIFO of accepted PD samples, in millimeters.
///
/// Eviction runs at two speeds: [`accept`](Self::accept) drops the oldest
/// sample whenever the capacity would be exceeded, and [`thin`](Self::thin),
/// driven by a slower periodic task, drops the oldest sample once the window
/// has settled so the mean follows recent head positions.
#[derive(Debug, Clone)]
pub struct MeasurementWindow {
    samples: VecDeque<f32>,
    /// Max. number of samples to keep.
    capacity: usize,
    settle_threshold: usize,
    near_offset_mm: f32,
}

impl MeasurementWindow {
    /// Creates an empty window.
    ///
    /// # Arguments
    ///
    /// * `capacity` - Max. number of samples kept.
    /// * `settle_threshold` - Sample count at which the window is settled.
    /// * `near_offset_mm` - Near PD is the mean minus this offset.
    pub fn new(capacity: usize, settle_threshold: usize, near_offset_mm: f32) -> Self {
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
            settle_threshold,
            near_offset_mm,
        }
    }

    /// Creates an empty window from the engine configuration.
    pub fn from_config(config: &EstimatorConfig) -> Self {
        Self::new(
            config.max_samples,
            config.settle_threshold,
            config.near_pd_offset_mm,
        )
    }

    /// Append a sample, evicting the oldest one if the window is full.
    ///
    /// Returns the evicted sample, if any.
    pub fn accept(&mut self, sample_mm: f32) -> Option<f32> {
        self.samples.push_back(sample_mm);

        if self.samples.len() > self.capacity {
            return self.samples.pop_front();
        }
        None
    }

    /// Drop the oldest sample if the window has reached the settle threshold.
    ///
    /// Returns the removed sample, if any.
    pub fn thin(&mut self) -> Option<f32> {
        if self.samples.len() >= self.settle_threshold {
            return self.samples.pop_front();
        }
        None
    }

    /// Arithmetic mean of the samples, 0 when empty.
    pub fn mean(&self) -> f32 {
        if self.samples.is_empty() {
            return 0.0;
        }
        self.samples.iter().sum::<f32>() / self.samples.len() as f32
    }

    /// Distance vision PD.
    pub fn far_pd(&self) -> f32 {
        self.mean()
    }

    /// Reading PD.
    pub fn near_pd(&self) -> f32 {
        self.mean() - self.near_offset_mm
    }

    /// Current fill level.
    pub fn state(&self) -> WindowState {
        match self.samples.len() {
            0 => WindowState::Empty,
            n if n < self.settle_threshold => WindowState::Filling,
            _ => WindowState::Settled,
        }
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Whether the window holds no samples.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Max. number of samples kept.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Samples from oldest to newest.
    pub fn samples(&self) -> impl Iterator<Item = f32> + '_ {
        self.samples.iter().copied()
    }

    /// Drop all samples.
    pub fn reset(&mut self) {
        self.samples.clear();
    }
}

impl Default for MeasurementWindow {
    fn default() -> Self {
        Self::from_config(&EstimatorConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_far_and_near_pd() {
        let mut window = MeasurementWindow::default();
        for sample in [60.0, 61.0, 59.0] {
            window.accept(sample);
        }
        assert_relative_eq!(window.far_pd(), 60.0, epsilon = 1e-5);
        assert_relative_eq!(window.near_pd(), 57.0, epsilon = 1e-5);
    }

    #[test]
    fn test_empty_mean_is_zero() {
        let window = MeasurementWindow::default();
        assert_eq!(window.mean(), 0.0);
        assert_eq!(window.state(), WindowState::Empty);
        assert!(window.is_empty());
    }

    #[test]
    fn test_fifo_eviction_preserves_order() {
        let mut window = MeasurementWindow::new(3, 2, 3.0);
        assert_eq!(window.accept(1.0), None);
        assert_eq!(window.accept(2.0), None);
        assert_eq!(window.accept(3.0), None);
        assert_eq!(window.accept(4.0), Some(1.0));
        assert_eq!(window.accept(5.0), Some(2.0));

        assert_eq!(window.len(), 3);
        assert_eq!(window.samples().collect::<Vec<_>>(), vec![3.0, 4.0, 5.0]);
    }

    #[test]
    fn test_state_transitions() {
        let mut window = MeasurementWindow::new(20, 5, 3.0);
        assert_eq!(window.state(), WindowState::Empty);

        for i in 0..4 {
            window.accept(60.0 + i as f32);
            assert_eq!(window.state(), WindowState::Filling);
        }

        window.accept(64.0);
        assert_eq!(window.state(), WindowState::Settled);

        window.reset();
        assert_eq!(window.state(), WindowState::Empty);
        assert_eq!(window.len(), 0);
    }

    #[test]
    fn test_thin_only_when_settled() {
        let mut window = MeasurementWindow::new(20, 5, 3.0);
        for i in 0..4 {
            window.accept(i as f32);
        }
        assert_eq!(window.thin(), None);
        assert_eq!(window.len(), 4);

        window.accept(4.0);
        assert_eq!(window.thin(), Some(0.0));
        assert_eq!(window.samples().collect::<Vec<_>>(), vec![1.0, 2.0, 3.0, 4.0]);

        // back under the threshold
        assert_eq!(window.thin(), None);
    }

    #[test]
    fn test_size_never_exceeds_capacity() {
        let mut window = MeasurementWindow::new(20, 5, 3.0);
        for i in 0..100 {
            window.accept(i as f32);
            assert!(window.len() <= window.capacity());
        }
        assert_eq!(window.samples().next(), Some(80.0));
    }
}
