use crate::ds::RingBuffer;

/// Bounded history of prediction errors
///
/// Keeps the most recent `capacity` errors so the quality of a network's predictions can be inspected while training.
#[derive(Debug, Clone)]
pub struct ErrorTracker {
    history: RingBuffer<f32>,
    threshold: f32,
}

impl ErrorTracker {
    /// **Panics** if `capacity` is zero
    pub fn new(capacity: usize, threshold: f32) -> Self {
        Self {
            history: RingBuffer::new(capacity),
            threshold,
        }
    }

    pub fn track(&mut self, error: f32) {
        self.history.push(error);
    }

    /// Check whether the mean absolute error between `prediction` and `actual` is below the threshold
    ///
    /// The error is tracked as a side effect.
    pub fn is_prediction_reliable(&mut self, prediction: &[f32], actual: &[f32]) -> bool {
        let error = mean_abs_error(prediction, actual);
        self.track(error);
        error < self.threshold
    }

    /// Mean of the tracked errors, or `None` if nothing was tracked yet
    pub fn mean(&self) -> Option<f32> {
        if self.history.is_empty() {
            return None;
        }
        Some(self.history.iter().sum::<f32>() / self.history.len() as f32)
    }

    pub fn latest(&self) -> Option<f32> {
        self.history.last().copied()
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }
}

impl Default for ErrorTracker {
    fn default() -> Self {
        Self::new(1000, 0.5)
    }
}

fn mean_abs_error(a: &[f32], b: &[f32]) -> f32 {
    if a.is_empty() {
        return 0.0;
    }
    a.iter().zip(b).map(|(x, y)| (x - y).abs()).sum::<f32>() / a.len() as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_tracker_functional() {
        let mut tracker = ErrorTracker::new(2, 0.5);
        assert!(tracker.mean().is_none());

        assert!(tracker.is_prediction_reliable(&[1.0, 2.0], &[1.0, 2.5]));
        assert!(!tracker.is_prediction_reliable(&[1.0, 2.0], &[2.0, 3.0]));
        assert_eq!(tracker.len(), 2);
        assert_eq!(tracker.mean(), Some(0.625));

        tracker.track(0.0);
        assert_eq!(tracker.len(), 2, "history is bounded");
        assert_eq!(tracker.latest(), Some(0.0));
        assert_eq!(tracker.mean(), Some(0.5));
    }

    #[test]
    fn mean_abs_error_of_empty_slices() {
        assert_eq!(mean_abs_error(&[], &[]), 0.0);
    }
}
