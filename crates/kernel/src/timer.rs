/// Rolling window of frame deltas, in seconds, for the stats overlay.
#[derive(Debug, Clone)]
pub struct FrameTimer {
    history: Vec<f32>,
    index: usize,
    filled: bool,
}

impl FrameTimer {
    pub fn new(capacity: usize) -> Self {
        Self {
            history: vec![0.0; capacity.max(1)],
            index: 0,
            filled: false,
        }
    }

    pub fn record(&mut self, dt: f32) {
        self.history[self.index] = dt;
        self.index = (self.index + 1) % self.history.len();
        if self.index == 0 {
            self.filled = true;
        }
    }

    /// Samples currently in the window.
    pub fn count(&self) -> usize {
        if self.filled {
            self.history.len()
        } else {
            self.index
        }
    }

    fn samples(&self) -> &[f32] {
        &self.history[..self.count()]
    }

    pub fn average(&self) -> f32 {
        let samples = self.samples();
        if samples.is_empty() {
            return 0.0;
        }
        samples.iter().sum::<f32>() / samples.len() as f32
    }

    pub fn max(&self) -> f32 {
        self.samples().iter().copied().reduce(f32::max).unwrap_or(0.0)
    }

    pub fn min(&self) -> f32 {
        self.samples().iter().copied().reduce(f32::min).unwrap_or(0.0)
    }

    /// Frames per second from the average delta; 0 with no samples.
    pub fn fps(&self) -> f32 {
        let avg = self.average();
        if avg > 0.0 { 1.0 / avg } else { 0.0 }
    }
}

impl Default for FrameTimer {
    fn default() -> Self {
        Self::new(120)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_timer_reports_zero() {
        let timer = FrameTimer::new(4);
        assert_eq!(timer.count(), 0);
        assert_eq!(timer.average(), 0.0);
        assert_eq!(timer.fps(), 0.0);
        assert_eq!(timer.max(), 0.0);
    }

    #[test]
    fn stats_over_partial_window() {
        let mut timer = FrameTimer::new(4);
        timer.record(0.01);
        timer.record(0.03);
        assert_eq!(timer.count(), 2);
        assert!((timer.average() - 0.02).abs() < 1e-6);
        assert!((timer.fps() - 50.0).abs() < 1e-3);
        assert_eq!(timer.min(), 0.01);
        assert_eq!(timer.max(), 0.03);
    }

    #[test]
    fn window_wraps() {
        let mut timer = FrameTimer::new(3);
        for dt in [1.0, 1.0, 1.0, 0.5, 0.5, 0.5] {
            timer.record(dt);
        }
        assert_eq!(timer.count(), 3);
        assert_eq!(timer.average(), 0.5);
    }
}
