use std::collections::VecDeque;
use std::time::Duration;

const DEFAULT_WINDOW: usize = 120;

/// Rolling frame-time statistics for the fps readout.
#[derive(Debug, Clone)]
pub struct FrameStats {
    samples: VecDeque<Duration>,
    window: usize,
    total: Duration,
    frames: u64,
}

impl Default for FrameStats {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW)
    }
}

impl FrameStats {
    /// Keep the last `window` frame times (at least one).
    pub fn new(window: usize) -> Self {
        let window = window.max(1);
        Self {
            samples: VecDeque::with_capacity(window),
            window,
            total: Duration::ZERO,
            frames: 0,
        }
    }

    pub fn record(&mut self, frame_time: Duration) {
        if self.samples.len() == self.window {
            if let Some(old) = self.samples.pop_front() {
                self.total -= old;
            }
        }
        self.samples.push_back(frame_time);
        self.total += frame_time;
        self.frames += 1;
    }

    /// Mean frame time over the window in milliseconds.
    pub fn frame_ms(&self) -> f32 {
        if self.samples.is_empty() {
            return 0.0;
        }
        self.total.as_secs_f32() * 1000.0 / self.samples.len() as f32
    }

    pub fn fps(&self) -> f32 {
        let ms = self.frame_ms();
        if ms > 0.0 { 1000.0 / ms } else { 0.0 }
    }

    /// Slowest frame in the window, in milliseconds.
    pub fn worst_ms(&self) -> f32 {
        self.samples
            .iter()
            .max()
            .map_or(0.0, |d| d.as_secs_f32() * 1000.0)
    }

    /// Frames recorded since creation.
    pub fn frames(&self) -> u64 {
        self.frames
    }
}

impl std::fmt::Display for FrameStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.0} fps ({:.2} ms)", self.fps(), self.frame_ms())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_stats_read_zero() {
        let stats = FrameStats::default();
        assert_eq!(stats.fps(), 0.0);
        assert_eq!(stats.frame_ms(), 0.0);
        assert_eq!(stats.worst_ms(), 0.0);
    }

    #[test]
    fn averages_over_window() {
        let mut stats = FrameStats::new(2);
        stats.record(Duration::from_millis(100));
        stats.record(Duration::from_millis(10));
        stats.record(Duration::from_millis(30));
        assert!((stats.frame_ms() - 20.0).abs() < 1e-3);
        assert!((stats.fps() - 50.0).abs() < 1e-2);
        assert!((stats.worst_ms() - 30.0).abs() < 1e-3);
        assert_eq!(stats.frames(), 3);
    }

    #[test]
    fn display_shows_fps() {
        let mut stats = FrameStats::new(4);
        stats.record(Duration::from_millis(16));
        assert_eq!(stats.to_string(), "62 fps (16.00 ms)");
    }
}
