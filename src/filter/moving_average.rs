use super::VectorFilter;
use crate::math::Vec3;
use std::collections::VecDeque;

/// Upper bound for interval-derived windows.
pub const MAX_WINDOW: usize = 1024;

/// Arithmetic mean over the most recent samples.
///
/// A symmetric window of `n` samples delays the signal by `(n - 1) / 2`
/// samples.
#[derive(Debug, Clone)]
pub struct MovingAverage {
    window: VecDeque<Vec3>,
    length: usize,
}

impl MovingAverage {
    pub fn new(length: usize) -> Self {
        let length = length.max(1);
        Self {
            window: VecDeque::with_capacity(length),
            length,
        }
    }

    /// Window sized for roughly half a second of delay at the given
    /// sampling interval, capped at [`MAX_WINDOW`].
    pub fn for_interval(interval_ms: f64) -> Self {
        if interval_ms > 0.0 {
            let samples = (1000.0 / interval_ms).round().min(MAX_WINDOW as f64) as usize;
            Self::new(samples.saturating_add(1).min(MAX_WINDOW))
        } else {
            Self::new(1)
        }
    }

    pub fn length(&self) -> usize {
        self.length
    }
}

impl VectorFilter for MovingAverage {
    fn apply(&mut self, v: &mut Vec3) {
        self.window.push_back(*v);
        if self.window.len() > self.length {
            self.window.pop_front();
        }

        let mut mean = [0.0; 3];
        for sample in &self.window {
            for i in 0..3 {
                mean[i] += sample[i];
            }
        }

        let n = self.window.len() as f64;
        for i in 0..3 {
            v[i] = mean[i] / n;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn averages_over_window() {
        let mut average = MovingAverage::new(3);
        let outputs: Vec<f64> = [3.0, 6.0, 9.0, 12.0]
            .iter()
            .map(|x| {
                let mut v = [*x, 0.0, 0.0];
                average.apply(&mut v);
                v[0]
            })
            .collect();
        assert_eq!(outputs, vec![3.0, 4.5, 6.0, 9.0]);
    }

    #[test]
    fn interval_sizes_window() {
        assert_eq!(MovingAverage::for_interval(50.0).length(), 21);
        assert_eq!(MovingAverage::for_interval(0.0).length(), 1);
    }

    #[test]
    fn tiny_intervals_cap_the_window() {
        assert_eq!(MovingAverage::for_interval(1e-30).length(), MAX_WINDOW);
        assert_eq!(MovingAverage::for_interval(0.0001).length(), MAX_WINDOW);
        assert_eq!(MovingAverage::for_interval(f64::MIN_POSITIVE).length(), MAX_WINDOW);
    }
}
