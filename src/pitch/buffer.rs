use std::collections::VecDeque;

/// A detector reading, stamped with the wall-clock time it arrived.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrequencySample {
    /// Hz
    pub frequency: f64,
    /// Detector confidence, 0.0-1.0
    pub clarity: f64,
    /// Monotonic wall-clock milliseconds
    pub time: u64,
}

/// Samples in arrival order. Memory is bounded only by eviction.
#[derive(Debug, Default)]
pub struct FrequencyBuffer {
    samples: VecDeque<FrequencySample>,
}

impl FrequencyBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a sample. Callers push in non-decreasing time order; the
    /// buffer never re-sorts.
    pub fn push(&mut self, sample: FrequencySample) {
        self.samples.push_back(sample);
    }

    /// Drop every sample with `time < cutoff` and return how many went.
    pub fn evict_older_than(&mut self, cutoff: u64) -> usize {
        let before = self.samples.len();
        self.samples.retain(|s| s.time >= cutoff);
        before - self.samples.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FrequencySample> {
        self.samples.iter()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(time: u64) -> FrequencySample {
        FrequencySample {
            frequency: 440.0,
            clarity: 1.0,
            time,
        }
    }

    #[test]
    fn eviction_keeps_exactly_the_recent_samples() {
        let mut buffer = FrequencyBuffer::new();
        for t in [0, 10, 10, 20, 35, 50, 50, 80] {
            buffer.push(sample(t));
        }

        let removed = buffer.evict_older_than(35);
        assert_eq!(removed, 4);
        let times: Vec<u64> = buffer.iter().map(|s| s.time).collect();
        assert_eq!(times, vec![35, 50, 50, 80]);
    }

    #[test]
    fn eviction_handles_out_of_order_pushes() {
        let mut buffer = FrequencyBuffer::new();
        for t in [5, 100, 3, 200, 50] {
            buffer.push(sample(t));
        }
        buffer.evict_older_than(50);
        assert!(buffer.iter().all(|s| s.time >= 50));
        assert_eq!(buffer.len(), 3);
    }

    #[test]
    fn ties_keep_arrival_order() {
        let mut buffer = FrequencyBuffer::new();
        buffer.push(FrequencySample { frequency: 100.0, clarity: 1.0, time: 7 });
        buffer.push(FrequencySample { frequency: 200.0, clarity: 1.0, time: 7 });
        let freqs: Vec<f64> = buffer.iter().map(|s| s.frequency).collect();
        assert_eq!(freqs, vec![100.0, 200.0]);
    }

    #[test]
    fn evicting_empty_buffer() {
        let mut buffer = FrequencyBuffer::new();
        assert_eq!(buffer.evict_older_than(1_000), 0);
        assert!(buffer.is_empty());
    }
}
