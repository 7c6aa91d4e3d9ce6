//! Fixed timestep accumulator
//!
//! Turns variable real frame times into a deterministic stream of fixed
//! `SIM_DT` ticks. Real time is accumulated in integer nanoseconds scaled by
//! the tick rate, so the tick count depends only on the total time fed in and
//! never on how it was chunked.

use std::time::Duration;

use crate::consts::{MAX_SUBSTEPS, SIM_DT, TICK_RATE};

const NANOS_PER_SEC: u128 = 1_000_000_000;

/// One fixed simulation step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tick {
    /// Monotonic tick number since the timebase was created
    pub index: u64,
    /// Step length in seconds (always `SIM_DT`)
    pub dt: f32,
}

/// Fixed-timestep accumulator
#[derive(Debug, Clone)]
pub struct Timebase {
    /// Leftover real time in nanoseconds x tick rate; one tick == `NANOS_PER_SEC`
    accumulator: u128,
    max_ticks_per_call: u32,
    next_index: u64,
    dropped_ticks: u64,
}

impl Default for Timebase {
    fn default() -> Self {
        Self::new(MAX_SUBSTEPS)
    }
}

impl Timebase {
    pub fn new(max_ticks_per_call: u32) -> Self {
        Self {
            accumulator: 0,
            max_ticks_per_call: max_ticks_per_call.max(1),
            next_index: 0,
            dropped_ticks: 0,
        }
    }

    /// Feed real elapsed time; returns the ticks to simulate this frame
    pub fn advance(&mut self, real_delta: Duration) -> Ticks {
        self.accumulator += real_delta.as_nanos() * u128::from(TICK_RATE);

        let available = self.accumulator / NANOS_PER_SEC;
        let count = available.min(u128::from(self.max_ticks_per_call));
        let dropped = available - count;

        // Whole ticks past the cap are discarded; the sub-tick remainder stays.
        self.accumulator %= NANOS_PER_SEC;
        if dropped > 0 {
            let dropped = u64::try_from(dropped).unwrap_or(u64::MAX);
            self.dropped_ticks = self.dropped_ticks.saturating_add(dropped);
            log::debug!("Frame stall: dropped {} ticks", dropped);
        }

        let ticks = Ticks {
            next_index: self.next_index,
            remaining: count as u32,
        };
        self.next_index += count as u64;
        ticks
    }

    /// Feed real elapsed time in seconds; negative or non-finite input counts as zero
    pub fn advance_secs(&mut self, secs: f64) -> Ticks {
        let delta = Duration::try_from_secs_f64(secs).unwrap_or(Duration::ZERO);
        self.advance(delta)
    }

    /// Fraction of the next tick already accumulated (for render interpolation)
    pub fn pending_fraction(&self) -> f32 {
        self.accumulator as f32 / NANOS_PER_SEC as f32
    }

    /// Total ticks handed out so far
    pub fn total_ticks(&self) -> u64 {
        self.next_index
    }

    /// Ticks discarded by the per-call cap
    pub fn dropped_ticks(&self) -> u64 {
        self.dropped_ticks
    }
}

/// Lazy sequence of ticks produced by one `Timebase::advance` call
#[derive(Debug, Clone)]
pub struct Ticks {
    next_index: u64,
    remaining: u32,
}

impl Iterator for Ticks {
    type Item = Tick;

    fn next(&mut self) -> Option<Tick> {
        if self.remaining == 0 {
            return None;
        }
        let tick = Tick {
            index: self.next_index,
            dt: SIM_DT,
        };
        self.next_index += 1;
        self.remaining -= 1;
        Some(tick)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining as usize, Some(self.remaining as usize))
    }
}

impl ExactSizeIterator for Ticks {}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn expected_ticks(total_nanos: u64) -> u64 {
        (u128::from(total_nanos) * u128::from(TICK_RATE) / NANOS_PER_SEC) as u64
    }

    #[test]
    fn test_exact_frame_yields_one_tick() {
        let mut tb = Timebase::default();
        // 1/60s rounded up to whole nanoseconds
        let ticks: Vec<_> = tb.advance(Duration::from_nanos(16_666_667)).collect();
        assert_eq!(ticks.len(), 1);
        assert_eq!(ticks[0].index, 0);
        assert_eq!(ticks[0].dt, SIM_DT);
    }

    #[test]
    fn test_leftover_time_carries_over() {
        let mut tb = Timebase::default();
        assert_eq!(tb.advance(Duration::from_millis(10)).len(), 0);
        assert!(tb.pending_fraction() > 0.5);
        assert_eq!(tb.advance(Duration::from_millis(10)).len(), 1);
        assert_eq!(tb.total_ticks(), 1);
    }

    #[test]
    fn test_cap_drops_excess_ticks() {
        let mut tb = Timebase::default();
        // A one second stall would be 60 ticks
        let ticks = tb.advance(Duration::from_secs(1));
        assert_eq!(ticks.len(), MAX_SUBSTEPS as usize);
        assert_eq!(tb.dropped_ticks(), 60 - u64::from(MAX_SUBSTEPS));
        // Dropped ticks are not replayed next frame
        assert_eq!(tb.advance(Duration::ZERO).len(), 0);
    }

    #[test]
    fn test_huge_stall_saturates_dropped_count() {
        let mut tb = Timebase::default();
        assert_eq!(tb.advance(Duration::MAX).len(), MAX_SUBSTEPS as usize);
        assert_eq!(tb.dropped_ticks(), u64::MAX);
        assert_eq!(tb.advance(Duration::MAX).len(), MAX_SUBSTEPS as usize);
        assert_eq!(tb.dropped_ticks(), u64::MAX);
        assert_eq!(tb.total_ticks(), 2 * u64::from(MAX_SUBSTEPS));
    }

    #[test]
    fn test_tick_indices_are_contiguous() {
        let mut tb = Timebase::default();
        let mut indices = Vec::new();
        for _ in 0..10 {
            indices.extend(tb.advance(Duration::from_millis(33)).map(|t| t.index));
        }
        let expected: Vec<u64> = (0..indices.len() as u64).collect();
        assert_eq!(indices, expected);
    }

    #[test]
    fn test_invalid_seconds_count_as_zero() {
        let mut tb = Timebase::default();
        assert_eq!(tb.advance_secs(-1.0).len(), 0);
        assert_eq!(tb.advance_secs(f64::NAN).len(), 0);
        assert_eq!(tb.advance_secs(0.06).len(), 3);
    }

    proptest! {
        #[test]
        fn prop_tick_count_independent_of_chunking(
            deltas in prop::collection::vec(0u64..(1_000_000_000 / 60 * 5), 1..200)
        ) {
            // Every delta stays under the cap, so no ticks are dropped
            let total: u64 = deltas.iter().sum();

            let mut chunked = Timebase::default();
            let chunked_ticks: usize = deltas
                .iter()
                .map(|&d| chunked.advance(Duration::from_nanos(d)).count())
                .sum();

            prop_assert_eq!(chunked.dropped_ticks(), 0);
            prop_assert_eq!(chunked_ticks as u64, expected_ticks(total));
        }

        #[test]
        fn prop_same_deltas_same_tick_sequence(
            deltas in prop::collection::vec(0u64..200_000_000, 1..100)
        ) {
            let mut a = Timebase::default();
            let mut b = Timebase::default();
            for &d in &deltas {
                prop_assert_eq!(
                    a.advance(Duration::from_nanos(d)).len(),
                    b.advance(Duration::from_nanos(d)).len()
                );
            }
            prop_assert_eq!(a.dropped_ticks(), b.dropped_ticks());
        }
    }
}
