//! Microsecond-scale pauses.
//!
//! tokio's timer wheel has millisecond resolution, so a bare
//! `tokio::time::sleep` turns a 20 µs pause into 1-2 ms. Short pauses (and
//! the tail of long ones) are finished by yielding until a monotonic deadline.

use std::time::{Duration, Instant};

use rand::Rng;

/// Below this, the timer wheel is not used at all.
const SPIN_THRESHOLD: Duration = Duration::from_millis(1);

/// Suspend the current task for `delay` with microsecond precision.
///
/// The final millisecond is spent yielding to the scheduler rather
/// than parked on the timer, so other tasks keep running on this thread.
pub async fn precise_sleep(delay: Duration) {
    let deadline = Instant::now() + delay;
    if delay > SPIN_THRESHOLD {
        tokio::time::sleep(delay - SPIN_THRESHOLD).await;
    }
    while Instant::now() < deadline {
        tokio::task::yield_now().await;
    }
}

/// Uniform delay in `[-bound, +bound]` microseconds; non-positive draws
/// mean no delay.
pub fn jitter_delay(bound_us: u64) -> Option<Duration> {
    if bound_us == 0 {
        return None;
    }
    let bound = i64::try_from(bound_us).unwrap_or(i64::MAX);
    let us = rand::thread_rng().gen_range(-bound..=bound);
    (us > 0).then(|| Duration::from_micros(us.unsigned_abs()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jitter_bounds() {
        assert_eq!(jitter_delay(0), None);
        for _ in 0..1000 {
            if let Some(delay) = jitter_delay(50) {
                assert!(delay > Duration::ZERO);
                assert!(delay <= Duration::from_micros(50));
            }
        }
        // Roughly half the draws are non-positive.
        let delayed = (0..1000).filter(|_| jitter_delay(1000).is_some()).count();
        assert!(delayed > 300 && delayed < 700, "{delayed}");
    }

    #[tokio::test]
    async fn test_sub_millisecond_sleep() {
        let mut best = Duration::MAX;
        for _ in 0..20 {
            let start = Instant::now();
            precise_sleep(Duration::from_micros(20)).await;
            let took = start.elapsed();
            assert!(took >= Duration::from_micros(20), "{took:?}");
            best = best.min(took);
        }
        assert!(best < Duration::from_micros(500), "{best:?}");
    }

    #[tokio::test]
    async fn test_jitter_shifts_by_drawn_delay() {
        // Same draw-then-pause sequence a worker runs before its trigger byte.
        let mut overshoots = Vec::new();
        for _ in 0..200 {
            let Some(delay) = jitter_delay(400) else {
                continue;
            };
            let start = Instant::now();
            precise_sleep(delay).await;
            let took = start.elapsed();
            assert!(took >= delay, "{took:?} < {delay:?}");
            overshoots.push(took - delay);
        }
        assert!(overshoots.len() > 50, "{}", overshoots.len());

        // Delays land near the draw, not on the next timer tick.
        overshoots.sort();
        let median = overshoots[overshoots.len() / 2];
        assert!(median < Duration::from_micros(300), "{median:?}");
    }

    #[tokio::test]
    async fn test_long_sleep_keeps_deadline() {
        let start = Instant::now();
        precise_sleep(Duration::from_micros(3_250)).await;
        let took = start.elapsed();
        assert!(took >= Duration::from_micros(3_250), "{took:?}");
        assert!(took < Duration::from_millis(20), "{took:?}");
    }

    #[tokio::test]
    async fn test_zero_sleep_returns_immediately() {
        let start = Instant::now();
        precise_sleep(Duration::ZERO).await;
        assert!(start.elapsed() < Duration::from_millis(1));
    }
}
