//! Deliberate delays: settle pauses after navigation and the randomized
//! sleep between product visits. These are anti-burst and render-settle
//! controls, kept apart from the condition waits in `browser::session`.

use rand::Rng;
use std::time::Duration;

/// Apply a 0.75x-1.25x jitter factor to a base duration.
pub fn jittered(base: Duration) -> Duration {
    let factor: f64 = rand::thread_rng().gen_range(0.75..=1.25);
    Duration::from_millis((base.as_millis() as f64 * factor) as u64)
}

/// Sleep for a jittered multiple of `base`. Used for post-navigation
/// settle pauses where there is no condition worth polling for.
pub fn settle(base: Duration) {
    std::thread::sleep(jittered(base));
}

/// Sleep for a random duration within `[min_ms, max_ms]` between product
/// visits. Reduces request burstiness; never a correctness wait.
pub fn between_products(min_ms: u64, max_ms: u64) {
    let (lo, hi) = if min_ms <= max_ms {
        (min_ms, max_ms)
    } else {
        (max_ms, min_ms)
    };

    let ms = rand::thread_rng().gen_range(lo..=hi);
    std::thread::sleep(Duration::from_millis(ms));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jitter_stays_in_bounds() {
        for _ in 0..200 {
            let delay = jittered(Duration::from_millis(1000));
            assert!(delay >= Duration::from_millis(750));
            assert!(delay <= Duration::from_millis(1250));
        }
    }

    #[test]
    fn test_jitter_of_zero_is_zero() {
        assert_eq!(jittered(Duration::ZERO), Duration::ZERO);
    }

    #[test]
    fn test_between_products_tolerates_swapped_bounds() {
        // Must not panic on an inverted range
        between_products(2, 1);
    }
}
