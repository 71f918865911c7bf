//! Millisecond clock shared with the core timers

use embassy_time::{Duration, Instant};

/// Milliseconds since boot, wrapping
pub fn now_ms() -> u32 {
    Instant::now().as_millis() as u32
}

/// Instant at which a wrapping millisecond deadline is reached
///
/// Deadlines already in the past map to now.
pub fn instant_at(deadline_ms: u32) -> Instant {
    let now = Instant::now();
    let remaining = deadline_ms.wrapping_sub(now.as_millis() as u32) as i32;
    now + Duration::from_millis(remaining.max(0) as u64)
}
