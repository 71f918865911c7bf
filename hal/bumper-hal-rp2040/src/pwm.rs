//! PWM timing math
//!
//! The RP2040 PWM counter wraps at `top`; a channel output is high while
//! the counter is below its compare value. With the divider left at 1 the
//! output frequency is `SYS_CLK_HZ / (top + 1)`.

/// System clock frequency (RP2040 default)
pub const SYS_CLK_HZ: u32 = 125_000_000;

/// Default motor PWM frequency
pub const MOTOR_PWM_FREQ_HZ: u32 = 10_000;

/// Counter wrap value for a target frequency (divider 1)
///
/// Clamped to the 16-bit counter; frequencies too low for an undivided
/// counter get the slowest available wrap.
pub fn top_for_frequency(freq_hz: u32) -> u16 {
    if freq_hz == 0 {
        return u16::MAX;
    }
    let ticks = SYS_CLK_HZ / freq_hz;
    ticks.saturating_sub(1).clamp(1, u16::MAX as u32) as u16
}

/// Compare value for a duty cycle in [0, 1]
///
/// Out-of-range and NaN duties saturate to off or fully on. A duty of 1.0
/// maps to `top + 1` so the output never drops low.
pub fn duty_to_compare(duty: f32, top: u16) -> u16 {
    if duty.is_nan() || duty <= 0.0 {
        return 0;
    }
    let span = top as u32 + 1;
    if duty >= 1.0 {
        return span.min(u16::MAX as u32) as u16;
    }
    ((duty * span as f32) + 0.5) as u16
}
