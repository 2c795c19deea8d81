use encore_domain_chart::MedleyWindow;
use encore_ports::types::Millis;

/// Linear interpolation from `from` to `to` over `total_millis`.
pub fn interpolate(from: f32, to: f32, elapsed_millis: Millis, total_millis: Millis) -> f32 {
    if total_millis <= 0.0 {
        return to;
    }
    let t = (elapsed_millis / total_millis).clamp(0.0, 1.0) as f32;
    from + (to - from) * t
}

pub fn fade_in(elapsed_millis: Millis, total_millis: Millis) -> f32 {
    interpolate(0.0, 1.0, elapsed_millis, total_millis)
}

pub fn fade_out(remaining_millis: Millis, total_millis: Millis) -> f32 {
    interpolate(0.0, 1.0, remaining_millis, total_millis)
}

/// Volume factor for a medley: ramps up from the countdown start and down
/// towards the window end.
pub fn medley_fade(
    window: &MedleyWindow,
    position_millis: Millis,
    fade_in_millis: Millis,
    fade_out_millis: Millis,
) -> f32 {
    let rising = fade_in(position_millis - window.start_with_countdown_millis, fade_in_millis);
    let falling = fade_out(window.end_millis - position_millis, fade_out_millis);
    rising.min(falling)
}
