/// Linear interpolation between `min` and `max` with the factor clamped
/// to `[0, 1]`, so out-of-range curve factors can never overshoot the
/// configured volume bounds.
pub fn lerp(min: f32, max: f32, t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    min * (1.0 - t) + max * t
}
