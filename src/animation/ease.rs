/// Cubic ease-in-out applied to the local progress between two keyframes.
///
/// `p` is clamped to `[0, 1]`; both endpoints are fixed and the curve is symmetric about 0.5.
pub fn ease_in_out_cubic(p: f64) -> f64 {
    let p = p.clamp(0.0, 1.0);
    if p < 0.5 {
        4.0 * p * p * p
    } else {
        1.0 - (-2.0 * p + 2.0).powi(3) / 2.0
    }
}
