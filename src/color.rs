use glam::DVec3;

/// Linear-light color. Accumulated raw over all samples of a pixel; the sink
/// resolves it to display RGB with [`resolve_rgb8`].
pub type Color = DVec3;

pub const BLACK: Color = DVec3::ZERO;
pub const WHITE: Color = DVec3::ONE;

pub fn color(r: f64, g: f64, b: f64) -> Color {
    DVec3::new(r, g, b)
}

/// Resolve an accumulated sample sum to an 8-bit RGB triple: average over
/// `samples`, gamma-correct (gamma 2), clamp to [0, 0.999], scale by 256.
pub fn resolve_rgb8(accumulated: Color, samples: u32) -> [u8; 3] {
    let scale = 1.0 / samples as f64;
    let channel = |c: f64| (256.0 * (c * scale).max(0.0).sqrt().clamp(0.0, 0.999)) as u8;
    [
        channel(accumulated.x),
        channel(accumulated.y),
        channel(accumulated.z),
    ]
}
