//! PNG preview of a water surface.
//!
//! Height picks a colour between a deep trough and a bright crest, the
//! derived normals add simple diffuse lighting, and foam blends towards
//! white. The height range auto-scales to the current maximum so quiet and
//! stormy surfaces both stay readable.

use glam::Vec3;
use ripple_core::SimError;
use ripple_water::WaterSurface;
use std::path::Path;

const TROUGH: Vec3 = Vec3::new(8.0, 34.0, 78.0);
const CREST: Vec3 = Vec3::new(96.0, 184.0, 232.0);
const FOAM: Vec3 = Vec3::splat(250.0);
/// Heights below this are treated as still water when scaling.
const MIN_SCALE: f32 = 1e-3;
const AMBIENT: f32 = 0.55;

/// Renders the surface to an RGBA8 buffer of `width * height * 4` bytes.
pub fn surface_to_rgba(surface: &WaterSurface) -> Vec<u8> {
    let height = surface.height();
    let normals = surface.normals();
    let foam = surface.foam();
    let scale = height.max_abs().max(MIN_SCALE);
    let light = Vec3::new(-0.4, -0.5, 0.77).normalize();

    height
        .data()
        .iter()
        .zip(normals.data())
        .zip(foam.data())
        .flat_map(|((&h, &n), &f)| {
            let t = if h.is_finite() {
                (h / scale).clamp(-1.0, 1.0) * 0.5 + 0.5
            } else {
                0.5
            };
            let diffuse = n.dot(light).max(0.0);
            let lit = TROUGH.lerp(CREST, t) * (AMBIENT + (1.0 - AMBIENT) * diffuse);
            let c = lit.lerp(FOAM, f.clamp(0.0, 1.0)).clamp(Vec3::ZERO, Vec3::splat(255.0));
            [c.x.round() as u8, c.y.round() as u8, c.z.round() as u8, 255u8]
        })
        .collect()
}

/// Writes the surface as a PNG image.
///
/// Returns `SimError::InvalidDimensions` if the grid dimensions overflow
/// `u32`, or `SimError::Io` on write failure.
pub fn write_png(surface: &WaterSurface, path: &Path) -> Result<(), SimError> {
    let (w, h) = surface.dimensions();
    let rgba = surface_to_rgba(surface);
    let w = u32::try_from(w).map_err(|_| SimError::InvalidDimensions)?;
    let h = u32::try_from(h).map_err(|_| SimError::InvalidDimensions)?;
    let img = image::RgbaImage::from_raw(w, h, rgba)
        .ok_or_else(|| SimError::Io("RGBA buffer size mismatch".into()))?;
    img.save(path).map_err(|e| SimError::Io(e.to_string()))
}
