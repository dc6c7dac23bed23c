//! Normal and foam grids for the renderer, recomputed in full each tick.

use crate::config::SimConfig;
use crate::store::FieldStore;
use glam::Vec3;

/// Rebuilds normals and foam from the store's current buffers.
pub fn update_derived(store: &mut FieldStore, config: &SimConfig) {
    let (height, velocity, normals, foam) = store.derived_mut();
    let (w, h) = height.dimensions();
    let k = config.normal_strength;

    for y in 0..h {
        for x in 0..w {
            let (xi, yi) = (x as isize, y as isize);
            let dx = (height.get_clamped(xi + 1, yi) - height.get_clamped(xi - 1, yi)) * 0.5;
            let dy = (height.get_clamped(xi, yi + 1) - height.get_clamped(xi, yi - 1)) * 0.5;
            normals.set(x, y, Vec3::new(-dx * k, -dy * k, 1.0).normalize());
        }
    }

    for (f, v) in foam.data_mut().iter_mut().zip(velocity.data()) {
        *f = foam_amount(v.length(), config);
    }
}

/// Foam coverage for a flow speed.
#[inline]
pub fn foam_amount(speed: f32, config: &SimConfig) -> f32 {
    ((speed - config.foam_velocity_threshold) * config.foam_intensity).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;

    #[test]
    fn flat_surface_points_straight_up() {
        let mut store = FieldStore::new(8, 8).unwrap();
        update_derived(&mut store, &SimConfig::default());
        assert!(store.normals().data().iter().all(|&n| n == Vec3::Z));
        assert!(store.foam().data().iter().all(|&f| f == 0.0));
    }

    #[test]
    fn slope_tilts_normal_downhill() {
        let mut store = FieldStore::new(8, 8).unwrap();
        // height rises with x
        for y in 0..8 {
            for x in 0..8 {
                store.height_mut().set(x, y, x as f32 * 0.1);
            }
        }
        update_derived(&mut store, &SimConfig::default());
        let n = store.normals().get(4, 4);
        assert!(n.x < 0.0);
        assert!(n.y.abs() < 1e-6);
        assert!(n.z > 0.0);
        assert!((n.length() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn normal_strength_exaggerates_slope() {
        let mut store = FieldStore::new(8, 8).unwrap();
        store.height_mut().set(5, 4, 0.2);
        let mild = SimConfig {
            normal_strength: 1.0,
            ..SimConfig::default()
        };
        update_derived(&mut store, &mild);
        let a = store.normals().get(4, 4);
        update_derived(&mut store, &SimConfig::default());
        let b = store.normals().get(4, 4);
        assert!(b.x.abs() > a.x.abs());
    }

    #[test]
    fn foam_needs_fast_flow() {
        let cfg = SimConfig::default();
        assert_eq!(foam_amount(0.0, &cfg), 0.0);
        assert_eq!(foam_amount(cfg.foam_velocity_threshold, &cfg), 0.0);
        let f = foam_amount(cfg.foam_velocity_threshold + 4.0, &cfg);
        assert!((f - 4.0 * cfg.foam_intensity).abs() < 1e-6);
        assert_eq!(foam_amount(1e6, &cfg), 1.0);
    }

    #[test]
    fn foam_follows_current_velocity() {
        let mut store = FieldStore::new(4, 4).unwrap();
        store.current_mut().1.set(2, 1, Vec2::new(30.0, 0.0));
        update_derived(&mut store, &SimConfig::default());
        assert!(store.foam().get(2, 1) > 0.0);
        assert_eq!(store.foam().get(0, 0), 0.0);
    }
}
