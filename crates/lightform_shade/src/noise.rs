//! 2D procedural noise for the noise layer
//!
//! All functions are deterministic; lattice gradients come from an integer
//! hash rather than a permutation table. Lattice coordinates repeat every
//! [`PERIOD`] cells, so any finite input maps to a valid cell.

use glam::Vec2;

use lightform_scene::NoiseType;

/// Lattice period in cells
pub const PERIOD: i32 = 1 << 16;

/// Lattice index of a floored coordinate, in `[0, PERIOD)`
#[inline]
fn lattice(v: f32) -> i32 {
    let i = v.rem_euclid(PERIOD as f32) as i32;
    i.rem_euclid(PERIOD)
}

/// Neighbour of lattice index `i`, wrapped into `[0, PERIOD)`
#[inline]
fn step(i: i32, d: i32) -> i32 {
    (i + d).rem_euclid(PERIOD)
}

#[inline]
fn hash2(x: i32, y: i32) -> u32 {
    let mut h = (x as u32).wrapping_mul(0x8da6_b343) ^ (y as u32).wrapping_mul(0xd816_3841);
    h ^= h >> 13;
    h = h.wrapping_mul(0x85eb_ca6b);
    h ^= h >> 16;
    h
}

/// Unit gradient for a lattice point
#[inline]
fn gradient(x: i32, y: i32) -> Vec2 {
    let angle = (hash2(x, y) & 0xffff) as f32 / 65536.0 * std::f32::consts::TAU;
    Vec2::new(angle.cos(), angle.sin())
}

/// Point in `[0, 1)²` for a worley cell
#[inline]
fn feature_point(x: i32, y: i32) -> Vec2 {
    let h = hash2(x, y);
    Vec2::new((h & 0xffff) as f32 / 65536.0, (h >> 16) as f32 / 65536.0)
}

#[inline]
fn quintic(t: f32) -> f32 {
    t * t * t * (t * (t * 6.0 - 15.0) + 10.0)
}

/// Gradient noise, roughly in `[-1, 1]`
pub fn perlin(p: Vec2) -> f32 {
    let cell = p.floor();
    let f = p - cell;
    let (ix, iy) = (lattice(cell.x), lattice(cell.y));

    let dot = |dx: i32, dy: i32| gradient(step(ix, dx), step(iy, dy)).dot(f - Vec2::new(dx as f32, dy as f32));
    let (n00, n10, n01, n11) = (dot(0, 0), dot(1, 0), dot(0, 1), dot(1, 1));

    let u = quintic(f.x);
    let v = quintic(f.y);
    let nx0 = n00 + (n10 - n00) * u;
    let nx1 = n01 + (n11 - n01) * u;
    (nx0 + (nx1 - nx0) * v) * std::f32::consts::SQRT_2
}

/// Simplex noise, roughly in `[-1, 1]`
pub fn simplex(p: Vec2) -> f32 {
    const F2: f32 = 0.366_025_42; // (√3 - 1) / 2
    const G2: f32 = 0.211_324_87; // (3 - √3) / 6

    let s = (p.x + p.y) * F2;
    let i = (p.x + s).floor();
    let j = (p.y + s).floor();
    let t = (i + j) * G2;
    let x0 = p - Vec2::new(i - t, j - t);

    let (i1, j1) = if x0.x > x0.y { (1, 0) } else { (0, 1) };
    let x1 = x0 - Vec2::new(i1 as f32, j1 as f32) + Vec2::splat(G2);
    let x2 = x0 - Vec2::splat(1.0 - 2.0 * G2);

    let (ii, jj) = (lattice(i), lattice(j));
    let corner = |offset: Vec2, gx: i32, gy: i32| {
        let t = 0.5 - offset.length_squared();
        if t <= 0.0 {
            0.0
        } else {
            let t2 = t * t;
            t2 * t2 * gradient(gx, gy).dot(offset)
        }
    };

    let n = corner(x0, ii, jj) + corner(x1, step(ii, i1), step(jj, j1)) + corner(x2, step(ii, 1), step(jj, 1));
    (70.0 * n).clamp(-1.0, 1.0)
}

/// Distance to the nearest worley feature point, in `[0, ~1.5]`
pub fn cell(p: Vec2) -> f32 {
    let cell = p.floor();
    let f = p - cell;
    let (ix, iy) = (lattice(cell.x), lattice(cell.y));
    let mut nearest = f32::MAX;
    for dy in -1..=1 {
        for dx in -1..=1 {
            let feature = Vec2::new(dx as f32, dy as f32) + feature_point(step(ix, dx), step(iy, dy));
            nearest = nearest.min(feature.distance(f));
        }
    }
    nearest
}

/// Divergence-free curl of the perlin potential
pub fn curl(p: Vec2) -> Vec2 {
    const E: f32 = 1e-3;
    let dx = (perlin(p + Vec2::new(E, 0.0)) - perlin(p - Vec2::new(E, 0.0))) / (2.0 * E);
    let dy = (perlin(p + Vec2::new(0.0, E)) - perlin(p - Vec2::new(0.0, E))) / (2.0 * E);
    Vec2::new(dy, -dx)
}

/// Normalized noise value in `[0, 1]` for a panel UV
pub fn sample(kind: NoiseType, uv: Vec2, scale: f32) -> f32 {
    let p = uv * scale.max(0.0) * 4.0;
    let v = match kind {
        NoiseType::Perlin => perlin(p) * 0.5 + 0.5,
        NoiseType::Simplex => simplex(p) * 0.5 + 0.5,
        NoiseType::Cell => cell(p),
        NoiseType::Curl => {
            let c = curl(p);
            c.x.atan2(c.y) / std::f32::consts::TAU + 0.5
        }
    };
    v.clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid() -> impl Iterator<Item = Vec2> {
        (0..32).flat_map(|i| (0..32).map(move |j| Vec2::new(i as f32 * 0.173, j as f32 * 0.211)))
    }

    #[test]
    fn test_perlin_zero_on_lattice() {
        for i in -3..3 {
            assert!(perlin(Vec2::new(i as f32, 2.0)).abs() < 1e-6);
        }
    }

    #[test]
    fn test_ranges() {
        for p in grid() {
            assert!(perlin(p).abs() <= 1.01);
            assert!(simplex(p).abs() <= 1.0);
            assert!(cell(p) >= 0.0 && cell(p) < 1.5);
            assert!(curl(p).is_finite());
        }
    }

    #[test]
    fn test_sample_in_unit_range_and_varies() {
        for kind in [NoiseType::Perlin, NoiseType::Simplex, NoiseType::Cell, NoiseType::Curl] {
            let values: Vec<f32> = grid().map(|p| sample(kind, p * 0.1, 1.0)).collect();
            assert!(values.iter().all(|v| (0.0..=1.0).contains(v)), "{:?}", kind);
            let min = values.iter().cloned().fold(f32::MAX, f32::min);
            let max = values.iter().cloned().fold(f32::MIN, f32::max);
            assert!(max - min > 0.1, "{:?} is flat", kind);
        }
    }

    #[test]
    fn test_far_coordinates_stay_finite() {
        for p in [Vec2::splat(4e12), Vec2::new(-3e9, 2.5e10)] {
            assert!(perlin(p).is_finite());
            assert!(simplex(p).is_finite());
            assert!(cell(p).is_finite());
            assert!(curl(p).is_finite());
        }
    }

    #[test]
    fn test_lattice_wraps_seamlessly() {
        let p = Vec2::new(0.3, 0.6);
        let shifted = p + Vec2::new(PERIOD as f32, 0.0);
        assert!((perlin(p) - perlin(shifted)).abs() < 0.02);
        assert!((cell(p) - cell(shifted)).abs() < 0.02);
    }

    #[test]
    fn test_deterministic() {
        let p = Vec2::new(3.7, -1.2);
        assert_eq!(simplex(p), simplex(p));
        assert_eq!(cell(p), cell(p));
    }
}
