//! Random site sets (uniform in a box, replayable).
//!
//! Purpose
//! - Deterministic site samplers for tests, benchmarks and the CLI `generate`
//!   command. Uniform coordinates are in general position almost surely.
//!
//! Determinism uses a replay token `(seed, index)` mixed into a single RNG, so
//! the i-th draw of a batch can be reproduced on its own.

use nalgebra::Vector2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Axis-aligned sampling box.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds2 {
    pub min: Vector2<f64>,
    pub max: Vector2<f64>,
}

impl Bounds2 {
    pub fn new(min: Vector2<f64>, max: Vector2<f64>) -> Self {
        Self { min, max }
    }

    /// Square `[-half, half]²`.
    pub fn centered(half: f64) -> Self {
        Self::new(Vector2::new(-half, -half), Vector2::new(half, half))
    }

    /// Smallest box containing `points`; `None` for an empty slice.
    pub fn of_points(points: &[Vector2<f64>]) -> Option<Self> {
        let first = *points.first()?;
        let (min, max) = points.iter().fold((first, first), |(lo, hi), p| {
            (
                Vector2::new(lo.x.min(p.x), lo.y.min(p.y)),
                Vector2::new(hi.x.max(p.x), hi.y.max(p.y)),
            )
        });
        Some(Self { min, max })
    }

    /// Largest side length.
    pub fn extent(&self) -> f64 {
        (self.max.x - self.min.x).max(self.max.y - self.min.y)
    }

    pub fn contains(&self, p: Vector2<f64>) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }
}

impl Default for Bounds2 {
    fn default() -> Self {
        Self::centered(1.0)
    }
}

/// Replay token to make draws reproducible and indexable.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReplayToken {
    pub seed: u64,
    pub index: u64,
}

impl ReplayToken {
    #[inline]
    fn to_std_rng(self) -> StdRng {
        // SplitMix64-style mixing, cheap and stable.
        fn mix(mut x: u64) -> u64 {
            x ^= x >> 30;
            x = x.wrapping_mul(0xbf58476d1ce4e5b9);
            x ^= x >> 27;
            x = x.wrapping_mul(0x94d049bb133111eb);
            x ^ (x >> 31)
        }
        let k = mix(self.seed ^ mix(self.index.wrapping_add(0x9e3779b97f4a7c15)));
        StdRng::seed_from_u64(k)
    }
}

/// Draw `count` sites uniformly from `bounds`.
pub fn draw_sites_uniform(count: usize, bounds: Bounds2, tok: ReplayToken) -> Vec<Vector2<f64>> {
    let mut rng = tok.to_std_rng();
    let (lo, hi) = (bounds.min, bounds.max);
    (0..count)
        .map(|_| {
            let x = if hi.x > lo.x { rng.gen_range(lo.x..hi.x) } else { lo.x };
            let y = if hi.y > lo.y { rng.gen_range(lo.y..hi.y) } else { lo.y };
            Vector2::new(x, y)
        })
        .collect()
}

/// Convenience: `count` uniform sites in `bounds` for a plain seed.
pub fn uniform_sites(count: usize, bounds: Bounds2, seed: u64) -> Vec<Vector2<f64>> {
    draw_sites_uniform(count, bounds, ReplayToken { seed, index: 0 })
}
