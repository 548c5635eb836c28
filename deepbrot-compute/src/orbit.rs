//! High-precision reference orbit.
//!
//! Iterates z → z² + c at the viewport center in BigFloat arithmetic and
//! stores each sample truncated to f64 for the perturbation stage.

use crate::generation::Generation;
use deepbrot_core::BigFloat;

/// A truncated reference orbit: the samples Z₀..Z_{len-1} as f64 pairs.
pub struct ReferenceOrbit {
    pub samples: Vec<(f64, f64)>,
    /// The generation the orbit was computed under.
    pub generation: u64,
}

impl ReferenceOrbit {
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Compute the orbit for `center`, stopping early once the orbit
    /// magnitude crosses the slack bound |z|² > R⁴.
    ///
    /// The bound is deliberately far looser than the pixel-side escape
    /// test (R², see the perturbation kernel) so the orbit keeps
    /// providing usable samples after the center itself has escaped.
    ///
    /// Checks the live generation between iterations and returns `None`
    /// on mismatch without publishing anything.
    pub fn compute(
        center: &(BigFloat, BigFloat),
        max_iter: u32,
        generation: u64,
        live: &Generation,
        escape_radius: f64,
    ) -> Option<Self> {
        let bits = center.0.precision_bits();
        let escape_radius_sq = escape_radius * escape_radius;
        let slack_bound =
            BigFloat::with_precision(escape_radius_sq * escape_radius_sq, bits);

        let mut samples = Vec::with_capacity(max_iter as usize);
        let mut zx = BigFloat::zero(bits);
        let mut zy = BigFloat::zero(bits);

        for _ in 0..max_iter {
            if !live.is_current(generation) {
                return None;
            }

            samples.push((zx.to_f64(), zy.to_f64()));

            // z = z² + c
            let xx = zx.mul(&zx);
            let yy = zy.mul(&zy);
            let new_x = xx.sub(&yy).add(&center.0);
            let new_y = zx.mul(&zy).mul_f64(2.0).add(&center.1);
            zx = new_x;
            zy = new_y;

            let norm_sq = zx.mul(&zx).add(&zy.mul(&zy));
            if norm_sq.gt(&slack_bound) {
                break;
            }
        }

        Some(Self {
            samples,
            generation,
        })
    }
}
