//! Perturbation iteration for a single pixel.
//!
//! Given the reference orbit Z and a pixel offset δc from the center,
//! iterates the delta recurrence
//!
//! ```text
//! δz' = 2·Z_m·δz + δz² + δc
//! ```
//!
//! entirely in f64. The full pixel value z = Z_m + δz is tested against
//! the escape radius; when the perturbation outgrows the base point the
//! pixel is rebased onto its own orbit (δz ← z, m ← 0), which is the
//! glitch-recovery mechanism of this renderer.

use deepbrot_core::MandelbrotData;

/// Iterate one pixel against a reference orbit.
///
/// `escape_radius_sq` is the conventional R² pixel threshold, not the
/// orbit-side R⁴ slack bound. When the reference escaped early the orbit
/// index clamps at the last sample, which keeps the recurrence and the
/// escape test running on an asymptotic tail.
pub fn iterate_pixel(
    samples: &[(f64, f64)],
    delta_c: (f64, f64),
    max_iter: u32,
    escape_radius_sq: f64,
) -> MandelbrotData {
    if samples.is_empty() {
        return MandelbrotData::interior(max_iter, 0);
    }

    let len = samples.len();
    let mut dz = (0.0_f64, 0.0_f64);
    // m = reference orbit index
    let mut m: usize = 0;
    let mut rebases = 0u32;

    for n in 0..max_iter {
        let (x, y) = samples[m];

        // δz' = 2·Z_m·δz + δz² + δc, complex parts expanded
        let t_re = 2.0 * (x * dz.0 - y * dz.1);
        let t_im = 2.0 * (x * dz.1 + y * dz.0);
        let d_re = dz.0 * dz.0 - dz.1 * dz.1;
        let d_im = 2.0 * dz.0 * dz.1;
        dz = (t_re + d_re + delta_c.0, t_im + d_im + delta_c.1);

        // Advance along the reference, clamping at the last sample once
        // a short (escaped) orbit is exhausted
        if m + 1 < len {
            m += 1;
        }

        let (rx, ry) = samples[m];
        let z = (rx + dz.0, ry + dz.1);
        let z_norm_sq = z.0 * z.0 + z.1 * z.1;

        if z_norm_sq > escape_radius_sq {
            return MandelbrotData {
                iterations: n,
                max_iterations: max_iter,
                escaped: true,
                final_norm_sq: z_norm_sq,
                rebases,
            };
        }

        // Rebase: the perturbation outgrew the base point, so the orbit
        // no longer shares the pixel's regime
        let dz_norm_sq = dz.0 * dz.0 + dz.1 * dz.1;
        if dz_norm_sq > z_norm_sq {
            dz = z;
            m = 0;
            rebases += 1;
        }
    }

    MandelbrotData::interior(max_iter, rebases)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::Generation;
    use crate::orbit::ReferenceOrbit;
    use deepbrot_core::BigFloat;

    const R: f64 = 1e6;
    const R_SQ: f64 = 1e12;

    fn reference(re: f64, im: f64, max_iter: u32) -> ReferenceOrbit {
        let gen = Generation::new();
        let center = (
            BigFloat::with_precision(re, 1024),
            BigFloat::with_precision(im, 1024),
        );
        ReferenceOrbit::compute(&center, max_iter, gen.current(), &gen, R).unwrap()
    }

    /// Plain f64 escape iteration with the same counting convention as
    /// the kernel: step n computes z_{n+1} and reports n on escape.
    fn iterate_direct(c: (f64, f64), max_iter: u32) -> (u32, bool) {
        let mut z = (0.0_f64, 0.0_f64);
        for n in 0..max_iter {
            z = (z.0 * z.0 - z.1 * z.1 + c.0, 2.0 * z.0 * z.1 + c.1);
            if z.0 * z.0 + z.1 * z.1 > R_SQ {
                return (n, true);
            }
        }
        (max_iter, false)
    }

    #[test]
    fn pixel_at_reference_is_interior() {
        let orbit = reference(-0.75, 0.0, 64);
        let result = iterate_pixel(&orbit.samples, (0.0, 0.0), 64, R_SQ);
        assert!(!result.escaped);
        assert_eq!(result.iterations, 64);
    }

    #[test]
    fn far_offset_escapes_quickly() {
        let orbit = reference(-0.75, 0.0, 64);
        // Pixel at (2, 0)
        let result = iterate_pixel(&orbit.samples, (2.75, 0.0), 64, R_SQ);
        assert!(result.escaped);
        assert!(result.iterations < 10);
        assert!(result.final_norm_sq > R_SQ);
    }

    #[test]
    fn iteration_counts_match_direct_iteration() {
        let orbit = reference(-0.75, 0.0, 256);
        for &(dx, dy) in &[(1.26, 0.0), (1.75, 0.0), (1.10, 0.3), (1.26, 0.5)] {
            let result = iterate_pixel(&orbit.samples, (dx, dy), 256, R_SQ);
            let (direct_n, direct_escaped) = iterate_direct((-0.75 + dx, dy), 256);

            assert_eq!(result.escaped, direct_escaped, "delta ({dx}, {dy})");
            if result.escaped {
                let diff = result.iterations as i64 - direct_n as i64;
                assert!(diff.abs() <= 1, "delta ({dx}, {dy}): {diff}");
            }
        }
    }

    #[test]
    fn rebase_fires_when_pixel_orbit_shrinks_below_reference() {
        // Reference oscillates with |Z| ≳ 0.18; the pixel at (0.01, 0)
        // stays near the origin, so δz ≈ −Z outgrows z immediately.
        let orbit = reference(-0.75, 0.0, 128);
        let result = iterate_pixel(&orbit.samples, (0.76, 0.0), 128, R_SQ);

        assert!(!result.escaped);
        assert_eq!(result.iterations, 128);
        assert!(result.rebases > 0, "rebase path never executed");
    }

    #[test]
    fn rebased_pixel_matches_direct_iteration() {
        let orbit = reference(-0.75, 0.0, 256);
        // Pixel at (0.29, 0): escapes after a long interior-looking run
        let result = iterate_pixel(&orbit.samples, (1.04, 0.0), 256, R_SQ);
        let (direct_n, direct_escaped) = iterate_direct((0.29, 0.0), 256);

        assert_eq!(result.escaped, direct_escaped);
        if result.escaped {
            assert!((result.iterations as i64 - direct_n as i64).abs() <= 1);
        }
    }

    #[test]
    fn clamped_tail_still_applies_the_escape_test() {
        // A truncated all-zero reference clamps from step 3 onward; with
        // Z ≡ 0 the delta recurrence collapses to the plain iteration of
        // c = δc, so the clamped tail must reproduce it exactly.
        let samples = [(0.0, 0.0); 4];
        let result = iterate_pixel(&samples, (0.5, 0.5), 64, R_SQ);
        let (direct_n, direct_escaped) = iterate_direct((0.5, 0.5), 64);

        assert!(direct_escaped);
        assert!(result.escaped, "clamped tail never escaped");
        assert_eq!(result.iterations, direct_n);
        assert_eq!(result.rebases, 0);
    }

    #[test]
    fn pixel_escapes_at_end_of_short_reference() {
        // c = 0.3 escapes, so its orbit terminates early under the slack
        // bound; a pixel riding alongside it escapes on the same step.
        let orbit = reference(0.3, 0.0, 512);
        assert!(orbit.len() < 512, "reference unexpectedly interior");

        let result = iterate_pixel(&orbit.samples, (1e-4, 0.0), 512, R_SQ);
        let (direct_n, direct_escaped) = iterate_direct((0.3 + 1e-4, 0.0), 512);

        assert_eq!(result.escaped, direct_escaped);
        assert!((result.iterations as i64 - direct_n as i64).abs() <= 1);
    }

    #[test]
    fn interior_pixel_against_short_reference_reaches_max_iter() {
        // Short escaped reference, pixel back inside the set
        let orbit = reference(0.3, 0.0, 512);
        let result = iterate_pixel(&orbit.samples, (-1.3, 0.0), 512, R_SQ);
        assert!(!result.escaped);
        assert_eq!(result.iterations, 512);
    }

    #[test]
    fn empty_orbit_degenerates_to_interior() {
        let result = iterate_pixel(&[], (0.5, 0.5), 64, R_SQ);
        assert!(!result.escaped);
        assert_eq!(result.iterations, 64);
    }

    #[test]
    fn fabricated_orbit_triggers_single_rebase() {
        // Hand-built samples: Z₁ = −1 pulls z to 0.01 while δz stays at
        // 0.3-ish, forcing |δz|² > |z|² on the second step.
        let samples = [(0.0, 0.0), (-1.0, 0.0), (0.05, 0.0), (0.0, 0.0)];
        let result = iterate_pixel(&samples, (0.3, 0.0), 3, R_SQ);
        assert!(result.rebases >= 1);
    }
}
