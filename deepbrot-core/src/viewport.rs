use crate::bigfloat::ParseError;
use crate::config::{RenderConfig, MIN_ITERATIONS};
use crate::BigFloat;
use serde::{Deserialize, Serialize};

/// The viewed region in fractal space.
///
/// `center` and `scale` are arbitrary precision so the view stays
/// well-defined far beyond f64 resolution; `scale` is the world-space
/// distance covered by one pixel. Pixel dimensions are fixed for the
/// lifetime of a session.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Viewport {
    pub center: (BigFloat, BigFloat),
    pub scale: BigFloat,
    pub width: u32,
    pub height: u32,
    pub max_iter: u32,
}

impl Viewport {
    /// The default view: the whole set centered on (-0.75, 0).
    pub fn new(config: &RenderConfig) -> Self {
        Self {
            center: (
                BigFloat::with_precision(-0.75, config.precision_bits),
                BigFloat::zero(config.precision_bits),
            ),
            scale: BigFloat::with_precision(0.005, config.precision_bits),
            width: config.width,
            height: config.height,
            max_iter: config.initial_max_iter,
        }
    }

    /// Create a viewport from decimal-string coordinates (for deep-zoom
    /// positions that exceed f64 precision).
    pub fn from_strings(
        center_re: &str,
        center_im: &str,
        scale: &str,
        config: &RenderConfig,
    ) -> Result<Self, ParseError> {
        Ok(Self {
            center: (
                BigFloat::from_string(center_re, config.precision_bits)?,
                BigFloat::from_string(center_im, config.precision_bits)?,
            ),
            scale: BigFloat::from_string(scale, config.precision_bits)?,
            width: config.width,
            height: config.height,
            max_iter: config.initial_max_iter,
        })
    }

    pub fn precision_bits(&self) -> usize {
        self.scale.precision_bits()
    }

    /// The world point under a pixel, in full precision.
    pub fn world_at(&self, px: f64, py: f64) -> (BigFloat, BigFloat) {
        let bits = self.precision_bits();
        let dx = BigFloat::with_precision(px - self.width as f64 / 2.0, bits);
        let dy = BigFloat::with_precision(py - self.height as f64 / 2.0, bits);
        (
            self.center.0.add(&dx.mul(&self.scale)),
            self.center.1.add(&dy.mul(&self.scale)),
        )
    }

    /// Zoom by `factor` keeping the world point under the cursor fixed.
    ///
    /// The cursor's world point is located with the old scale and the new
    /// center is re-derived with the new scale, entirely in high
    /// precision, so anchoring stays pixel-accurate at any depth.
    pub fn zoom_at(&mut self, cursor_x: f64, cursor_y: f64, factor: f64) {
        debug_assert!(factor > 0.0);
        let bits = self.precision_bits();
        let dx = BigFloat::with_precision(cursor_x - self.width as f64 / 2.0, bits);
        let dy = BigFloat::with_precision(cursor_y - self.height as f64 / 2.0, bits);

        let new_scale = self.scale.mul_f64(factor);
        let (re_before, im_before) = self.world_at(cursor_x, cursor_y);

        self.center.0 = re_before.sub(&dx.mul(&new_scale));
        self.center.1 = im_before.sub(&dy.mul(&new_scale));
        self.scale = new_scale;
    }

    /// Pan by a pixel offset, in full precision.
    pub fn pan(&mut self, dx_px: f64, dy_px: f64) {
        let bits = self.precision_bits();
        let dx = BigFloat::with_precision(dx_px, bits);
        let dy = BigFloat::with_precision(dy_px, bits);
        self.center.0 = self.center.0.add(&dx.mul(&self.scale));
        self.center.1 = self.center.1.add(&dy.mul(&self.scale));
    }

    pub fn double_iterations(&mut self) {
        self.max_iter = self.max_iter.saturating_mul(2);
    }

    /// Halve the iteration limit, never dropping below the floor of 64.
    pub fn halve_iterations(&mut self) {
        self.max_iter = (self.max_iter / 2).max(MIN_ITERATIONS);
    }

    /// The lossy per-task scale. Underflows to 0.0 once the zoom passes
    /// f64 resolution; this is the accepted precision ceiling of the
    /// pixel stage, not an error.
    pub fn scale_f64(&self) -> f64 {
        self.scale.to_f64()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn default_viewport() -> Viewport {
        Viewport::new(&RenderConfig::default())
    }

    #[test]
    fn default_view_matches_reference() {
        let vp = default_viewport();
        assert_eq!(vp.center.0.to_f64(), -0.75);
        assert_eq!(vp.center.1.to_f64(), 0.0);
        assert_eq!(vp.scale_f64(), 0.005);
        assert_eq!(vp.max_iter, 64);
        assert_eq!((vp.width, vp.height), (800, 600));
    }

    #[test]
    fn zoom_at_center_keeps_center() {
        let mut vp = default_viewport();
        let before = vp.center.clone();
        vp.zoom_at(400.0, 300.0, 0.75);
        assert_eq!(vp.center.0, before.0);
        assert_eq!(vp.center.1, before.1);
        assert!((vp.scale_f64() - 0.00375).abs() < 1e-15);
    }

    #[test]
    fn zoom_preserves_world_point_under_cursor() {
        let mut vp = default_viewport();
        let (cx, cy) = (123.0, 456.0);
        let before = vp.world_at(cx, cy);
        vp.zoom_at(cx, cy, 0.75);
        let after = vp.world_at(cx, cy);

        // Anchoring within one (new-scale) pixel
        assert!(after.0.sub(&before.0).abs() < vp.scale);
        assert!(after.1.sub(&before.1).abs() < vp.scale);
    }

    #[test]
    fn zoom_in_out_with_inverse_factors_round_trips_exactly() {
        let mut vp = default_viewport();
        let center_before = vp.center.clone();
        let scale_before = vp.scale.clone();

        // Dyadic factors make the round trip exact in binary arithmetic
        vp.zoom_at(123.0, 456.0, 0.5);
        vp.zoom_at(123.0, 456.0, 2.0);

        assert_eq!(vp.center.0, center_before.0);
        assert_eq!(vp.center.1, center_before.1);
        assert_eq!(vp.scale, scale_before);
    }

    #[test]
    fn zoom_anchoring_survives_deep_scale() {
        let cfg = RenderConfig::default();
        let mut vp = Viewport::from_strings(
            "-0.743643887037158704752191506114774",
            "0.131825904205311970493132056385139",
            "1e-40",
            &cfg,
        )
        .unwrap();

        let before = vp.world_at(10.0, 20.0);
        vp.zoom_at(10.0, 20.0, 0.75);
        let after = vp.world_at(10.0, 20.0);

        assert!(after.0.sub(&before.0).abs() < vp.scale);
        assert!(after.1.sub(&before.1).abs() < vp.scale);
    }

    #[test]
    fn pan_moves_center_by_pixel_offsets() {
        let mut vp = default_viewport();
        vp.pan(100.0, -50.0);
        assert!((vp.center.0.to_f64() - (-0.75 + 100.0 * 0.005)).abs() < 1e-12);
        assert!((vp.center.1.to_f64() - (-50.0 * 0.005)).abs() < 1e-12);
    }

    #[test]
    fn iteration_limit_doubles_and_floors_at_64() {
        let mut vp = default_viewport();
        vp.double_iterations();
        assert_eq!(vp.max_iter, 128);
        vp.halve_iterations();
        assert_eq!(vp.max_iter, 64);
        vp.halve_iterations();
        vp.halve_iterations();
        assert_eq!(vp.max_iter, 64);
    }
}
