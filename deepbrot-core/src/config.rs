//! Render configuration.
//!
//! Everything the original binary fixed at build time, collected in one
//! value so embedders and tests can shrink it.

/// Iteration floor: halving never goes below this.
pub const MIN_ITERATIONS: u32 = 64;

/// Build-time rendering parameters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RenderConfig {
    /// Framebuffer width in pixels; constant across a session.
    pub width: u32,
    /// Framebuffer height in pixels; constant across a session.
    pub height: u32,
    /// Mantissa bits for reference-orbit and viewport arithmetic.
    pub precision_bits: usize,
    /// Escape radius R. Pixels escape at |z| > R; the reference orbit
    /// keeps running until |z|² > R⁴ so it stays usable past pixel escape.
    pub escape_radius: f64,
    /// Starting iteration limit.
    pub initial_max_iter: u32,
    /// Palette cycling frequency applied to the continuous escape value.
    pub color_freq: f64,
    /// Progressive refinement strides, coarse to fine.
    pub steps: [u32; 3],
    /// Worker thread count.
    pub workers: usize,
    /// Pending-task capacity of the worker pool.
    pub queue_capacity: usize,
}

impl RenderConfig {
    /// Pixel-side escape threshold R².
    pub fn escape_radius_sq(&self) -> f64 {
        self.escape_radius * self.escape_radius
    }

    /// Orbit-side slack threshold R⁴.
    pub fn orbit_escape_sq(&self) -> f64 {
        self.escape_radius_sq() * self.escape_radius_sq()
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            precision_bits: 1024,
            escape_radius: 1e6,
            initial_max_iter: MIN_ITERATIONS,
            color_freq: 0.1,
            steps: [16, 4, 1],
            workers: 12,
            queue_capacity: 262_144,
        }
    }
}
