/// Outcome of iterating a single pixel.
///
/// Produced by the perturbation kernel, consumed by the colorizer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MandelbrotData {
    /// Completed iterations before escape, or `max_iterations` if interior.
    pub iterations: u32,
    pub max_iterations: u32,
    pub escaped: bool,
    /// |z|² at the escaping step; 0.0 for interior points.
    pub final_norm_sq: f64,
    /// How many times the pixel was rebased onto its own orbit.
    pub rebases: u32,
}

impl MandelbrotData {
    pub fn interior(max_iterations: u32, rebases: u32) -> Self {
        Self {
            iterations: max_iterations,
            max_iterations,
            escaped: false,
            final_norm_sq: 0.0,
            rebases,
        }
    }
}
