//! Coarse-to-fine tile planning.
//!
//! Each refinement pass partitions the framebuffer into tiles and emits
//! one job per tile; within a tile only every `step`-th pixel is sampled
//! and painted as a `step × step` block. Early passes give an immediate
//! preview, the final step-1 pass lands full resolution.

/// One tile of one refinement pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TileJob {
    /// Top-left corner of the tile in pixels.
    pub x: u32,
    pub y: u32,
    /// Tile side length.
    pub tile: u32,
    /// Sampling stride within the tile.
    pub step: u32,
    /// Sub-pixel sample count. Reserved for supersampling; always 1.
    pub samples: u32,
}

/// Plan every pass over a `width × height` framebuffer, coarse to fine.
///
/// Tile side is `max(step, 8)` so coarse passes stay chunky enough to
/// amortize scheduling while fine passes still parallelize.
pub fn plan_passes(width: u32, height: u32, steps: &[u32]) -> Vec<TileJob> {
    let mut jobs = Vec::new();

    for &step in steps {
        let tile = step.max(8);
        let mut y = 0;
        while y < height {
            let mut x = 0;
            while x < width {
                jobs.push(TileJob {
                    x,
                    y,
                    tile,
                    step,
                    samples: 1,
                });
                x += tile;
            }
            y += tile;
        }
    }

    jobs
}
