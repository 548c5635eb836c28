//! Shared frame state: the ARGB pixel buffer and the per-pixel memo.
//!
//! Two independent mutexes guard the two arrays; no render task ever
//! holds both at once. The memo stores the final iteration count
//! (-1 = unresolved) together with the derived color, so refinement
//! passes repaint resolved pixels without re-running the kernel.

use std::sync::Mutex;

/// Sentinel for pixels no pass has resolved yet.
pub const UNRESOLVED: i64 = -1;

struct Memo {
    iterations: Vec<i64>,
    colors: Vec<u32>,
}

pub struct FrameStore {
    width: u32,
    height: u32,
    pixels: Mutex<Vec<u32>>,
    memo: Mutex<Memo>,
}

impl FrameStore {
    pub fn new(width: u32, height: u32) -> Self {
        let len = (width as usize) * (height as usize);
        Self {
            width,
            height,
            pixels: Mutex::new(vec![0; len]),
            memo: Mutex::new(Memo {
                iterations: vec![UNRESOLVED; len],
                colors: vec![0; len],
            }),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Return pixels to black and the memo to unresolved. Called once
    /// per render generation, before any of its tasks run.
    pub fn reset(&self) {
        self.pixels.lock().unwrap().fill(0);
        self.memo.lock().unwrap().iterations.fill(UNRESOLVED);
    }

    /// The resolved color of a pixel, if a previous pass computed it.
    pub fn resolved_color(&self, x: u32, y: u32) -> Option<u32> {
        let idx = self.index(x, y);
        let memo = self.memo.lock().unwrap();
        (memo.iterations[idx] != UNRESOLVED).then(|| memo.colors[idx])
    }

    /// Record the final iteration count and color of a pixel.
    pub fn resolve(&self, x: u32, y: u32, iterations: i64, color: u32) {
        let idx = self.index(x, y);
        let mut memo = self.memo.lock().unwrap();
        memo.iterations[idx] = iterations;
        memo.colors[idx] = color;
    }

    /// The memoized iteration count of a pixel, or [`UNRESOLVED`].
    pub fn iterations_at(&self, x: u32, y: u32) -> i64 {
        self.memo.lock().unwrap().iterations[self.index(x, y)]
    }

    /// Paint a `step × step` block anchored at (x, y), clipped to the
    /// frame bounds. One lock acquisition per block.
    pub fn fill_block(&self, x: u32, y: u32, step: u32, color: u32) {
        let mut pixels = self.pixels.lock().unwrap();
        for dy in 0..step {
            let py = y + dy;
            if py >= self.height {
                break;
            }
            let row = (py as usize) * (self.width as usize);
            for dx in 0..step {
                let px = x + dx;
                if px >= self.width {
                    break;
                }
                pixels[row + px as usize] = color;
            }
        }
    }

    /// Single-pixel read, for tests and probes.
    pub fn pixel_at(&self, x: u32, y: u32) -> u32 {
        self.pixels.lock().unwrap()[self.index(x, y)]
    }

    /// Copy the frame for the display collaborator
    /// (ARGB, pitch = width · 4).
    pub fn snapshot_into(&self, out: &mut Vec<u32>) {
        let pixels = self.pixels.lock().unwrap();
        out.clear();
        out.extend_from_slice(&pixels);
    }

    fn index(&self, x: u32, y: u32) -> usize {
        debug_assert!(x < self.width && y < self.height);
        (y as usize) * (self.width as usize) + (x as usize)
    }
}
