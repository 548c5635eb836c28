//! Shared render state and the tasks that mutate it.
//!
//! A `Renderer` owns everything the worker tasks touch: the generation
//! counter, the orbit publication slot, the frame store and the pool.
//! Tasks receive `Arc` handles; a task whose recorded generation goes
//! stale returns before writing.

use crate::framebuffer::FrameStore;
use crate::generation::Generation;
use crate::orbit::ReferenceOrbit;
use crate::perturbation::iterate_pixel;
use crate::pool::{PoolError, WorkerPool};
use crate::tiles::{plan_passes, TileJob};
use deepbrot_core::{colorize, Palette, RenderConfig, Viewport};
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// One tile's worth of raster work, stamped with its generation.
struct TileWork {
    job: TileJob,
    scale: f64,
    max_iter: u32,
    generation: u64,
    orbit: Arc<ReferenceOrbit>,
}

pub struct Renderer {
    config: RenderConfig,
    palette: Arc<Palette>,
    frame: Arc<FrameStore>,
    generation: Arc<Generation>,
    orbit_ready: Arc<AtomicBool>,
    orbit_slot: Arc<Mutex<Option<ReferenceOrbit>>>,
    orbit_len: Arc<AtomicUsize>,
    /// Generation of the most recent orbit request; a published orbit
    /// carrying any other stamp is discarded instead of consumed.
    orbit_request: AtomicU64,
    pool: WorkerPool,
}

impl Renderer {
    pub fn new(config: RenderConfig) -> Self {
        Self {
            config,
            palette: Arc::new(Palette::default()),
            frame: Arc::new(FrameStore::new(config.width, config.height)),
            generation: Arc::new(Generation::new()),
            orbit_ready: Arc::new(AtomicBool::new(false)),
            orbit_slot: Arc::new(Mutex::new(None)),
            orbit_len: Arc::new(AtomicUsize::new(0)),
            orbit_request: AtomicU64::new(0),
            pool: WorkerPool::new(config.workers, config.queue_capacity),
        }
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    pub fn frame(&self) -> &FrameStore {
        &self.frame
    }

    pub fn generation(&self) -> &Generation {
        &self.generation
    }

    /// Length of the most recently published orbit.
    pub fn orbit_length(&self) -> usize {
        self.orbit_len.load(Ordering::SeqCst)
    }

    /// Invalidate all in-flight work: advance the generation, then drop
    /// everything still queued.
    pub fn invalidate(&self) {
        self.generation.bump();
        self.pool.clear();
    }

    /// True once a computed orbit is waiting to be consumed.
    pub fn orbit_ready(&self) -> bool {
        self.orbit_ready.load(Ordering::SeqCst)
    }

    /// True when no task is running or pending.
    pub fn idle(&self) -> bool {
        self.pool.active_count() == 0
    }

    /// Start a new render: invalidate in-flight work and queue one
    /// reference-orbit task for the viewport center.
    pub fn begin_orbit(&self, viewport: &Viewport) -> Result<(), PoolError> {
        self.orbit_ready.store(false, Ordering::SeqCst);
        self.invalidate();

        let generation = self.generation.current();
        self.orbit_request.store(generation, Ordering::SeqCst);
        let center = viewport.center.clone();
        let max_iter = viewport.max_iter;
        let escape_radius = self.config.escape_radius;
        let live = Arc::clone(&self.generation);
        let slot = Arc::clone(&self.orbit_slot);
        let ready = Arc::clone(&self.orbit_ready);
        let len = Arc::clone(&self.orbit_len);

        self.pool.enqueue(move || {
            let Some(orbit) =
                ReferenceOrbit::compute(&center, max_iter, generation, &live, escape_radius)
            else {
                return;
            };
            if !live.is_current(generation) {
                return;
            }
            // Publish under the slot lock, then raise the flag
            let mut slot = slot.lock().unwrap();
            len.store(orbit.len(), Ordering::SeqCst);
            *slot = Some(orbit);
            ready.store(true, Ordering::SeqCst);
        })
    }

    /// Consume the published orbit and queue every refinement pass.
    ///
    /// Resets the frame and memo, advances the generation so stragglers
    /// of the orbit phase abort, and emits one task per tile with a
    /// shared handle on the orbit. Returns `Ok(false)` without queueing
    /// anything when the slot held no orbit for the current request
    /// (a cancelled orbit slipped its publication in).
    pub fn begin_render(&self, viewport: &Viewport) -> Result<bool, PoolError> {
        let Some(orbit) = self.orbit_slot.lock().unwrap().take() else {
            self.orbit_ready.store(false, Ordering::SeqCst);
            return Ok(false);
        };
        if orbit.generation != self.orbit_request.load(Ordering::SeqCst) {
            self.orbit_ready.store(false, Ordering::SeqCst);
            return Ok(false);
        }
        let orbit = Arc::new(orbit);

        self.frame.reset();
        self.invalidate();

        let generation = self.generation.current();
        let scale = viewport.scale_f64();
        let max_iter = viewport.max_iter;
        let escape_radius_sq = self.config.escape_radius_sq();
        let color_freq = self.config.color_freq;

        for job in plan_passes(self.config.width, self.config.height, &self.config.steps) {
            let work = TileWork {
                job,
                scale,
                max_iter,
                generation,
                orbit: Arc::clone(&orbit),
            };
            let frame = Arc::clone(&self.frame);
            let live = Arc::clone(&self.generation);
            let palette = Arc::clone(&self.palette);

            self.pool.enqueue(move || {
                render_tile(&work, &frame, &live, &palette, escape_radius_sq, color_freq);
            })?;
        }

        self.orbit_ready.store(false, Ordering::SeqCst);
        Ok(true)
    }
}

/// Rasterize one tile at one stride.
///
/// Every sampled pixel is either reused from the memo or iterated,
/// colored, memoized, and painted as a `step × step` block. The live
/// generation is checked per pixel and again before each write.
fn render_tile(
    work: &TileWork,
    frame: &FrameStore,
    live: &Generation,
    palette: &Palette,
    escape_radius_sq: f64,
    color_freq: f64,
) {
    let width = frame.width();
    let height = frame.height();
    let half_w = width as f64 / 2.0;
    let half_h = height as f64 / 2.0;
    let samples = &work.orbit.samples;

    let mut dy = 0;
    while dy < work.job.tile {
        let y = work.job.y + dy;
        if y >= height {
            break;
        }
        let mut dx = 0;
        while dx < work.job.tile {
            if !live.is_current(work.generation) {
                return;
            }
            let x = work.job.x + dx;
            if x >= width {
                break;
            }

            let color = match frame.resolved_color(x, y) {
                Some(color) => color,
                None => {
                    let delta_c = (
                        (x as f64 - half_w) * work.scale,
                        (y as f64 - half_h) * work.scale,
                    );
                    let data = iterate_pixel(samples, delta_c, work.max_iter, escape_radius_sq);
                    let color = colorize(&data, palette, color_freq);
                    if !live.is_current(work.generation) {
                        return;
                    }
                    frame.resolve(x, y, data.iterations as i64, color);
                    color
                }
            };

            if !live.is_current(work.generation) {
                return;
            }
            frame.fill_block(x, y, work.job.step, color);

            dx += work.job.step;
        }
        dy += work.job.step;
    }
}
