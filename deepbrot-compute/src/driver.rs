//! Single-threaded orchestrator.
//!
//! Owns the viewport and the renderer and sequences one render per
//! redraw: orbit first, then the progressive tile passes, then a "done"
//! transition once the pool drains. Window, texture upload and event
//! polling live behind the two collaborator traits.

use crate::renderer::Renderer;
use deepbrot_core::{RenderConfig, Viewport};
use log::{debug, info, warn};
use std::time::{Duration, Instant};

/// Zoom factor applied per scroll-in notch.
const ZOOM_IN_FACTOR: f64 = 0.75;
/// Zoom factor applied per scroll-out notch.
const ZOOM_OUT_FACTOR: f64 = 1.25;

/// Discrete events pushed by the input collaborator.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum InputEvent {
    /// Scroll by `delta` notches at a cursor position; positive zooms in.
    Zoom {
        delta: i32,
        cursor_x: f64,
        cursor_y: f64,
    },
    /// Double (`+1`) or halve (`-1`, floored at 64) the iteration limit.
    IterBump(i32),
    /// Flip the HUD flag consumed by the display collaborator.
    ToggleInfo,
    /// Explicit redraw request.
    Redraw,
    Quit,
}

/// Input collaborator: a source of discrete events.
pub trait EventSource {
    fn poll_event(&mut self) -> Option<InputEvent>;
}

/// Display collaborator: receives the frame each tick
/// (ARGB, pitch = width · 4).
pub trait DisplaySink {
    fn present(&mut self, pixels: &[u32], width: u32, height: u32);
}

pub struct Driver {
    viewport: Viewport,
    renderer: Renderer,
    redraw: bool,
    computing_orbit: bool,
    done: bool,
    show_info: bool,
    orbit_started: Instant,
    render_started: Instant,
    scratch: Vec<u32>,
}

impl Driver {
    pub fn new(config: RenderConfig) -> Self {
        let viewport = Viewport::new(&config);
        Self::with_viewport(config, viewport)
    }

    /// Start from an explicit viewport (saved position, test fixture).
    pub fn with_viewport(config: RenderConfig, viewport: Viewport) -> Self {
        Self {
            viewport,
            renderer: Renderer::new(config),
            redraw: true,
            computing_orbit: false,
            done: false,
            show_info: false,
            orbit_started: Instant::now(),
            render_started: Instant::now(),
            scratch: Vec::new(),
        }
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn renderer(&self) -> &Renderer {
        &self.renderer
    }

    /// True once the current render has fully settled.
    pub fn done(&self) -> bool {
        self.done
    }

    pub fn computing_orbit(&self) -> bool {
        self.computing_orbit
    }

    /// HUD visibility, consumed only by the display collaborator.
    pub fn info_visible(&self) -> bool {
        self.show_info
    }

    /// How long the in-flight orbit has been computing.
    pub fn orbit_elapsed(&self) -> Duration {
        self.orbit_started.elapsed()
    }

    /// One orchestrator iteration. Returns `false` when the session
    /// should end.
    pub fn tick(&mut self, events: &mut impl EventSource, display: &mut impl DisplaySink) -> bool {
        while let Some(event) = events.poll_event() {
            match event {
                InputEvent::Zoom {
                    delta,
                    cursor_x,
                    cursor_y,
                } => {
                    let factor = if delta > 0 {
                        ZOOM_IN_FACTOR
                    } else {
                        ZOOM_OUT_FACTOR
                    };
                    self.viewport.zoom_at(cursor_x, cursor_y, factor);
                    self.redraw = true;
                }
                InputEvent::IterBump(direction) => {
                    self.renderer.invalidate();
                    if direction > 0 {
                        self.viewport.double_iterations();
                    } else {
                        self.viewport.halve_iterations();
                    }
                    debug!("max_iter={}", self.viewport.max_iter);
                }
                InputEvent::ToggleInfo => self.show_info = !self.show_info,
                InputEvent::Redraw => self.redraw = true,
                InputEvent::Quit => return false,
            }
        }

        if self.redraw {
            self.done = false;
            self.computing_orbit = true;
            self.orbit_started = Instant::now();
            if let Err(e) = self.renderer.begin_orbit(&self.viewport) {
                warn!("orbit enqueue failed: {e}");
                return false;
            }
            self.redraw = false;
        }

        if self.renderer.orbit_ready() {
            match self.renderer.begin_render(&self.viewport) {
                Ok(true) => {
                    self.computing_orbit = false;
                    self.render_started = Instant::now();
                }
                // A cancelled orbit slipped in; the live one is still coming
                Ok(false) => {}
                Err(e) => {
                    warn!("render enqueue failed: {e}");
                    return false;
                }
            }
        }

        if !self.done && !self.computing_orbit && self.renderer.idle() {
            self.done = true;
            info!(
                "render settled in {}ms at scale {:.2e}",
                self.render_started.elapsed().as_millis(),
                self.viewport.scale_f64()
            );
        }

        self.renderer.frame().snapshot_into(&mut self.scratch);
        display.present(
            &self.scratch,
            self.renderer.frame().width(),
            self.renderer.frame().height(),
        );

        true
    }

    /// Run until the input collaborator delivers [`InputEvent::Quit`].
    pub fn run(&mut self, events: &mut impl EventSource, display: &mut impl DisplaySink) {
        while self.tick(events, display) {}
    }
}
