pub mod driver;
pub mod framebuffer;
pub mod generation;
pub mod orbit;
pub mod perturbation;
pub mod pool;
pub mod renderer;
pub mod tiles;

pub use driver::{DisplaySink, Driver, EventSource, InputEvent};
pub use framebuffer::{FrameStore, UNRESOLVED};
pub use generation::Generation;
pub use orbit::ReferenceOrbit;
pub use perturbation::iterate_pixel;
pub use pool::{PoolError, WorkerPool};
pub use renderer::Renderer;
pub use tiles::{plan_passes, TileJob};
