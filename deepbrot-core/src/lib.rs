pub mod bigfloat;
pub mod compute_data;
pub mod config;
pub mod palette;
pub mod viewport;

pub use bigfloat::{BigFloat, ParseError};
pub use compute_data::MandelbrotData;
pub use config::{RenderConfig, MIN_ITERATIONS};
pub use palette::{colorize, escape_value, interpolate, Palette, DEFAULT_PALETTE, INTERIOR_COLOR};
pub use viewport::Viewport;
