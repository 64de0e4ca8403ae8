mod app;
pub use app::*;

pub mod input;

mod window_resizing;
