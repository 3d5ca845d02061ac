/*!
## Rust Machine Module

This Rust module executes drawing operations on a simulated monochrome
display and produces a grayscale frame.

*/

mod canvas;
mod op;
mod render;

pub use canvas::blend;
pub use canvas::{Canvas, MAX_SIDE};
pub use op::Operation;
pub use render::render;
pub use render::{DisplayState, ExecutorOutput, Frame, Rasterizer, RenderRequest};
