//! Planner Render Library
//!
//! Renderer abstraction and a display-list renderer for the floor planner's
//! drawing canvas.

mod display_list;
mod renderer;

pub use display_list::{DisplayListRenderer, DrawCommand, render, resize_handle};
pub use renderer::{RenderContext, RenderResult, RenderStyle, Renderer, RendererError};
