//! Display-list renderer.
//!
//! Produces a flat list of drawing commands that a shell replays onto its
//! canvas (2D context, SVG, GPU scene...).

use crate::renderer::{RenderContext, RenderResult, Renderer};
use kurbo::{Point, Rect, Vec2};
use peniko::Color;
use planner_core::geometry::RESIZE_HANDLE_SIZE;
use planner_core::shapes::{Outline, Shape};

/// A single drawing operation.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    /// Clear the given area.
    Clear { rect: Rect },
    /// Stroke a shape outline.
    Stroke {
        outline: Outline,
        color: Color,
        width: f64,
    },
    /// Fill an axis-aligned rectangle.
    FillRect { rect: Rect, color: Color },
    /// Draw text with its baseline origin at `position`.
    Text {
        text: String,
        position: Point,
        color: Color,
        font_size: f64,
    },
}

/// Build the commands for one frame.
pub fn render(ctx: &RenderContext) -> Vec<DrawCommand> {
    let style = &ctx.style;
    let mut commands = vec![DrawCommand::Clear {
        rect: ctx.viewport(),
    }];

    for (index, shape) in ctx.store.iter().enumerate() {
        let selected = ctx.selected == Some(index);
        commands.push(DrawCommand::Stroke {
            outline: shape.outline(),
            color: if selected {
                style.selected_color
            } else {
                style.stroke_color
            },
            width: style.stroke_width,
        });
        if selected {
            commands.push(DrawCommand::FillRect {
                rect: resize_handle(shape),
                color: style.handle_color,
            });
        }
        if ctx.show_annotations {
            commands.push(DrawCommand::Text {
                text: shape.label(),
                position: shape.start + style.label_offset,
                color: style.label_color,
                font_size: style.label_font_size,
            });
        }
    }

    // The draft is never decorated.
    if let Some(draft) = ctx.draft {
        commands.push(DrawCommand::Stroke {
            outline: draft.outline(),
            color: style.preview_color,
            width: style.stroke_width,
        });
    }

    commands
}

/// Area of the resize handle, the square ending at the shape's end point.
pub fn resize_handle(shape: &Shape) -> Rect {
    Rect::from_points(
        shape.end - Vec2::new(RESIZE_HANDLE_SIZE, RESIZE_HANDLE_SIZE),
        shape.end,
    )
}

/// Renderer that records each frame's commands.
#[derive(Debug, Default)]
pub struct DisplayListRenderer {
    commands: Vec<DrawCommand>,
    frames: u64,
}

impl DisplayListRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Commands of the last built frame.
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Number of frames built so far.
    pub fn frame_count(&self) -> u64 {
        self.frames
    }
}

impl Renderer for DisplayListRenderer {
    fn build_scene(&mut self, ctx: &RenderContext) -> RenderResult<()> {
        ctx.validate()?;
        self.commands = render(ctx);
        self.frames += 1;
        Ok(())
    }
}
