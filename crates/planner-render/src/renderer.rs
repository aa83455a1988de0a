//! Renderer trait abstraction.

use kurbo::{Rect, Size};
use peniko::Color;
use planner_core::Editor;
use planner_core::shapes::Shape;
use planner_core::store::ShapeStore;
use thiserror::Error;

/// Renderer errors.
#[derive(Debug, Error)]
pub enum RendererError {
    #[error("Invalid viewport: {0}x{1}")]
    InvalidViewport(f64, f64),
}

/// Result type for renderer operations.
pub type RenderResult<T> = Result<T, RendererError>;

/// Colors and sizes used when drawing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderStyle {
    pub stroke_color: Color,
    pub selected_color: Color,
    pub preview_color: Color,
    pub handle_color: Color,
    pub label_color: Color,
    pub stroke_width: f64,
    pub label_font_size: f64,
    /// Label position relative to the shape's start point.
    pub label_offset: kurbo::Vec2,
}

impl Default for RenderStyle {
    fn default() -> Self {
        Self {
            stroke_color: Color::from_rgba8(0, 0, 0, 255),
            selected_color: Color::from_rgba8(255, 0, 0, 255),
            preview_color: Color::from_rgba8(0x99, 0x99, 0x99, 255),
            handle_color: Color::from_rgba8(0, 128, 0, 255),
            label_color: Color::from_rgba8(0, 0, 255, 255),
            stroke_width: 1.0,
            label_font_size: 12.0,
            label_offset: kurbo::Vec2::new(5.0, -5.0),
        }
    }
}

/// Context for a single render frame.
pub struct RenderContext<'a> {
    /// Committed shapes in paint order.
    pub store: &'a ShapeStore,
    /// In-progress draft, drawn after the committed shapes.
    pub draft: Option<&'a Shape>,
    /// Index of the selected shape.
    pub selected: Option<usize>,
    /// Whether length labels are drawn.
    pub show_annotations: bool,
    /// Viewport size in pixels.
    pub viewport_size: Size,
    pub style: RenderStyle,
}

impl<'a> RenderContext<'a> {
    /// Create a new render context with nothing selected and annotations on.
    pub fn new(store: &'a ShapeStore, viewport_size: Size) -> Self {
        Self {
            store,
            draft: None,
            selected: None,
            show_annotations: true,
            viewport_size,
            style: RenderStyle::default(),
        }
    }

    /// Snapshot the editor's current state, sized to its canvas.
    pub fn from_editor(editor: &'a Editor) -> Self {
        Self::new(editor.store(), editor.canvas_size())
            .with_draft(editor.draft())
            .with_selected(editor.selected_index())
            .with_annotations(editor.show_annotations())
    }

    /// Set the in-progress draft.
    pub fn with_draft(mut self, draft: Option<&'a Shape>) -> Self {
        self.draft = draft;
        self
    }

    /// Set the selected shape index.
    pub fn with_selected(mut self, selected: Option<usize>) -> Self {
        self.selected = selected;
        self
    }

    /// Toggle length labels.
    pub fn with_annotations(mut self, show: bool) -> Self {
        self.show_annotations = show;
        self
    }

    pub fn with_style(mut self, style: RenderStyle) -> Self {
        self.style = style;
        self
    }

    /// The full viewport rectangle.
    pub fn viewport(&self) -> Rect {
        self.viewport_size.to_rect()
    }

    /// Check that the viewport can be drawn into.
    pub fn validate(&self) -> RenderResult<()> {
        let Size { width, height } = self.viewport_size;
        if width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0 {
            Ok(())
        } else {
            Err(RendererError::InvalidViewport(width, height))
        }
    }
}

/// Trait for rendering backends.
///
/// Every frame is a full redraw: implementations clear the viewport and draw
/// all committed shapes, then the draft.
pub trait Renderer {
    /// Build the command buffer for a frame.
    fn build_scene(&mut self, ctx: &RenderContext) -> RenderResult<()>;
}
