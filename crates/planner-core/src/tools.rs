//! Toolbar-facing tool selection.

use crate::shapes::ShapeKind;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Available tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ToolKind {
    #[default]
    Line,
    Rectangle,
    Circle,
    Select,
}

impl ToolKind {
    /// The shape kind this tool draws, or `None` for the select tool.
    pub fn shape_kind(self) -> Option<ShapeKind> {
        match self {
            ToolKind::Line => Some(ShapeKind::Line),
            ToolKind::Rectangle => Some(ShapeKind::Rectangle),
            ToolKind::Circle => Some(ShapeKind::Circle),
            ToolKind::Select => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ToolKind::Line => "line",
            ToolKind::Rectangle => "rectangle",
            ToolKind::Circle => "circle",
            ToolKind::Select => "select",
        }
    }
}

impl fmt::Display for ToolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unknown tool: {0}")]
pub struct UnknownTool(pub String);

impl FromStr for ToolKind {
    type Err = UnknownTool;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "line" => Ok(ToolKind::Line),
            "rectangle" => Ok(ToolKind::Rectangle),
            "circle" => Ok(ToolKind::Circle),
            "select" => Ok(ToolKind::Select),
            other => Err(UnknownTool(other.to_string())),
        }
    }
}

/// Values supplied by the toolbar. Read-only from the editor's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolbarState {
    pub tool: ToolKind,
    pub show_annotations: bool,
}

impl Default for ToolbarState {
    fn default() -> Self {
        Self {
            tool: ToolKind::Line,
            show_annotations: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_from_name() {
        assert_eq!("select".parse::<ToolKind>(), Ok(ToolKind::Select));
        assert_eq!("circle".parse::<ToolKind>(), Ok(ToolKind::Circle));
        assert_eq!(
            "eraser".parse::<ToolKind>(),
            Err(UnknownTool("eraser".to_string()))
        );
    }

    #[test]
    fn test_drawing_tools_map_to_kinds() {
        assert_eq!(ToolKind::Rectangle.shape_kind(), Some(ShapeKind::Rectangle));
        assert_eq!(ToolKind::Select.shape_kind(), None);
    }

    #[test]
    fn test_toolbar_defaults() {
        let toolbar = ToolbarState::default();
        assert_eq!(toolbar.tool, ToolKind::Line);
        assert!(toolbar.show_annotations);
    }
}
