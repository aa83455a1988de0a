//! Planner Core Library
//!
//! Shape model, geometry, interaction state machine and persistence client
//! for the floor planner's drawing canvas. Rendering lives in `planner-render`.

pub mod config;
pub mod editor;
pub mod geometry;
pub mod input;
pub mod interaction;
pub mod persistence;
pub mod shapes;
pub mod store;
pub mod tools;

pub use config::{ConfigError, EditorConfig};
pub use editor::Editor;
pub use geometry::{
    LINE_HIT_TOLERANCE, RESIZE_HANDLE_SIZE, contains, distance, hit_test, on_resize_handle,
};
pub use input::{Key, PointerEvent, PointerPhase};
pub use interaction::{InteractionEvent, InteractionState, StoreMutation, Transition, transition};
pub use persistence::{
    HttpShapeService, MemoryShapeService, Outbox, OutboxStatus, PersistenceClient, ServiceError,
    ShapeRecord, ShapeService,
};
pub use shapes::{Outline, Shape, ShapeId, ShapeKind};
pub use store::{ShapeKey, ShapeStore};
pub use tools::{ToolKind, ToolbarState};
