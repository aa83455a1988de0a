//! Pointer-driven interaction state machine.
//!
//! [`transition`] is a pure function of the current state, an event, the
//! active tool and the store. It returns the next state plus the list of
//! store mutations the caller must apply. Nothing in this module touches
//! the store or the network directly.

use crate::geometry;
use crate::input::{Key, PointerEvent};
use crate::shapes::Shape;
use crate::store::{ShapeKey, ShapeStore};
use crate::tools::ToolKind;
use kurbo::{Point, Vec2};

/// State of the interaction controller.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum InteractionState {
    /// Nothing selected, no gesture in progress.
    #[default]
    Idle,
    /// A draw gesture is in progress. The draft is not in the store.
    Drawing { draft: Shape },
    /// A committed shape is selected.
    Selected { index: usize },
    /// The selected shape follows the pointer. `offset` is pointer minus `start`
    /// at the moment the drag began.
    Dragging { index: usize, offset: Vec2 },
    /// The selected shape's `end` follows the pointer.
    Resizing { index: usize },
}

impl InteractionState {
    /// Index of the shape rendered as selected, if any.
    pub fn selected_index(&self) -> Option<usize> {
        match *self {
            InteractionState::Selected { index }
            | InteractionState::Dragging { index, .. }
            | InteractionState::Resizing { index } => Some(index),
            InteractionState::Idle | InteractionState::Drawing { .. } => None,
        }
    }

    /// The in-progress draft, if drawing.
    pub fn draft(&self) -> Option<&Shape> {
        match self {
            InteractionState::Drawing { draft } => Some(draft),
            _ => None,
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, InteractionState::Idle)
    }

    /// Short name for logging.
    pub fn name(&self) -> &'static str {
        match self {
            InteractionState::Idle => "idle",
            InteractionState::Drawing { .. } => "drawing",
            InteractionState::Selected { .. } => "selected",
            InteractionState::Dragging { .. } => "dragging",
            InteractionState::Resizing { .. } => "resizing",
        }
    }

    /// Adjust held indices after `count` shapes were inserted at the front of the store.
    pub fn shift_indices(&mut self, count: usize) {
        match self {
            InteractionState::Selected { index }
            | InteractionState::Dragging { index, .. }
            | InteractionState::Resizing { index } => *index += count,
            InteractionState::Idle | InteractionState::Drawing { .. } => {}
        }
    }
}

/// Input to the state machine.
#[derive(Debug, Clone, PartialEq)]
pub enum InteractionEvent {
    Pointer(PointerEvent),
    Key(Key),
}

impl From<PointerEvent> for InteractionEvent {
    fn from(event: PointerEvent) -> Self {
        InteractionEvent::Pointer(event)
    }
}

impl From<Key> for InteractionEvent {
    fn from(key: Key) -> Self {
        InteractionEvent::Key(key)
    }
}

/// A change the controller asks the store to make.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreMutation {
    /// Commit a finished draft.
    Insert(Shape),
    /// Translate a shape so its `start` lands on `start`.
    Translate { index: usize, start: Point },
    /// Overwrite a shape's `end`.
    Resize { index: usize, end: Point },
    /// Delete a shape.
    Remove { index: usize },
}

/// What applying a mutation did to the store.
#[derive(Debug, Clone, PartialEq)]
pub enum Applied {
    Inserted(ShapeKey),
    Updated(ShapeKey),
    Removed(ShapeKey, Shape),
    /// The targeted index no longer exists.
    Missing,
}

impl StoreMutation {
    /// Apply this mutation to the store.
    pub fn apply(self, store: &mut ShapeStore) -> Applied {
        match self {
            StoreMutation::Insert(shape) => Applied::Inserted(store.insert(shape)),
            StoreMutation::Translate { index, start } => match store.get_mut(index) {
                Some(shape) => {
                    shape.move_start_to(start);
                    store.key_at(index).map_or(Applied::Missing, Applied::Updated)
                }
                None => Applied::Missing,
            },
            StoreMutation::Resize { index, end } => match store.get_mut(index) {
                Some(shape) => {
                    shape.set_end(end);
                    store.key_at(index).map_or(Applied::Missing, Applied::Updated)
                }
                None => Applied::Missing,
            },
            StoreMutation::Remove { index } => match store.remove(index) {
                Some((key, shape)) => Applied::Removed(key, shape),
                None => Applied::Missing,
            },
        }
    }
}

/// Result of a transition.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub state: InteractionState,
    pub mutations: Vec<StoreMutation>,
}

impl Transition {
    fn to(state: InteractionState) -> Self {
        Self {
            state,
            mutations: Vec::new(),
        }
    }

    fn with(state: InteractionState, mutation: StoreMutation) -> Self {
        Self {
            state,
            mutations: vec![mutation],
        }
    }
}

/// Compute the next state for an event.
pub fn transition(
    state: &InteractionState,
    event: &InteractionEvent,
    tool: ToolKind,
    store: &ShapeStore,
) -> Transition {
    match event {
        InteractionEvent::Pointer(pointer) => match *pointer {
            PointerEvent::Down { position } => pointer_down(state, position, tool, store),
            PointerEvent::Move { position } => pointer_move(state, position, store),
            PointerEvent::Up { .. } => pointer_up(state, store),
        },
        InteractionEvent::Key(key) => key_pressed(state, key, store),
    }
}

fn pointer_down(
    state: &InteractionState,
    position: Point,
    tool: ToolKind,
    store: &ShapeStore,
) -> Transition {
    if let InteractionState::Drawing { draft } = state {
        // A pointer-up was lost; the unfinished draft is dropped.
        log::debug!("Aborting unfinished {} draft", draft.kind());
    }

    if let Some(kind) = tool.shape_kind() {
        return Transition::to(InteractionState::Drawing {
            draft: Shape::at(kind, position),
        });
    }

    match store.hit_test(position) {
        Some(index) => {
            let Some(shape) = store.get(index) else {
                return Transition::to(InteractionState::Idle);
            };
            if geometry::on_resize_handle(position, shape) {
                Transition::to(InteractionState::Resizing { index })
            } else {
                Transition::to(InteractionState::Dragging {
                    index,
                    offset: position - shape.start,
                })
            }
        }
        None => Transition::to(InteractionState::Idle),
    }
}

fn pointer_move(state: &InteractionState, position: Point, store: &ShapeStore) -> Transition {
    match state {
        InteractionState::Drawing { draft } => {
            let mut draft = draft.clone();
            draft.set_end(position);
            Transition::to(InteractionState::Drawing { draft })
        }
        InteractionState::Dragging { index, offset } => {
            if store.get(*index).is_none() {
                return Transition::to(InteractionState::Idle);
            }
            Transition::with(
                state.clone(),
                StoreMutation::Translate {
                    index: *index,
                    start: position - *offset,
                },
            )
        }
        InteractionState::Resizing { index } => {
            if store.get(*index).is_none() {
                return Transition::to(InteractionState::Idle);
            }
            Transition::with(
                state.clone(),
                StoreMutation::Resize {
                    index: *index,
                    end: position,
                },
            )
        }
        InteractionState::Idle | InteractionState::Selected { .. } => Transition::to(state.clone()),
    }
}

fn pointer_up(state: &InteractionState, store: &ShapeStore) -> Transition {
    match state {
        InteractionState::Drawing { draft } => {
            Transition::with(InteractionState::Idle, StoreMutation::Insert(draft.clone()))
        }
        InteractionState::Dragging { index, .. } | InteractionState::Resizing { index } => {
            if store.get(*index).is_some() {
                Transition::to(InteractionState::Selected { index: *index })
            } else {
                Transition::to(InteractionState::Idle)
            }
        }
        InteractionState::Idle | InteractionState::Selected { .. } => Transition::to(state.clone()),
    }
}

fn key_pressed(state: &InteractionState, key: &Key, store: &ShapeStore) -> Transition {
    match (key, state) {
        (Key::Delete, InteractionState::Selected { index }) => {
            if store.get(*index).is_some() {
                Transition::with(InteractionState::Idle, StoreMutation::Remove { index: *index })
            } else {
                Transition::to(InteractionState::Idle)
            }
        }
        (Key::Escape, InteractionState::Dragging { index, .. })
        | (Key::Escape, InteractionState::Resizing { index }) => {
            Transition::to(InteractionState::Selected { index: *index })
        }
        (Key::Escape, _) => Transition::to(InteractionState::Idle),
        _ => Transition::to(state.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::ShapeKind;

    fn down(x: f64, y: f64) -> InteractionEvent {
        PointerEvent::Down { position: Point::new(x, y) }.into()
    }

    fn moved(x: f64, y: f64) -> InteractionEvent {
        PointerEvent::Move { position: Point::new(x, y) }.into()
    }

    fn up(x: f64, y: f64) -> InteractionEvent {
        PointerEvent::Up { position: Point::new(x, y) }.into()
    }

    fn rect_store() -> ShapeStore {
        let mut store = ShapeStore::new();
        store.insert(Shape::new(
            ShapeKind::Rectangle,
            Point::new(0.0, 0.0),
            Point::new(100.0, 100.0),
        ));
        store
    }

    #[test]
    fn test_draw_gesture() {
        let store = ShapeStore::new();
        let t = transition(&InteractionState::Idle, &down(0.0, 0.0), ToolKind::Line, &store);
        assert_eq!(t.state.draft().unwrap().kind(), ShapeKind::Line);
        assert!(t.mutations.is_empty());

        let t = transition(&t.state, &moved(100.0, 0.0), ToolKind::Line, &store);
        assert_eq!(t.state.draft().unwrap().end, Point::new(100.0, 0.0));
        assert!(t.mutations.is_empty());

        let t = transition(&t.state, &up(100.0, 0.0), ToolKind::Line, &store);
        assert!(t.state.is_idle());
        assert_eq!(
            t.mutations,
            vec![StoreMutation::Insert(Shape::new(
                ShapeKind::Line,
                Point::new(0.0, 0.0),
                Point::new(100.0, 0.0)
            ))]
        );
    }

    #[test]
    fn test_draw_from_selected_clears_selection() {
        let store = rect_store();
        let t = transition(
            &InteractionState::Selected { index: 0 },
            &down(10.0, 10.0),
            ToolKind::Circle,
            &store,
        );
        assert!(t.state.draft().is_some());
        assert_eq!(t.state.selected_index(), None);
    }

    #[test]
    fn test_select_hit_starts_drag_with_offset() {
        let store = rect_store();
        let t = transition(&InteractionState::Idle, &down(30.0, 40.0), ToolKind::Select, &store);
        assert_eq!(
            t.state,
            InteractionState::Dragging {
                index: 0,
                offset: Vec2::new(30.0, 40.0)
            }
        );
    }

    #[test]
    fn test_select_on_handle_starts_resize() {
        let store = rect_store();
        let t = transition(&InteractionState::Idle, &down(95.0, 95.0), ToolKind::Select, &store);
        assert_eq!(t.state, InteractionState::Resizing { index: 0 });
    }

    #[test]
    fn test_select_miss_clears_selection() {
        let store = rect_store();
        let t = transition(
            &InteractionState::Selected { index: 0 },
            &down(300.0, 300.0),
            ToolKind::Select,
            &store,
        );
        assert!(t.state.is_idle());
    }

    #[test]
    fn test_drag_move_emits_translate() {
        let store = rect_store();
        let state = InteractionState::Dragging {
            index: 0,
            offset: Vec2::new(30.0, 40.0),
        };
        let t = transition(&state, &moved(130.0, 140.0), ToolKind::Select, &store);
        assert_eq!(t.state, state);
        assert_eq!(
            t.mutations,
            vec![StoreMutation::Translate {
                index: 0,
                start: Point::new(100.0, 100.0)
            }]
        );
    }

    #[test]
    fn test_resize_move_emits_resize() {
        let store = rect_store();
        let state = InteractionState::Resizing { index: 0 };
        let t = transition(&state, &moved(150.0, 120.0), ToolKind::Select, &store);
        assert_eq!(
            t.mutations,
            vec![StoreMutation::Resize {
                index: 0,
                end: Point::new(150.0, 120.0)
            }]
        );
    }

    #[test]
    fn test_release_returns_to_selected() {
        let store = rect_store();
        for state in [
            InteractionState::Resizing { index: 0 },
            InteractionState::Dragging {
                index: 0,
                offset: Vec2::ZERO,
            },
        ] {
            let t = transition(&state, &up(0.0, 0.0), ToolKind::Select, &store);
            assert_eq!(t.state, InteractionState::Selected { index: 0 });
            assert!(t.mutations.is_empty());
        }
    }

    #[test]
    fn test_delete_selected() {
        let store = rect_store();
        let t = transition(
            &InteractionState::Selected { index: 0 },
            &Key::Delete.into(),
            ToolKind::Select,
            &store,
        );
        assert!(t.state.is_idle());
        assert_eq!(t.mutations, vec![StoreMutation::Remove { index: 0 }]);
    }

    #[test]
    fn test_delete_without_selection_is_noop() {
        let store = rect_store();
        let t = transition(&InteractionState::Idle, &Key::Delete.into(), ToolKind::Select, &store);
        assert!(t.state.is_idle());
        assert!(t.mutations.is_empty());
    }

    #[test]
    fn test_escape_aborts_draft() {
        let store = ShapeStore::new();
        let t = transition(&InteractionState::Idle, &down(5.0, 5.0), ToolKind::Rectangle, &store);
        let t = transition(&t.state, &Key::Escape.into(), ToolKind::Rectangle, &store);
        assert!(t.state.is_idle());
        assert!(t.mutations.is_empty());
    }

    #[test]
    fn test_escape_ends_drag_keeping_selection() {
        let store = rect_store();
        let t = transition(
            &InteractionState::Resizing { index: 0 },
            &Key::Escape.into(),
            ToolKind::Select,
            &store,
        );
        assert_eq!(t.state, InteractionState::Selected { index: 0 });
    }

    #[test]
    fn test_stale_index_resets_to_idle() {
        let store = ShapeStore::new();
        let t = transition(
            &InteractionState::Dragging {
                index: 3,
                offset: Vec2::ZERO,
            },
            &moved(1.0, 1.0),
            ToolKind::Select,
            &store,
        );
        assert!(t.state.is_idle());
        assert!(t.mutations.is_empty());
    }

    #[test]
    fn test_pointer_down_while_drawing_restarts() {
        let store = ShapeStore::new();
        let drawing = InteractionState::Drawing {
            draft: Shape::new(ShapeKind::Line, Point::ZERO, Point::new(50.0, 0.0)),
        };
        let t = transition(&drawing, &down(10.0, 10.0), ToolKind::Line, &store);
        let draft = t.state.draft().unwrap();
        assert_eq!(draft.start, Point::new(10.0, 10.0));
        assert!(t.mutations.is_empty());
    }

    #[test]
    fn test_apply_translate_and_resize() {
        let mut store = rect_store();
        let key = store.key_at(0).unwrap();
        let applied = StoreMutation::Translate {
            index: 0,
            start: Point::new(10.0, 10.0),
        }
        .apply(&mut store);
        assert_eq!(applied, Applied::Updated(key));
        assert_eq!(store.get(0).unwrap().end, Point::new(110.0, 110.0));

        StoreMutation::Resize {
            index: 0,
            end: Point::new(50.0, 60.0),
        }
        .apply(&mut store);
        let shape = store.get(0).unwrap();
        assert_eq!(shape.start, Point::new(10.0, 10.0));
        assert_eq!(shape.end, Point::new(50.0, 60.0));

        assert_eq!(StoreMutation::Remove { index: 5 }.apply(&mut store), Applied::Missing);
    }

    #[test]
    fn test_shift_indices() {
        let mut state = InteractionState::Selected { index: 1 };
        state.shift_indices(2);
        assert_eq!(state.selected_index(), Some(3));
    }
}
