//! Editor state and event handling.

use crate::config::EditorConfig;
use crate::input::{Key, PointerEvent};
use crate::interaction::{self, Applied, InteractionEvent, InteractionState};
use crate::persistence::{
    HttpShapeService, Outbox, OutboxOp, PersistEvent, PersistOutcome, PersistRequest,
    PersistenceClient, ServiceResult, ShapeRecord,
};
use crate::shapes::Shape;
use crate::store::{ShapeKey, ShapeStore};
use crate::tools::{ToolKind, ToolbarState, UnknownTool};
use kurbo::Size;
use std::sync::Arc;

/// Outbox reason for changes made without a service connection.
const OFFLINE: &str = "offline";

/// The shape editor: committed shapes, the interaction state and the link to
/// the shape service.
///
/// All methods are meant to be called from a single event thread. Service
/// calls run in the background; call [`Editor::poll_persistence`] regularly to
/// apply their outcomes.
pub struct Editor {
    store: ShapeStore,
    state: InteractionState,
    toolbar: ToolbarState,
    outbox: Outbox,
    client: Option<PersistenceClient>,
    canvas_size: Size,
    /// Bumped on every change that affects rendering.
    revision: u64,
}

impl Default for Editor {
    fn default() -> Self {
        Self::new()
    }
}

impl Editor {
    /// Create an editor without a service connection.
    ///
    /// Edits stay local; the outbox records them as skipped.
    pub fn new() -> Self {
        Self {
            store: ShapeStore::new(),
            state: InteractionState::Idle,
            toolbar: ToolbarState::default(),
            outbox: Outbox::new(),
            client: None,
            canvas_size: EditorConfig::default().canvas_size(),
            revision: 0,
        }
    }

    /// Create an editor mirroring edits through the given client.
    pub fn with_client(client: PersistenceClient) -> Self {
        Self {
            client: Some(client),
            ..Self::new()
        }
    }

    /// Create an editor from configuration, connecting to the HTTP service if
    /// a URL is configured.
    pub fn from_config(config: &EditorConfig) -> ServiceResult<Self> {
        let editor = match config.service_url {
            Some(ref url) => {
                let service = HttpShapeService::new(url, config.request_timeout())?;
                log::info!("Mirroring shapes to {}", service.base_url());
                Self::with_client(PersistenceClient::spawn(Arc::new(service)))
            }
            None => {
                log::info!("No shape service configured, editing locally");
                Self::new()
            }
        };
        Ok(Self {
            canvas_size: config.canvas_size(),
            ..editor
        })
    }

    /// Request the initial shape list from the service.
    pub fn mount(&mut self) {
        self.send(OutboxOp::Fetch, PersistRequest::FetchAll);
    }

    // ---- toolbar ----

    pub fn toolbar(&self) -> ToolbarState {
        self.toolbar
    }

    pub fn tool(&self) -> ToolKind {
        self.toolbar.tool
    }

    /// Change the active tool. A gesture in progress continues with its own semantics.
    pub fn set_tool(&mut self, tool: ToolKind) {
        self.toolbar.tool = tool;
    }

    /// Change the active tool by toolbar name (`line`, `rectangle`, `circle`, `select`).
    pub fn set_tool_name(&mut self, name: &str) -> Result<(), UnknownTool> {
        self.set_tool(name.parse()?);
        Ok(())
    }

    pub fn show_annotations(&self) -> bool {
        self.toolbar.show_annotations
    }

    pub fn set_show_annotations(&mut self, show: bool) {
        if self.toolbar.show_annotations != show {
            self.toolbar.show_annotations = show;
            self.touch();
        }
    }

    // ---- queries ----

    pub fn store(&self) -> &ShapeStore {
        &self.store
    }

    /// Committed shapes in paint order.
    pub fn shapes(&self) -> impl Iterator<Item = &Shape> {
        self.store.iter()
    }

    pub fn state(&self) -> &InteractionState {
        &self.state
    }

    pub fn selected_index(&self) -> Option<usize> {
        self.state.selected_index()
    }

    pub fn draft(&self) -> Option<&Shape> {
        self.state.draft()
    }

    pub fn outbox(&self) -> &Outbox {
        &self.outbox
    }

    /// Size of the drawing surface in pixels.
    pub fn canvas_size(&self) -> Size {
        self.canvas_size
    }

    /// Counter that changes whenever a redraw is needed.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    fn touch(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }

    // ---- events ----

    /// Handle a pointer event in canvas coordinates.
    pub fn handle_pointer(&mut self, event: PointerEvent) {
        self.handle_event(InteractionEvent::Pointer(event));
    }

    /// Handle a key press.
    pub fn handle_key(&mut self, key: Key) {
        self.handle_event(InteractionEvent::Key(key));
    }

    /// Run one state machine step and apply its mutations.
    pub fn handle_event(&mut self, event: InteractionEvent) {
        if let InteractionEvent::Pointer(ref pointer) = event {
            if !pointer.is_valid() {
                log::warn!("Ignoring pointer event with non-finite coordinates: {:?}", pointer);
                return;
            }
        }

        let step = interaction::transition(&self.state, &event, self.toolbar.tool, &self.store);
        if step.state.name() != self.state.name() {
            log::debug!("Interaction {} -> {}", self.state.name(), step.state.name());
        }
        let changed = step.state != self.state || !step.mutations.is_empty();

        for mutation in step.mutations {
            let applied = mutation.apply(&mut self.store);
            self.after_mutation(applied);
        }
        self.state = step.state;

        if changed {
            self.touch();
        }
    }

    fn after_mutation(&mut self, applied: Applied) {
        match applied {
            Applied::Inserted(key) => self.persist_create(key),
            Applied::Removed(key, shape) => self.persist_delete(key, shape),
            // Drag and resize results are not mirrored to the service.
            Applied::Updated(_) => {}
            Applied::Missing => log::warn!("Store mutation targeted a missing shape"),
        }
    }

    fn persist_create(&mut self, key: ShapeKey) {
        let Some(shape) = self.store.get_by_key(key) else {
            return;
        };
        let record = ShapeRecord::from(shape);
        self.send(OutboxOp::Create { key }, PersistRequest::Create(record));
    }

    fn persist_delete(&mut self, key: ShapeKey, shape: Shape) {
        match shape.id {
            Some(id) => {
                let op = OutboxOp::Delete {
                    key,
                    id: Some(id.clone()),
                };
                self.send(op, PersistRequest::Delete(id));
            }
            None if self.outbox.has_pending_create(key) => {
                log::info!("Delete of unsaved {} deferred until it is saved", shape.kind());
                self.outbox.defer(OutboxOp::Delete { key, id: None });
            }
            None => {
                log::warn!("Deleted {} was never saved; removal is local only", shape.kind());
                self.outbox
                    .skip(OutboxOp::Delete { key, id: None }, "shape was never saved");
            }
        }
    }

    /// Record a request and hand it to the client. Without a client the
    /// change stays local and the entry is closed right away.
    fn send(&mut self, op: OutboxOp, request: PersistRequest) {
        if self.client.is_none() {
            self.outbox.skip(op, OFFLINE);
            return;
        }
        let seq = self.outbox.enqueue(op);
        self.dispatch(seq, request);
    }

    fn dispatch(&mut self, seq: u64, request: PersistRequest) {
        if let Some(ref client) = self.client {
            if let Err(e) = client.submit(seq, request) {
                log::error!("Could not queue request #{}: {}", seq, e);
                self.outbox.mark_failed(seq, e.to_string());
            }
        }
    }

    // ---- persistence outcomes ----

    /// Apply every completed service request. Returns how many were applied.
    pub fn poll_persistence(&mut self) -> usize {
        let events = match self.client {
            Some(ref client) => client.poll_events(),
            None => return 0,
        };
        let count = events.len();
        for event in events {
            self.apply_persist_event(event);
        }
        count
    }

    /// Apply the outcome of one service request.
    pub fn apply_persist_event(&mut self, event: PersistEvent) {
        let Some(entry) = self.outbox.get(event.seq) else {
            log::warn!("Outcome for unknown request #{}", event.seq);
            return;
        };
        let op = entry.op.clone();

        match (op, event.outcome) {
            (OutboxOp::Fetch, PersistOutcome::Fetched(records)) => {
                self.outbox.mark_acked(event.seq);
                self.seed(records);
            }
            (OutboxOp::Create { key }, PersistOutcome::Created(record)) => match record.id {
                Some(id) => {
                    self.outbox.mark_acked(event.seq);
                    self.on_saved(key, id);
                }
                None => {
                    log::error!("Service acknowledged a create without an id");
                    self.outbox.mark_failed(event.seq, "response carried no id");
                    self.drop_deferred_delete(key, "save returned no id");
                }
            },
            (OutboxOp::Delete { .. }, PersistOutcome::Deleted) => {
                self.outbox.mark_acked(event.seq);
            }
            (op, PersistOutcome::Failed(e)) => {
                log::error!("Request #{} failed, keeping local state: {}", event.seq, e);
                self.outbox.mark_failed(event.seq, e.to_string());
                if let OutboxOp::Create { key } = op {
                    self.drop_deferred_delete(key, "save failed");
                }
            }
            (op, outcome) => {
                log::warn!("Mismatched outcome for {:?}: {:?}", op, outcome);
                self.outbox.mark_failed(event.seq, "unexpected response");
            }
        }
    }

    /// Record a service id, or forward a delete that was waiting on it.
    fn on_saved(&mut self, key: ShapeKey, id: String) {
        if self.store.assign_id(key, id.clone()) {
            return;
        }
        match self.outbox.deferred_delete(key) {
            Some(seq) => {
                log::info!("Sending deferred delete for {}", id);
                self.outbox.activate_delete(seq, id.clone());
                self.dispatch(seq, PersistRequest::Delete(id));
            }
            None => log::warn!("Saved shape {} is no longer in the store", id),
        }
    }

    fn drop_deferred_delete(&mut self, key: ShapeKey, reason: &str) {
        if let Some(seq) = self.outbox.deferred_delete(key) {
            self.outbox.mark_skipped(seq, reason);
        }
    }

    /// Prepend fetched shapes, shifting held indices.
    fn seed(&mut self, records: Vec<ShapeRecord>) {
        let total = records.len();
        let shapes: Vec<Shape> = records
            .into_iter()
            .filter_map(|record| match Shape::try_from(record) {
                Ok(shape) => Some(shape),
                Err(e) => {
                    log::warn!("Dropping fetched record: {}", e);
                    None
                }
            })
            .collect();
        let inserted = self.store.prepend(shapes);
        self.state.shift_indices(inserted);
        log::info!("Loaded {} of {} stored shapes", inserted, total);
        if inserted > 0 {
            self.touch();
        }
    }
}
