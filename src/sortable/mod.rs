use std::collections::VecDeque;

use egui::{Pos2, Rect};

mod capability;
mod debug;
mod driver;
mod event;
mod geometry;
mod hooks;
mod host;
mod lifecycle;
mod listeners;
mod options;
mod render;
mod reorder;
mod session;
mod style;

#[cfg(test)]
mod reorder_tests;

pub use capability::{Capabilities, CapabilityProbe, TRANSFORM_PROPERTIES, TransformProperty};
pub use event::{DeliveryStyle, DragEvent, EventKind, EventResponse, RawEvent, normalize};
pub use geometry::measure;
pub use hooks::{DragHooks, NoHooks};
pub use host::{
    Dom, DomError, ElementId, EventSource, EventTarget, FrameId, FrameScheduler, Host, ListenerId,
    OffsetMetrics,
};
pub use options::SortableOptions;
pub use render::Renderer;
pub use reorder::{Placement, Reorder, is_inclusive_ancestor, relocate, reorder};
pub use session::DragPhase;
pub use style::{ComputedStyle, Position, ZIndex, parse_leading_int};

use driver::DragDriver;
use event::EventKind as Kind;
use listeners::{ListenerSet, Role, Scope};
use session::DragSession;

/// Drag (and optionally sort) a set of host elements with the pointer.
///
/// Lifecycle per drag: `Idle → Armed → Active → Idle`.
/// - Pointer-down on a handle arms the element; a click without movement never starts a drag.
/// - The first move on the armed element makes the drag active.
/// - Release, `drop` or `dragend` ends it; in sort mode the element is then moved next to the
///   tracked element it was dropped on.
///
/// The host feeds events in through [`Self::handle_event`] and animation frames through
/// [`Self::on_animation_frame`]. Whether the platform drags natively or the controller simulates it
/// from pointer moves is decided once, from the [`Capabilities`] given at construction.
pub struct SortableDrag {
    options: SortableOptions,
    capabilities: Capabilities,
    renderer: Renderer,
    driver: Box<dyn DragDriver>,
    hooks: Box<dyn DragHooks>,

    session: DragSession,

    /// Sort order; only populated in sort mode.
    tracked: Vec<ElementId>,
    attached: ahash::HashSet<ElementId>,
    listeners: ListenerSet,

    debug_log: VecDeque<String>,
}

impl std::fmt::Debug for SortableDrag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SortableDrag")
            .field("options", &self.options)
            .field("capabilities", &self.capabilities)
            .field("renderer", &self.renderer)
            .field("driver", &self.driver)
            .field("session", &self.session)
            .field("tracked", &self.tracked)
            .field("listeners", &self.listeners.len())
            .finish_non_exhaustive()
    }
}

impl SortableDrag {
    pub fn new(capabilities: Capabilities, options: SortableOptions) -> Self {
        Self {
            renderer: Renderer::select(&capabilities),
            driver: driver::for_capabilities(&capabilities),
            hooks: Box::new(NoHooks),
            options,
            capabilities,
            session: DragSession::default(),
            tracked: Vec::new(),
            attached: Default::default(),
            listeners: ListenerSet::default(),
            debug_log: VecDeque::new(),
        }
    }

    /// Build a controller and [`Self::attach`] `elements` in one go.
    pub fn attach_new(
        host: &mut dyn Host,
        capabilities: Capabilities,
        elements: impl IntoIterator<Item = ElementId>,
        options: SortableOptions,
    ) -> Result<Self, DomError> {
        let mut drag = Self::new(capabilities, options);
        drag.attach(host, elements)?;
        Ok(drag)
    }

    #[must_use]
    pub fn with_hooks(mut self, hooks: impl DragHooks + 'static) -> Self {
        self.hooks = Box::new(hooks);
        self
    }

    pub fn set_hooks(&mut self, hooks: impl DragHooks + 'static) {
        self.hooks = Box::new(hooks);
    }

    /// Start tracking `elements`.
    ///
    /// Registers a pointer-down listener on each handle (the element itself, or every descendant
    /// matching [`SortableOptions::handle`]). In sort mode the elements are appended to the sort
    /// order, and with platform drag-and-drop each one also gets an enter listener.
    ///
    /// Elements that are already attached are skipped, so calling this twice never registers a
    /// listener twice. Returns the number of newly attached elements. If the host rejects the
    /// handle selector nothing from this call is registered.
    pub fn attach(
        &mut self,
        host: &mut dyn Host,
        elements: impl IntoIterator<Item = ElementId>,
    ) -> Result<usize, DomError> {
        let mut plan: Vec<(ElementId, Vec<ElementId>)> = Vec::new();
        for element in elements {
            if self.attached.contains(&element) || plan.iter().any(|(e, _)| *e == element) {
                log::debug!("attach: {element:?} already attached, skipping");
                continue;
            }
            let handles = match &self.options.handle {
                Some(selector) => host.query_selector_all(element, selector)?,
                None => vec![element],
            };
            plan.push((element, handles));
        }

        let count = plan.len();
        for (element, handles) in plan {
            if let ZIndex::Value(z) = host.computed_style(element).z_index() {
                self.session.observe_z_index(z);
            }

            if self.options.sort {
                self.tracked.push(element);
                if self.capabilities.native_drag_and_drop {
                    self.listeners.add(
                        host,
                        EventTarget::Element(element),
                        Kind::DragEnter,
                        Role::Enter { element },
                        Scope::Attached,
                    );
                }
            }

            if handles.is_empty() {
                log::debug!("attach: {element:?} has no handles, it can't be grabbed");
            }
            for handle in handles {
                self.listeners.add(
                    host,
                    EventTarget::Element(handle),
                    Kind::MouseDown,
                    Role::Grab { element },
                    Scope::Attached,
                );
            }

            self.attached.insert(element);
        }

        if count > 0 {
            self.debug_log_event(format!(
                "attach count={count} mode={} {}",
                self.driver.name(),
                self.debug_listener_summary()
            ));
        }
        Ok(count)
    }

    /// Stop tracking everything: ends a drag in progress without reordering and removes every
    /// listener this controller added.
    pub fn detach(&mut self, host: &mut dyn Host) {
        self.abort_drag(host);
        let removed = self.listeners.release(host, Scope::Attached);
        self.tracked.clear();
        self.attached.clear();
        log::debug!("detach: removed {removed} listeners");
        self.debug_log_event(format!("detach removed={removed}"));
    }

    /// Deliver an event for a listener this controller subscribed.
    ///
    /// Unknown (or already removed) listener ids are ignored.
    pub fn handle_event(
        &mut self,
        host: &mut dyn Host,
        listener: ListenerId,
        raw: &RawEvent,
    ) -> EventResponse {
        let Some(binding) = self.listeners.get(listener).copied() else {
            return EventResponse::IGNORED;
        };
        let event = normalize(raw, binding.target);

        match binding.role {
            Role::Grab { element } => self.grab(host, element),
            Role::Enter { element } => self.enter(element, &event),
            Role::ArmMove { element } => self.arm_move(host, element, &event),
            Role::Release => self.release(host, &event),
            Role::PointerMove => self.pointer_move(host, &event),
            Role::NativeStart => {
                self.start(host, &event);
                EventResponse::IGNORED
            }
            Role::NativeEnd => {
                self.end_drag(host, &event);
                EventResponse::IGNORED
            }
            Role::NativeOver => self.drag_over(&event),
            Role::NativeDrop => self.drop(host, &event),
        }
    }

    /// Deliver an animation frame requested by this controller.
    pub fn on_animation_frame(&mut self, host: &mut dyn Host, frame: FrameId) {
        if self.session.pending_frame != Some(frame) {
            return;
        }
        self.session.pending_frame = None;
        self.animate(host);
    }

    pub fn options(&self) -> &SortableOptions {
        &self.options
    }

    pub fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    pub fn renderer(&self) -> Renderer {
        self.renderer
    }

    /// `"native"` or `"manual"`.
    pub fn mode_name(&self) -> &'static str {
        self.driver.name()
    }

    pub fn phase(&self) -> DragPhase {
        self.session.phase
    }

    pub fn is_dragging(&self) -> bool {
        self.session.dragging
    }

    pub fn drag_item(&self) -> Option<ElementId> {
        self.session.drag_item
    }

    pub fn beneath(&self) -> Option<ElementId> {
        self.session.beneath
    }

    pub fn start_point(&self) -> Pos2 {
        self.session.start_point
    }

    pub fn live_point(&self) -> Pos2 {
        self.session.live_point
    }

    pub fn origin_geometry(&self) -> Option<Rect> {
        self.session.origin_geometry
    }

    pub fn z_counter(&self) -> i64 {
        self.session.z_counter
    }

    pub fn pending_frame(&self) -> Option<FrameId> {
        self.session.pending_frame
    }

    /// Tracked elements in sort order (empty unless sorting).
    pub fn tracked_elements(&self) -> &[ElementId] {
        &self.tracked
    }

    /// Number of host listeners this controller currently holds.
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Listeners that only live while a drag is armed or active.
    pub fn drag_listener_count(&self) -> usize {
        self.listeners.count(Scope::Pending) + self.listeners.count(Scope::Drag)
    }
}
