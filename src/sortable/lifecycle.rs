use super::driver::Begin;
use super::event::{DragEvent, EventKind, EventResponse};
use super::geometry::{element_under_pointer, measure};
use super::host::{ElementId, EventTarget, Host};
use super::listeners::{Role, Scope};
use super::render;
use super::reorder::{is_inclusive_ancestor, relocate, reorder};
use super::session::DragPhase;
use super::style::{Position, ZIndex};
use super::SortableDrag;

impl SortableDrag {
    /// IDLE → ARMED: pointer went down on a handle of `element`.
    pub(super) fn grab(&mut self, host: &mut dyn Host, element: ElementId) -> EventResponse {
        if self.session.phase != DragPhase::Idle {
            log::trace!("grab {element:?} ignored in {:?}", self.session.phase);
            return EventResponse::STOP;
        }

        self.session.phase = DragPhase::Armed { element };
        self.listeners.add(
            host,
            EventTarget::Element(element),
            EventKind::MouseMove,
            Role::ArmMove { element },
            Scope::Pending,
        );
        self.listeners.add(
            host,
            EventTarget::Document,
            EventKind::MouseUp,
            Role::Release,
            Scope::Drag,
        );

        log::debug!("arm {element:?}");
        self.debug_log_event(format!("arm {element:?}"));
        EventResponse::STOP
    }

    pub(super) fn arm_move(
        &mut self,
        host: &mut dyn Host,
        element: ElementId,
        event: &DragEvent,
    ) -> EventResponse {
        if self.session.phase != (DragPhase::Armed { element }) {
            return EventResponse::IGNORED;
        }
        self.promote(host, element, event);
        EventResponse::PREVENT
    }

    /// ARMED → ACTIVE.
    fn promote(&mut self, host: &mut dyn Host, element: ElementId, event: &DragEvent) {
        self.listeners.release(host, Scope::Pending);

        let geometry = measure(&*host, element);
        self.prepare_item(host, element);
        let offset = render::origin_offset(&*host, element);
        self.session.begin(element, event.pos, geometry, offset);

        log::debug!(
            "promote {element:?} at {:?} mode={} z={}",
            event.pos,
            self.driver.name(),
            self.session.z_counter
        );
        self.debug_log_event(format!(
            "promote {element:?} pointer={:?} rect={geometry:?} mode={}",
            event.pos,
            self.driver.name()
        ));

        match self.driver.begin(host, &mut self.listeners, element) {
            Begin::StartNow => self.start(host, event),
            Begin::AwaitPlatformStart => {}
        }
    }

    /// Make `item` positionable and put it above everything grabbed before.
    fn prepare_item(&mut self, host: &mut dyn Host, item: ElementId) {
        let style = host.computed_style(item);
        if style.position() == Position::Static {
            host.set_style(item, "position", "relative");
        }
        if let ZIndex::Value(z) = style.z_index() {
            self.session.observe_z_index(z);
        }
        let z = self.session.next_z_index();
        host.set_style(item, "z-index", &z.to_string());
    }

    /// The drag is under way: immediately in manual mode, on `dragstart` in native mode.
    pub(super) fn start(&mut self, host: &mut dyn Host, event: &DragEvent) {
        if self.session.drag_item.is_none() || self.session.dragging {
            return;
        }
        self.session.dragging = true;
        self.hooks.on_drag_start(event);
        self.debug_log_event("start");

        if self.driver.animates() {
            self.animate(host);
        }
    }

    /// Render one frame and schedule the next; stops the chain once the drag is over.
    pub(super) fn animate(&mut self, host: &mut dyn Host) {
        if !self.session.dragging {
            return;
        }
        let Some(item) = self.session.drag_item else {
            return;
        };

        log::trace!("frame {item:?} delta={:?}", self.session.delta());
        self.renderer.frame(host, item, &self.session);

        if self.session.pending_frame.is_none() {
            self.session.pending_frame = Some(host.request_animation_frame());
        }
    }

    pub(super) fn pointer_move(&mut self, host: &mut dyn Host, event: &DragEvent) -> EventResponse {
        let Some(item) = self.session.drag_item else {
            return EventResponse::IGNORED;
        };
        self.session.live_point = event.pos;

        if self.options.manual_hit_test(self.capabilities.native_drag_and_drop) {
            self.hit_test_beneath(host, item, event);
        }

        self.hooks.on_drag(event);
        EventResponse::CAPTURE
    }

    /// Manual-mode stand-in for enter events: another tracked element under the pointer becomes
    /// beneath; the dragged element's own slot clears it.
    fn hit_test_beneath(&mut self, host: &mut dyn Host, item: ElementId, event: &DragEvent) {
        let hit = element_under_pointer(&*host, &self.tracked, item, event.pos);
        let previous = self.session.beneath;

        if hit.is_some() {
            self.session.beneath = hit;
        } else if self
            .session
            .origin_geometry
            .is_some_and(|rect| rect.contains(event.pos))
        {
            self.session.beneath = None;
        }

        if self.session.beneath != previous {
            log::trace!("beneath {previous:?} -> {:?}", self.session.beneath);
        }
    }

    pub(super) fn drag_over(&mut self, event: &DragEvent) -> EventResponse {
        if self.session.drag_item.is_none() {
            return EventResponse::IGNORED;
        }
        self.session.live_point = event.pos;
        self.hooks.on_drag_over(event);
        EventResponse::PREVENT
    }

    /// Platform drag entered tracked `element`: last enter wins.
    pub(super) fn enter(&mut self, element: ElementId, event: &DragEvent) -> EventResponse {
        if !self.options.sort || self.session.phase != DragPhase::Active {
            return EventResponse::STOP;
        }

        self.session.beneath = None;
        if event.normalized && self.session.drag_item != Some(element) {
            self.session.beneath = Some(element);
        }

        self.hooks.on_drag_enter(event);
        EventResponse::STOP
    }

    pub(super) fn drop(&mut self, host: &mut dyn Host, event: &DragEvent) -> EventResponse {
        if self.session.drag_item.is_none() {
            return EventResponse::IGNORED;
        }
        self.hooks.on_drop(event);
        self.end_drag(host, event);
        EventResponse::STOP
    }

    pub(super) fn release(&mut self, host: &mut dyn Host, event: &DragEvent) -> EventResponse {
        match self.session.phase {
            DragPhase::Idle => {}
            DragPhase::Armed { element } => self.disarm(host, element),
            DragPhase::Active => self.end_drag(host, event),
        }
        EventResponse::IGNORED
    }

    /// ARMED → IDLE: released without moving.
    fn disarm(&mut self, host: &mut dyn Host, element: ElementId) {
        let removed = self.listeners.release(host, Scope::Pending)
            + self.listeners.release(host, Scope::Drag);
        self.session.reset();
        log::debug!("disarm {element:?} (click without drag)");
        self.debug_log_event(format!("disarm {element:?} removed={removed}"));
    }

    /// ACTIVE → IDLE, sorting on the way when enabled.
    pub(super) fn end_drag(&mut self, host: &mut dyn Host, event: &DragEvent) {
        let Some(item) = self.session.drag_item else {
            return;
        };

        let removed = self.finish_movement(host, item);
        self.hooks.on_drag_end(event);

        log::debug!("end {item:?} removed={removed} beneath={:?}", self.session.beneath);
        self.debug_log_event(format!(
            "end {item:?} removed={removed} beneath={:?} {}",
            self.session.beneath,
            self.debug_listener_summary()
        ));

        if self.options.sort {
            self.sort_dropped(host, item);
        }
        self.session.reset();
    }

    /// End a drag without hooks or reordering; used by `detach`.
    pub(super) fn abort_drag(&mut self, host: &mut dyn Host) {
        match self.session.phase {
            DragPhase::Idle => {}
            DragPhase::Armed { element } => self.disarm(host, element),
            DragPhase::Active => {
                if let Some(item) = self.session.drag_item {
                    let removed = self.finish_movement(host, item);
                    log::debug!("abort {item:?} removed={removed}");
                }
                self.session.reset();
            }
        }
    }

    /// Tear down everything the drag set up on the host and settle the element.
    fn finish_movement(&mut self, host: &mut dyn Host, item: ElementId) -> usize {
        self.driver.end(host, item);
        let removed = self.listeners.release(host, Scope::Pending)
            + self.listeners.release(host, Scope::Drag);

        self.session.dragging = false;
        if let Some(frame) = self.session.pending_frame.take() {
            host.cancel_animation_frame(frame);
        }

        self.renderer.settle(host, item, &self.session);
        self.session.zero_points();
        removed
    }

    fn sort_dropped(&mut self, host: &mut dyn Host, item: ElementId) {
        host.remove_attribute(item, "style");

        let inside = self.session.beneath.filter(|&b| is_inclusive_ancestor(&*host, item, b));
        if let Some(beneath) = inside {
            log::debug!("sort: {beneath:?} is inside {item:?}, not reordering");
            self.debug_log_event(format!("sort: {beneath:?} is inside the dragged element"));
            self.session.beneath = None;
            return;
        }

        let Some(result) = reorder(&self.tracked, item, self.session.beneath) else {
            self.debug_log_event("sort: nothing beneath");
            return;
        };

        match relocate(host, item, result.placement) {
            Ok(()) => {
                log::debug!("reorder {item:?} {:?}", result.placement);
                self.debug_log_event(format!(
                    "reorder {item:?} {:?} order={:?}",
                    result.placement, result.order
                ));
                self.tracked = result.order;
            }
            Err(err) => {
                log::warn!("reorder {item:?} {:?} failed: {err}", result.placement);
                self.debug_log_event(format!("reorder failed: {err}"));
            }
        }
        self.session.beneath = None;
    }
}
