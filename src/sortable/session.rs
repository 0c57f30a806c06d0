use egui::{Pos2, Rect, Vec2};

use super::host::{ElementId, FrameId};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DragPhase {
    #[default]
    Idle,
    /// Pointer went down on a handle of `element`; waiting for the first move.
    Armed { element: ElementId },
    /// An element is being dragged.
    Active,
}

/// Per-controller drag state. Reset after every drag, never dropped between drags.
#[derive(Debug, Default)]
pub(super) struct DragSession {
    pub(super) phase: DragPhase,
    pub(super) drag_item: Option<ElementId>,
    pub(super) beneath: Option<ElementId>,
    pub(super) start_point: Pos2,
    pub(super) live_point: Pos2,
    pub(super) origin_geometry: Option<Rect>,
    pub(super) origin_offset: Vec2,
    pub(super) z_counter: i64,
    pub(super) dragging: bool,
    pub(super) pending_frame: Option<FrameId>,
    next_drag_serial: u64,
    drag_serial: u64,
}

impl DragSession {
    pub(super) fn delta(&self) -> Vec2 {
        self.live_point - self.start_point
    }

    /// Raise the counter to `z` if it is higher; the counter never goes down.
    pub(super) fn observe_z_index(&mut self, z: i64) {
        self.z_counter = self.z_counter.max(z);
    }

    /// Pre-increment and return the z-index for a newly grabbed element.
    pub(super) fn next_z_index(&mut self) -> i64 {
        self.z_counter = self.z_counter.saturating_add(1);
        self.z_counter
    }

    pub(super) fn begin(&mut self, item: ElementId, pointer: Pos2, geometry: Rect, offset: Vec2) {
        self.next_drag_serial = self.next_drag_serial.max(1);
        self.drag_serial = self.next_drag_serial;
        self.next_drag_serial = self.next_drag_serial.saturating_add(1);

        self.phase = DragPhase::Active;
        self.drag_item = Some(item);
        self.beneath = None;
        self.start_point = pointer;
        self.live_point = pointer;
        self.origin_geometry = Some(geometry);
        self.origin_offset = offset;
    }

    pub(super) fn zero_points(&mut self) {
        self.start_point = Pos2::ZERO;
        self.live_point = Pos2::ZERO;
    }

    /// Back to idle; keeps the z counter.
    pub(super) fn reset(&mut self) {
        self.phase = DragPhase::Idle;
        self.drag_item = None;
        self.beneath = None;
        self.zero_points();
        self.origin_geometry = None;
        self.origin_offset = Vec2::ZERO;
        self.dragging = false;
        self.pending_frame = None;
    }

    /// Serial of the current (or last) drag, for log lines.
    pub(super) fn serial(&self) -> u64 {
        self.drag_serial
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn z_counter_never_decreases() {
        let mut s = DragSession::default();
        s.observe_z_index(10);
        s.observe_z_index(3);
        assert_eq!(s.z_counter, 10);
        assert_eq!(s.next_z_index(), 11);
        s.observe_z_index(5);
        assert_eq!(s.next_z_index(), 12);
    }

    #[test]
    fn reset_keeps_counter_and_clears_the_rest() {
        let mut s = DragSession::default();
        s.next_z_index();
        s.begin(
            ElementId(1),
            Pos2::new(4.0, 5.0),
            Rect::from_min_size(Pos2::ZERO, Vec2::splat(10.0)),
            Vec2::new(1.0, 2.0),
        );
        s.live_point = Pos2::new(9.0, 9.0);
        assert_eq!(s.delta(), Vec2::new(5.0, 4.0));
        assert_eq!(s.serial(), 1);

        s.reset();
        assert_eq!(s.phase, DragPhase::Idle);
        assert_eq!(s.drag_item, None);
        assert_eq!(s.start_point, Pos2::ZERO);
        assert_eq!(s.live_point, Pos2::ZERO);
        assert_eq!(s.z_counter, 1);
    }
}
