use super::event::DragEvent;

/// Callbacks for the drag lifecycle. Every method defaults to doing nothing.
pub trait DragHooks {
    /// The drag became visible: immediately in manual mode, on the platform `dragstart` otherwise.
    fn on_drag_start(&mut self, _event: &DragEvent) {}

    /// Pointer moved during a manual drag.
    fn on_drag(&mut self, _event: &DragEvent) {}

    /// Platform `dragover` during a native drag.
    fn on_drag_over(&mut self, _event: &DragEvent) {}

    /// The drag finished, before any reorder.
    fn on_drag_end(&mut self, _event: &DragEvent) {}

    /// The pointer entered a tracked element (sort mode, native drag).
    fn on_drag_enter(&mut self, _event: &DragEvent) {}

    /// Platform `drop` on the dragged element.
    fn on_drop(&mut self, _event: &DragEvent) {}
}

/// Hooks that ignore everything.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoHooks;

impl DragHooks for NoHooks {}
