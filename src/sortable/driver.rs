use super::capability::Capabilities;
use super::event::EventKind;
use super::host::{ElementId, EventTarget, Host};
use super::listeners::{ListenerSet, Role, Scope};

/// What happens right after [`DragDriver::begin`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) enum Begin {
    /// Run the start handler now.
    StartNow,
    /// The platform will send its own `dragstart`.
    AwaitPlatformStart,
}

/// The part of the drag lifecycle that differs between platform drag-and-drop and
/// pointer-move simulation. The controller's state machine is the same for both.
pub(super) trait DragDriver: std::fmt::Debug {
    fn name(&self) -> &'static str;

    /// Subscribe to whatever moves and ends the drag of `item`.
    fn begin(&self, host: &mut dyn Host, listeners: &mut ListenerSet, item: ElementId) -> Begin;

    /// Undo the host-side effects of [`Self::begin`] that aren't listeners.
    ///
    /// Drag-scope listeners are released by the controller.
    fn end(&self, host: &mut dyn Host, item: ElementId);

    /// Whether the controller has to render animation frames itself.
    fn animates(&self) -> bool;
}

pub(super) fn for_capabilities(capabilities: &Capabilities) -> Box<dyn DragDriver> {
    if capabilities.native_drag_and_drop {
        Box::new(NativeDriver)
    } else {
        Box::new(ManualDriver)
    }
}

#[derive(Debug)]
pub(super) struct NativeDriver;

impl DragDriver for NativeDriver {
    fn name(&self) -> &'static str {
        "native"
    }

    fn begin(&self, host: &mut dyn Host, listeners: &mut ListenerSet, item: ElementId) -> Begin {
        host.set_attribute(item, "draggable", "true");

        let el = EventTarget::Element(item);
        listeners.add(host, el, EventKind::DragEnd, Role::NativeEnd, Scope::Drag);
        listeners.add(host, el, EventKind::DragStart, Role::NativeStart, Scope::Drag);
        listeners.add(
            host,
            EventTarget::Document,
            EventKind::DragOver,
            Role::NativeOver,
            Scope::Drag,
        );
        listeners.add(host, el, EventKind::Drop, Role::NativeDrop, Scope::Drag);

        Begin::AwaitPlatformStart
    }

    fn end(&self, host: &mut dyn Host, item: ElementId) {
        host.remove_attribute(item, "draggable");
    }

    fn animates(&self) -> bool {
        false
    }
}

#[derive(Debug)]
pub(super) struct ManualDriver;

impl DragDriver for ManualDriver {
    fn name(&self) -> &'static str {
        "manual"
    }

    fn begin(&self, host: &mut dyn Host, listeners: &mut ListenerSet, _item: ElementId) -> Begin {
        listeners.add(
            host,
            EventTarget::Document,
            EventKind::MouseMove,
            Role::PointerMove,
            Scope::Drag,
        );
        Begin::StartNow
    }

    fn end(&self, _host: &mut dyn Host, _item: ElementId) {}

    fn animates(&self) -> bool {
        true
    }
}
