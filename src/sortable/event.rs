//! Event normalization: one event shape regardless of how the host delivers events.

use egui::Pos2;

use super::host::{EventSource, EventTarget, ListenerId};

/// The events the drag controller subscribes to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EventKind {
    MouseDown,
    MouseMove,
    MouseUp,
    DragStart,
    DragEnd,
    DragOver,
    DragEnter,
    Drop,
}

impl EventKind {
    pub const ALL: [Self; 8] = [
        Self::MouseDown,
        Self::MouseMove,
        Self::MouseUp,
        Self::DragStart,
        Self::DragEnd,
        Self::DragOver,
        Self::DragEnter,
        Self::Drop,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::MouseDown => "mousedown",
            Self::MouseMove => "mousemove",
            Self::MouseUp => "mouseup",
            Self::DragStart => "dragstart",
            Self::DragEnd => "dragend",
            Self::DragOver => "dragover",
            Self::DragEnter => "dragenter",
            Self::Drop => "drop",
        }
    }
}

/// How the host names events when subscribing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DeliveryStyle {
    /// `add_listener(target, "mousedown")`.
    #[default]
    Standard,

    /// Handler-slot style: `add_listener(target, "onmousedown")`.
    Legacy,
}

impl DeliveryStyle {
    pub fn event_name(self, kind: EventKind) -> String {
        match self {
            Self::Standard => kind.name().to_owned(),
            Self::Legacy => format!("on{}", kind.name()),
        }
    }
}

/// Subscribe to `kind` on `target`, naming the event the way the host expects.
pub(crate) fn subscribe(
    host: &mut (impl EventSource + ?Sized),
    target: EventTarget,
    kind: EventKind,
) -> ListenerId {
    let name = host.delivery_style().event_name(kind);
    host.add_listener(target, &name)
}

/// An event record as a host hands it over.
///
/// Standard hosts fill `page_x`/`page_y` and `target`; legacy hosts may only provide
/// `x`/`y` and `src_element`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RawEvent {
    pub page_x: Option<f32>,
    pub page_y: Option<f32>,
    pub x: Option<f32>,
    pub y: Option<f32>,
    pub target: Option<EventTarget>,
    pub src_element: Option<EventTarget>,
}

impl RawEvent {
    /// A standard pointer event at `pos` in page coordinates.
    pub fn at(pos: Pos2, target: impl Into<EventTarget>) -> Self {
        Self {
            page_x: Some(pos.x),
            page_y: Some(pos.y),
            target: Some(target.into()),
            ..Default::default()
        }
    }

    /// A legacy event that only carries `x`/`y` and `src_element`.
    pub fn legacy_at(pos: Pos2, src_element: impl Into<EventTarget>) -> Self {
        Self {
            x: Some(pos.x),
            y: Some(pos.y),
            src_element: Some(src_element.into()),
            ..Default::default()
        }
    }
}

/// The normalized event every hook and handler sees.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DragEvent {
    /// Pointer position in document coordinates.
    pub pos: Pos2,
    pub target: Option<EventTarget>,

    /// The target the listener was registered on.
    pub current_target: Option<EventTarget>,

    /// `true` when built by [`normalize`]; beneath detection ignores anything else.
    pub normalized: bool,
}

impl DragEvent {
    pub fn new(pos: Pos2, target: Option<EventTarget>) -> Self {
        Self {
            pos,
            target,
            current_target: target,
            normalized: false,
        }
    }
}

pub fn normalize(raw: &RawEvent, current_target: EventTarget) -> DragEvent {
    // A zero page coordinate is indistinguishable from a missing one on some hosts.
    fn coordinate(page: Option<f32>, fallback: Option<f32>) -> f32 {
        match (page, fallback) {
            (Some(p), _) if p != 0.0 => p,
            (_, Some(v)) if v != 0.0 => v,
            (p, _) => p.unwrap_or(0.0),
        }
    }

    DragEvent {
        pos: Pos2::new(coordinate(raw.page_x, raw.x), coordinate(raw.page_y, raw.y)),
        target: raw.target.or(raw.src_element),
        current_target: Some(current_target),
        normalized: true,
    }
}

/// What the host should do with the event it delivered.
#[must_use]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EventResponse {
    pub prevent_default: bool,
    pub stop_propagation: bool,
}

impl EventResponse {
    pub const IGNORED: Self = Self {
        prevent_default: false,
        stop_propagation: false,
    };

    pub const PREVENT: Self = Self {
        prevent_default: true,
        stop_propagation: false,
    };

    pub const STOP: Self = Self {
        prevent_default: false,
        stop_propagation: true,
    };

    pub const CAPTURE: Self = Self {
        prevent_default: true,
        stop_propagation: true,
    };
}
