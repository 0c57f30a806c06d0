#![forbid(unsafe_code)]

pub mod memory_dom;
pub mod sortable;

pub use memory_dom::MemoryDom;
pub use sortable::{
    Capabilities, CapabilityProbe, DragEvent, DragHooks, DragPhase, ElementId, EventKind,
    EventResponse, EventTarget, Host, RawEvent, SortableDrag, SortableOptions,
};
