use egui::Rect;

use super::event::DeliveryStyle;
use super::style::ComputedStyle;

/// Opaque handle to a host element.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ElementId(pub u64);

/// Something a listener can be attached to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EventTarget {
    Document,
    Element(ElementId),
}

impl EventTarget {
    pub fn element(self) -> Option<ElementId> {
        match self {
            Self::Document => None,
            Self::Element(id) => Some(id),
        }
    }
}

impl From<ElementId> for EventTarget {
    fn from(id: ElementId) -> Self {
        Self::Element(id)
    }
}

/// Handle returned by [`EventSource::add_listener`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ListenerId(pub u64);

/// Handle returned by [`FrameScheduler::request_animation_frame`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FrameId(pub u64);

/// Layout metrics used when the host can't answer a bounding-rect query.
///
/// `None` stands for a metric the host reports as non-numeric.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct OffsetMetrics {
    pub offset_left: Option<f32>,
    pub offset_top: Option<f32>,
    pub scroll_left: Option<f32>,
    pub scroll_top: Option<f32>,
    pub offset_parent: Option<ElementId>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DomError {
    UnknownElement(ElementId),
    NotAChild { parent: ElementId, child: ElementId },
    /// Inserting `child` under `parent` would make it its own ancestor.
    HierarchyRequest { parent: ElementId, child: ElementId },
    InvalidSelector(String),
}

impl std::fmt::Display for DomError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownElement(id) => write!(f, "unknown element {id:?}"),
            Self::NotAChild { parent, child } => {
                write!(f, "{child:?} is not a child of {parent:?}")
            }
            Self::HierarchyRequest { parent, child } => {
                write!(f, "{child:?} can't be inserted into its own descendant {parent:?}")
            }
            Self::InvalidSelector(selector) => write!(f, "invalid selector: {selector:?}"),
        }
    }
}

impl std::error::Error for DomError {}

/// Element styling, attributes and tree mutation.
pub trait Dom {
    fn computed_style(&self, element: ElementId) -> ComputedStyle;

    /// Bounding box in document coordinates, or `None` if the host has no direct query.
    fn bounding_rect(&self, element: ElementId) -> Option<Rect>;

    fn offset_metrics(&self, element: ElementId) -> OffsetMetrics;

    /// Set an inline style property. An empty value clears it.
    fn set_style(&mut self, element: ElementId, property: &str, value: &str);

    fn set_attribute(&mut self, element: ElementId, name: &str, value: &str);

    fn remove_attribute(&mut self, element: ElementId, name: &str);

    /// Descendants of `root` matching `selector`, in document order.
    fn query_selector_all(&self, root: ElementId, selector: &str)
    -> Result<Vec<ElementId>, DomError>;

    fn parent(&self, element: ElementId) -> Option<ElementId>;

    fn next_sibling(&self, element: ElementId) -> Option<ElementId>;

    fn remove_child(&mut self, parent: ElementId, child: ElementId) -> Result<(), DomError>;

    /// Insert `child` into `parent` before `reference`, or at the end when `reference` is `None`.
    fn insert_before(
        &mut self,
        parent: ElementId,
        child: ElementId,
        reference: Option<ElementId>,
    ) -> Result<(), DomError>;
}

/// Event subscription.
///
/// The host delivers subscribed events back through
/// [`super::SortableDrag::handle_event`] with the id returned here.
pub trait EventSource {
    fn delivery_style(&self) -> DeliveryStyle;

    fn add_listener(&mut self, target: EventTarget, name: &str) -> ListenerId;

    fn remove_listener(&mut self, id: ListenerId);
}

/// "Run this before the next repaint", cancelable.
///
/// Scheduled frames are delivered through [`super::SortableDrag::on_animation_frame`].
pub trait FrameScheduler {
    fn request_animation_frame(&mut self) -> FrameId;

    fn cancel_animation_frame(&mut self, id: FrameId);
}

/// Everything the drag controller needs from its host.
pub trait Host: Dom + EventSource + FrameScheduler {}

impl<T: Dom + EventSource + FrameScheduler> Host for T {}
