use egui::Vec2;

use super::capability::{Capabilities, TransformProperty};
use super::host::{Dom, ElementId};
use super::session::DragSession;
use super::style::{Position, px};

/// How the dragged element is drawn while it follows the pointer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Renderer {
    /// Visual offset through a 2D translation; never touches layout.
    Transform(TransformProperty),
    /// Writes `left`/`top`.
    Layout,
}

impl Renderer {
    pub fn select(capabilities: &Capabilities) -> Self {
        capabilities
            .transform
            .map_or(Self::Layout, Self::Transform)
    }

    /// Draw one animation frame of the drag.
    pub(super) fn frame(self, dom: &mut (impl Dom + ?Sized), item: ElementId, session: &DragSession) {
        match self {
            Self::Transform(property) => {
                dom.set_style(item, property.name(), &property.offset(session.delta()));
            }
            Self::Layout => write_layout(dom, item, session),
        }
    }

    /// Commit the final position through `left`/`top`, dropping any transform offset so the two
    /// don't add up.
    pub(super) fn settle(self, dom: &mut (impl Dom + ?Sized), item: ElementId, session: &DragSession) {
        if let Self::Transform(property) = self {
            dom.set_style(item, property.name(), "");
        }
        write_layout(dom, item, session);
    }
}

fn write_layout(dom: &mut (impl Dom + ?Sized), item: ElementId, session: &DragSession) {
    let pos = session.origin_offset + session.delta();
    dom.set_style(item, "left", &px(pos.x));
    dom.set_style(item, "top", &px(pos.y));
}

/// The `left`/`top` the element starts from, read once when the drag becomes active.
///
/// Relative elements move from their own offsets (unparsable → 0). Other positioned elements
/// without numeric offsets start from their offset within the positioned ancestor.
pub(super) fn origin_offset(dom: &(impl Dom + ?Sized), item: ElementId) -> Vec2 {
    let style = dom.computed_style(item);
    let (left, top) = (style.left_px(), style.top_px());

    if style.position() == Position::Relative {
        return Vec2::new(left.unwrap_or(0) as f32, top.unwrap_or(0) as f32);
    }

    let metrics = dom.offset_metrics(item);
    Vec2::new(
        left.map_or(metrics.offset_left.unwrap_or(0.0), |v| v as f32),
        top.map_or(metrics.offset_top.unwrap_or(0.0), |v| v as f32),
    )
}
