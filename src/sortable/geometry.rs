use egui::{Pos2, Rect, Vec2};

use super::host::{Dom, ElementId};

/// Bounding box of `element` in document coordinates.
///
/// Uses the host's direct query when available, otherwise walks the offset-parent chain.
pub fn measure(dom: &(impl Dom + ?Sized), element: ElementId) -> Rect {
    if let Some(rect) = dom.bounding_rect(element) {
        return rect;
    }

    let min = offset_chain_origin(dom, element);
    let style = dom.computed_style(element);
    let size = Vec2::new(style.width_px() as f32, style.height_px() as f32);
    Rect::from_min_size(min, size)
}

fn offset_chain_origin(dom: &(impl Dom + ?Sized), element: ElementId) -> Pos2 {
    let mut pos = Pos2::ZERO;
    let mut visited: ahash::HashSet<ElementId> = Default::default();
    let mut current = Some(element);

    while let Some(id) = current {
        if !visited.insert(id) {
            log::warn!("offset-parent chain of {element:?} loops at {id:?}");
            break;
        }
        let m = dom.offset_metrics(id);
        pos.x += m.offset_left.unwrap_or(0.0) - m.scroll_left.unwrap_or(0.0);
        pos.y += m.offset_top.unwrap_or(0.0) - m.scroll_top.unwrap_or(0.0);
        current = m.offset_parent;
    }

    pos
}

/// The first of `candidates` (other than `exclude`) whose measured box contains `pointer`.
pub(super) fn element_under_pointer(
    dom: &(impl Dom + ?Sized),
    candidates: &[ElementId],
    exclude: ElementId,
    pointer: Pos2,
) -> Option<ElementId> {
    candidates
        .iter()
        .copied()
        .filter(|&id| id != exclude)
        .find(|&id| measure(dom, id).contains(pointer))
}
