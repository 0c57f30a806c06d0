//! Moving the dragged element next to the element it was dropped on.

use itertools::Itertools as _;

use super::host::{Dom, DomError, ElementId};

/// Where the dragged element goes relative to the beneath element.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Placement<T> {
    After(T),
    Before(T),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Reorder<T> {
    pub order: Vec<T>,
    pub placement: Placement<T>,
}

/// Reorder `sequence` so `dragged` sits next to `beneath`.
///
/// A dragged element that came before `beneath` lands right after it; one that came after lands
/// right before it. Returns `None` when there is nothing to do: no `beneath`, `beneath == dragged`,
/// or either element is missing from `sequence`.
pub fn reorder<T: Copy + PartialEq>(
    sequence: &[T],
    dragged: T,
    beneath: Option<T>,
) -> Option<Reorder<T>> {
    let beneath = beneath?;
    if beneath == dragged {
        return None;
    }

    let (drag_index, _) = sequence.iter().find_position(|&&e| e == dragged)?;
    let (found_index, _) = sequence.iter().find_position(|&&e| e == beneath)?;
    let before = drag_index < found_index;

    let mut order = sequence.to_vec();
    let placement = if before {
        order.insert(found_index + 1, dragged);
        order.remove(drag_index);
        Placement::After(beneath)
    } else {
        order.remove(drag_index);
        order.insert(found_index, dragged);
        Placement::Before(beneath)
    };

    Some(Reorder { order, placement })
}

/// Perform `placement` for `dragged` in the host tree.
///
/// Nothing is moved when `beneath` lives inside `dragged`. If the host rejects the insert after
/// the removal, `dragged` is put back where it was.
pub fn relocate(
    dom: &mut (impl Dom + ?Sized),
    dragged: ElementId,
    placement: Placement<ElementId>,
) -> Result<(), DomError> {
    let (Placement::After(beneath) | Placement::Before(beneath)) = placement;
    let target_parent = dom
        .parent(beneath)
        .ok_or(DomError::UnknownElement(beneath))?;
    if is_inclusive_ancestor(&*dom, dragged, target_parent) {
        return Err(DomError::HierarchyRequest {
            parent: target_parent,
            child: dragged,
        });
    }

    let origin = dom
        .parent(dragged)
        .map(|parent| (parent, dom.next_sibling(dragged)));
    if let Some((parent, _)) = origin {
        dom.remove_child(parent, dragged)?;
    }

    let reference = match placement {
        Placement::After(beneath) => dom.next_sibling(beneath),
        Placement::Before(beneath) => Some(beneath),
    };
    let result = dom.insert_before(target_parent, dragged, reference);

    if let (Err(err), Some((parent, next))) = (&result, origin) {
        log::warn!("relocate {dragged:?} failed ({err}), restoring it under {parent:?}");
        if let Err(restore) = dom.insert_before(parent, dragged, next) {
            log::warn!("restoring {dragged:?} failed: {restore}");
        }
    }
    result
}

/// Whether `node` is `ancestor` or lies inside it.
pub fn is_inclusive_ancestor(
    dom: &(impl Dom + ?Sized),
    ancestor: ElementId,
    node: ElementId,
) -> bool {
    let mut visited: ahash::HashSet<ElementId> = Default::default();
    let mut current = Some(node);
    while let Some(id) = current {
        if id == ancestor {
            return true;
        }
        if !visited.insert(id) {
            return false;
        }
        current = dom.parent(id);
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn earlier_item_goes_after_beneath() {
        let r = reorder(&['a', 'b', 'c'], 'a', Some('c')).unwrap();
        assert_eq!(r.order, vec!['b', 'c', 'a']);
        assert_eq!(r.placement, Placement::After('c'));
    }

    #[test]
    fn later_item_goes_before_beneath() {
        let r = reorder(&['a', 'b', 'c'], 'c', Some('a')).unwrap();
        assert_eq!(r.order, vec!['c', 'a', 'b']);
        assert_eq!(r.placement, Placement::Before('a'));
    }

    #[test]
    fn adjacent_swap() {
        let r = reorder(&[1, 2, 3, 4], 2, Some(3)).unwrap();
        assert_eq!(r.order, vec![1, 3, 2, 4]);
        let r = reorder(&[1, 2, 3, 4], 3, Some(2)).unwrap();
        assert_eq!(r.order, vec![1, 3, 2, 4]);
    }

    #[test]
    fn nothing_to_do() {
        assert_eq!(reorder(&[1, 2, 3], 1, None), None);
        assert_eq!(reorder(&[1, 2, 3], 2, Some(2)), None);
        assert_eq!(reorder(&[1, 2, 3], 9, Some(2)), None);
        assert_eq!(reorder(&[1, 2, 3], 1, Some(9)), None);
    }
}
