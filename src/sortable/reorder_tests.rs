use egui::{Pos2, Rect, Vec2};
use itertools::Itertools as _;

use super::*;
use crate::memory_dom::MemoryDom;

struct Rng(u64);

impl Rng {
    fn new(seed: u64) -> Self {
        Self(seed ^ 0x5047_D2A6_0000_0001)
    }

    fn next_u64(&mut self) -> u64 {
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005u64)
            .wrapping_add(1442695040888963407u64);
        self.0
    }

    fn next_usize(&mut self, upper: usize) -> usize {
        if upper == 0 {
            return 0;
        }
        ((self.next_u64() >> 33) as usize) % upper
    }

    /// Two distinct indices below `upper` (which must be at least 2).
    fn next_pair(&mut self, upper: usize) -> (usize, usize) {
        let a = self.next_usize(upper);
        let b = (a + 1 + self.next_usize(upper - 1)) % upper;
        (a, b)
    }
}

fn column(dom: &mut MemoryDom, n: usize) -> (ElementId, Vec<ElementId>) {
    let list = dom.create_element(
        dom.root(),
        "ul",
        Rect::from_min_size(Pos2::ZERO, Vec2::new(100.0, 20.0 * n as f32)),
    );
    let items = (0..n)
        .map(|i| {
            dom.create_element(
                list,
                "li",
                Rect::from_min_size(Pos2::new(0.0, 20.0 * i as f32), Vec2::new(100.0, 20.0)),
            )
        })
        .collect();
    (list, items)
}

#[test]
fn reorder_is_a_permutation_that_keeps_everything_else_in_place() {
    let mut rng = Rng::new(1);
    for _ in 0..500 {
        let n = 2 + rng.next_usize(9);
        let seq: Vec<u32> = (0..n as u32).collect();
        let (d, b) = rng.next_pair(n);
        let (dragged, beneath) = (seq[d], seq[b]);

        let r = reorder(&seq, dragged, Some(beneath)).unwrap();

        assert_eq!(r.order.len(), n);
        assert_eq!(r.order.iter().copied().sorted().collect_vec(), seq);

        let others = |v: &[u32]| v.iter().copied().filter(|&e| e != dragged).collect_vec();
        assert_eq!(others(&r.order), others(&seq), "relative order of the rest");

        let di = r.order.iter().position(|&e| e == dragged).unwrap();
        let bi = r.order.iter().position(|&e| e == beneath).unwrap();
        if d < b {
            assert_eq!(di, bi + 1, "{seq:?} {dragged} onto {beneath}: {:?}", r.order);
            assert_eq!(r.placement, Placement::After(beneath));
        } else {
            assert_eq!(di + 1, bi, "{seq:?} {dragged} onto {beneath}: {:?}", r.order);
            assert_eq!(r.placement, Placement::Before(beneath));
        }
    }
}

#[test]
fn reorder_back_onto_the_old_neighbour_restores_the_sequence() {
    let seq = ['a', 'b', 'c', 'd', 'e'];
    let moved = reorder(&seq, 'b', Some('d')).unwrap();
    assert_eq!(moved.order, vec!['a', 'c', 'd', 'b', 'e']);

    let back = reorder(&moved.order, 'b', Some('c')).unwrap();
    assert_eq!(back.order, seq.to_vec());
}

#[test]
fn relocate_matches_reorder_in_the_host_tree() {
    let mut rng = Rng::new(2);
    for _ in 0..200 {
        let mut dom = MemoryDom::new();
        let n = 2 + rng.next_usize(7);
        let (list, mut order) = column(&mut dom, n);

        for _ in 0..5 {
            let (d, b) = rng.next_pair(n);
            let r = reorder(&order, order[d], Some(order[b])).unwrap();
            relocate(&mut dom, order[d], r.placement).unwrap();
            order = r.order;
            assert_eq!(dom.children(list), order.as_slice());
        }
    }
}

#[test]
fn relocate_moves_between_parents() {
    let mut dom = MemoryDom::new();
    let (left, l) = column(&mut dom, 2);
    let (right, r) = column(&mut dom, 2);

    relocate(&mut dom, l[0], Placement::Before(r[1])).unwrap();
    assert_eq!(dom.children(left), &[l[1]]);
    assert_eq!(dom.children(right), &[r[0], l[0], r[1]]);

    relocate(&mut dom, l[1], Placement::After(r[1])).unwrap();
    assert!(dom.children(left).is_empty());
    assert_eq!(dom.children(right), &[r[0], l[0], r[1], l[1]]);
}

#[test]
fn relocate_onto_a_detached_element_fails() {
    let mut dom = MemoryDom::new();
    let (_list, items) = column(&mut dom, 2);
    assert_eq!(
        relocate(&mut dom, items[0], Placement::After(ElementId(404))),
        Err(DomError::UnknownElement(ElementId(404)))
    );
}

#[test]
fn relocate_never_moves_an_element_into_itself() {
    let mut dom = MemoryDom::new();
    let (list, items) = column(&mut dom, 2);
    let inner = dom.create_element(
        items[0],
        "span",
        Rect::from_min_size(Pos2::new(10.0, 5.0), Vec2::new(20.0, 10.0)),
    );

    for placement in [Placement::After(inner), Placement::Before(inner)] {
        assert_eq!(
            relocate(&mut dom, items[0], placement),
            Err(DomError::HierarchyRequest {
                parent: items[0],
                child: items[0]
            })
        );
    }
    assert_eq!(dom.children(list), items.as_slice());
    assert_eq!(dom.children(items[0]), &[inner]);
    assert!(is_inclusive_ancestor(&dom, items[0], inner));
    assert!(!is_inclusive_ancestor(&dom, inner, items[0]));
}

/// Delegates to [`MemoryDom`] but refuses the first `refusals` inserts.
struct RefusingDom {
    dom: MemoryDom,
    refusals: usize,
}

impl Dom for RefusingDom {
    fn computed_style(&self, element: ElementId) -> ComputedStyle {
        self.dom.computed_style(element)
    }

    fn bounding_rect(&self, element: ElementId) -> Option<Rect> {
        self.dom.bounding_rect(element)
    }

    fn offset_metrics(&self, element: ElementId) -> OffsetMetrics {
        self.dom.offset_metrics(element)
    }

    fn set_style(&mut self, element: ElementId, property: &str, value: &str) {
        self.dom.set_style(element, property, value);
    }

    fn set_attribute(&mut self, element: ElementId, name: &str, value: &str) {
        self.dom.set_attribute(element, name, value);
    }

    fn remove_attribute(&mut self, element: ElementId, name: &str) {
        self.dom.remove_attribute(element, name);
    }

    fn query_selector_all(
        &self,
        root: ElementId,
        selector: &str,
    ) -> Result<Vec<ElementId>, DomError> {
        self.dom.query_selector_all(root, selector)
    }

    fn parent(&self, element: ElementId) -> Option<ElementId> {
        self.dom.parent(element)
    }

    fn next_sibling(&self, element: ElementId) -> Option<ElementId> {
        self.dom.next_sibling(element)
    }

    fn remove_child(&mut self, parent: ElementId, child: ElementId) -> Result<(), DomError> {
        self.dom.remove_child(parent, child)
    }

    fn insert_before(
        &mut self,
        parent: ElementId,
        child: ElementId,
        reference: Option<ElementId>,
    ) -> Result<(), DomError> {
        if self.refusals > 0 {
            self.refusals -= 1;
            return Err(DomError::NotAChild { parent, child });
        }
        self.dom.insert_before(parent, child, reference)
    }
}

#[test]
fn failed_insert_puts_the_element_back() {
    let mut dom = MemoryDom::new();
    let (list, items) = column(&mut dom, 3);
    let mut host = RefusingDom { dom, refusals: 1 };

    let err = relocate(&mut host, items[1], Placement::After(items[2]));
    assert_eq!(
        err,
        Err(DomError::NotAChild {
            parent: list,
            child: items[1]
        })
    );
    assert_eq!(host.dom.children(list), items.as_slice());
    assert_eq!(host.dom.parent(items[1]), Some(list));
}

#[test]
fn random_native_drags_keep_tracked_order_and_tree_in_sync() {
    let mut rng = Rng::new(3);
    let mut dom = MemoryDom::new();
    let n = 6;
    let (list, items) = column(&mut dom, n);
    let mut drag = SortableDrag::attach_new(
        &mut dom,
        Capabilities::native(),
        items.clone(),
        SortableOptions::sortable(),
    )
    .unwrap();
    let attached = dom.listener_count();

    for round in 0..100 {
        let order = drag.tracked_elements().to_vec();
        let dragged = order[rng.next_usize(n)];
        let at = |el: ElementId| EventTarget::Element(el);
        let p = Pos2::new(10.0, 10.0);

        let _ = dom.dispatch(&mut drag, EventKind::MouseDown, at(dragged), p);
        let _ = dom.dispatch(&mut drag, EventKind::MouseMove, at(dragged), p);
        let _ = dom.dispatch(&mut drag, EventKind::DragStart, at(dragged), p);

        let enters = rng.next_usize(4);
        let mut last = None;
        for _ in 0..enters {
            let target = order[rng.next_usize(n)];
            let _ = dom.dispatch(&mut drag, EventKind::DragEnter, at(target), p);
            last = Some(target);
            assert_ne!(drag.beneath(), Some(dragged));
        }

        let end = if rng.next_usize(2) == 0 {
            EventKind::DragEnd
        } else {
            EventKind::Drop
        };
        let _ = dom.dispatch(&mut drag, end, at(dragged), p);

        let expected = reorder(&order, dragged, last.filter(|&t| t != dragged))
            .map_or(order.clone(), |r| r.order);
        assert_eq!(drag.tracked_elements(), expected.as_slice(), "round {round}");
        assert_eq!(dom.children(list), drag.tracked_elements(), "round {round}");
        assert_eq!(drag.phase(), DragPhase::Idle);
        assert_eq!(dom.listener_count(), attached, "round {round}");
        assert_eq!(dom.inline_style(dragged, "position"), None);
    }
}
