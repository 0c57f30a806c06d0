//! A small in-memory document implementing [`Host`].
//!
//! Elements are boxes with a base layout rectangle, inline styles, attributes and a tree position.
//! Events are dispatched along the target's ancestor chain (bubbling) to the listeners registered
//! there; animation frames queue up until [`MemoryDom::run_frames`].
//!
//! Good enough for tests, demos and headless tools. It is not a layout engine: moving an element
//! in the tree does not move its base rectangle, see [`MemoryDom::layout_column`].

use std::collections::{BTreeMap, BTreeSet};

use egui::{Pos2, Rect, Vec2};

use crate::sortable::{
    CapabilityProbe, ComputedStyle, DeliveryStyle, Dom, DomError, ElementId, EventKind,
    EventResponse, EventSource, EventTarget, FrameId, FrameScheduler, ListenerId, OffsetMetrics,
    Position, RawEvent, SortableDrag, is_inclusive_ancestor, parse_leading_int,
};

#[derive(Clone, Debug)]
struct Node {
    tag: String,
    parent: Option<ElementId>,
    children: Vec<ElementId>,
    attributes: BTreeMap<String, String>,
    inline: BTreeMap<String, String>,
    base: Rect,
    scroll: Vec2,
}

#[derive(Clone, Debug)]
struct Listener {
    target: EventTarget,
    name: String,
}

#[derive(Debug)]
pub struct MemoryDom {
    nodes: BTreeMap<ElementId, Node>,
    root: ElementId,
    next_element: u64,

    listeners: BTreeMap<ListenerId, Listener>,
    next_listener: u64,

    frames: BTreeSet<FrameId>,
    next_frame: u64,

    /// How listeners are named; affects [`EventSource::delivery_style`] and [`Self::dispatch`].
    pub delivery_style: DeliveryStyle,

    /// If false, [`Dom::bounding_rect`] answers `None` so callers use offset metrics.
    pub bounding_rect_supported: bool,

    /// Reported through [`CapabilityProbe`].
    pub native_drag_and_drop: bool,

    /// Style properties reported as supported through [`CapabilityProbe`].
    pub style_properties: Vec<&'static str>,
}

impl Default for MemoryDom {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryDom {
    pub fn new() -> Self {
        let root = ElementId(1);
        let mut nodes = BTreeMap::new();
        nodes.insert(
            root,
            Node {
                tag: "body".to_owned(),
                parent: None,
                children: Vec::new(),
                attributes: BTreeMap::new(),
                inline: BTreeMap::new(),
                base: Rect::from_min_size(Pos2::ZERO, Vec2::new(1024.0, 768.0)),
                scroll: Vec2::ZERO,
            },
        );
        Self {
            nodes,
            root,
            next_element: 2,
            listeners: BTreeMap::new(),
            next_listener: 1,
            frames: BTreeSet::new(),
            next_frame: 1,
            delivery_style: DeliveryStyle::Standard,
            bounding_rect_supported: true,
            native_drag_and_drop: false,
            style_properties: vec!["transform"],
        }
    }

    pub fn root(&self) -> ElementId {
        self.root
    }

    /// Append a new `<tag>` to `parent` with `base` as its static layout box.
    pub fn create_element(&mut self, parent: ElementId, tag: &str, base: Rect) -> ElementId {
        let id = ElementId(self.next_element);
        self.next_element += 1;
        self.nodes.insert(
            id,
            Node {
                tag: tag.to_owned(),
                parent: Some(parent),
                children: Vec::new(),
                attributes: BTreeMap::new(),
                inline: BTreeMap::new(),
                base,
                scroll: Vec2::ZERO,
            },
        );
        if let Some(p) = self.nodes.get_mut(&parent) {
            p.children.push(id);
        }
        id
    }

    pub fn contains(&self, element: ElementId) -> bool {
        self.nodes.contains_key(&element)
    }

    pub fn tag(&self, element: ElementId) -> Option<&str> {
        self.nodes.get(&element).map(|n| n.tag.as_str())
    }

    pub fn children(&self, element: ElementId) -> &[ElementId] {
        self.nodes
            .get(&element)
            .map_or(&[], |n| n.children.as_slice())
    }

    pub fn attribute(&self, element: ElementId, name: &str) -> Option<&str> {
        self.nodes
            .get(&element)?
            .attributes
            .get(name)
            .map(String::as_str)
    }

    pub fn inline_style(&self, element: ElementId, property: &str) -> Option<&str> {
        self.nodes
            .get(&element)?
            .inline
            .get(property)
            .map(String::as_str)
    }

    pub fn base_rect(&self, element: ElementId) -> Option<Rect> {
        self.nodes.get(&element).map(|n| n.base)
    }

    pub fn set_base_rect(&mut self, element: ElementId, rect: Rect) {
        if let Some(n) = self.nodes.get_mut(&element) {
            n.base = rect;
        }
    }

    pub fn set_scroll(&mut self, element: ElementId, scroll: Vec2) {
        if let Some(n) = self.nodes.get_mut(&element) {
            n.scroll = scroll;
        }
    }

    /// Stack the children of `parent` top to bottom starting at `origin`, keeping their sizes.
    pub fn layout_column(&mut self, parent: ElementId, origin: Pos2, spacing: f32) {
        let mut y = origin.y;
        for child in self.children(parent).to_vec() {
            let Some(base) = self.base_rect(child) else {
                continue;
            };
            self.set_base_rect(child, Rect::from_min_size(Pos2::new(origin.x, y), base.size()));
            y += base.height() + spacing;
        }
    }

    /// Where the element is drawn: its layout box plus any `translate(...)` transform.
    pub fn visual_rect(&self, element: ElementId) -> Option<Rect> {
        let rect = self.layout_rect(element)?;
        let node = self.nodes.get(&element)?;
        let offset = node
            .inline
            .iter()
            .filter(|(name, _)| name.ends_with("transform"))
            .find_map(|(_, value)| parse_translate(value))
            .unwrap_or(Vec2::ZERO);
        Some(rect.translate(offset))
    }

    /// Topmost element drawn at `pos` (highest z-index, then deepest, then latest in the tree).
    pub fn element_at(&self, pos: Pos2) -> Option<ElementId> {
        let mut best: Option<((i64, usize, usize), ElementId)> = None;
        for (order, id) in self.document_order().into_iter().enumerate() {
            if id == self.root || !self.visual_rect(id).is_some_and(|r| r.contains(pos)) {
                continue;
            }
            let z = self
                .inline_style(id, "z-index")
                .and_then(|z| z.trim().parse::<i64>().ok())
                .unwrap_or(0);
            let key = (z, self.depth(id), order);
            if best.is_none_or(|(k, _)| key > k) {
                best = Some((key, id));
            }
        }
        best.map(|(_, id)| id)
    }

    /// Number of live listeners on the host.
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Event names listened for on `target`.
    pub fn listeners_on(&self, target: EventTarget) -> Vec<&str> {
        self.listeners
            .values()
            .filter(|l| l.target == target)
            .map(|l| l.name.as_str())
            .collect()
    }

    pub fn pending_frame_count(&self) -> usize {
        self.frames.len()
    }

    /// Dispatch `kind` at `target` with the pointer at `pos`, bubbling to the document.
    ///
    /// Listeners are looked up when the event reaches each node, so a listener added on an
    /// ancestor while handling the event still sees it.
    pub fn dispatch(
        &mut self,
        drag: &mut SortableDrag,
        kind: EventKind,
        target: EventTarget,
        pos: Pos2,
    ) -> EventResponse {
        let raw = match self.delivery_style {
            DeliveryStyle::Standard => RawEvent::at(pos, target),
            DeliveryStyle::Legacy => RawEvent::legacy_at(pos, target),
        };
        let name = self.delivery_style.event_name(kind);

        let mut path: Vec<EventTarget> = Vec::new();
        let mut current = target.element();
        while let Some(id) = current {
            path.push(EventTarget::Element(id));
            current = self.parent(id);
        }
        path.push(EventTarget::Document);

        let mut response = EventResponse::IGNORED;
        for node in path {
            let ids: Vec<ListenerId> = self
                .listeners
                .iter()
                .filter(|(_, l)| l.target == node && l.name == name)
                .map(|(&id, _)| id)
                .collect();
            for id in ids {
                // A handler earlier in this dispatch may have removed it.
                if !self.listeners.contains_key(&id) {
                    continue;
                }
                let r = drag.handle_event(self, id, &raw);
                response.prevent_default |= r.prevent_default;
                response.stop_propagation |= r.stop_propagation;
            }
            if response.stop_propagation {
                break;
            }
        }
        response
    }

    /// Run every frame scheduled so far; frames scheduled while running wait for the next call.
    pub fn run_frames(&mut self, drag: &mut SortableDrag) -> usize {
        let due = std::mem::take(&mut self.frames);
        for &frame in &due {
            drag.on_animation_frame(self, frame);
        }
        due.len()
    }

    fn layout_rect(&self, element: ElementId) -> Option<Rect> {
        let node = self.nodes.get(&element)?;
        let style = self.computed_style(element);
        let left = style.left_px();
        let top = style.top_px();

        let rect = match style.position() {
            Position::Relative => node.base.translate(Vec2::new(
                left.unwrap_or(0) as f32,
                top.unwrap_or(0) as f32,
            )),
            Position::Absolute | Position::Fixed => {
                let anchor = node
                    .parent
                    .and_then(|p| self.layout_rect(p))
                    .map_or(Pos2::ZERO, |r| r.min);
                let min = Pos2::new(
                    left.map_or(node.base.min.x, |v| anchor.x + v as f32),
                    top.map_or(node.base.min.y, |v| anchor.y + v as f32),
                );
                Rect::from_min_size(min, node.base.size())
            }
            Position::Static | Position::Sticky => node.base,
        };
        Some(rect)
    }

    fn depth(&self, element: ElementId) -> usize {
        let mut depth = 0;
        let mut current = self.parent(element);
        while let Some(id) = current {
            depth += 1;
            current = self.parent(id);
        }
        depth
    }

    fn document_order(&self) -> Vec<ElementId> {
        let mut out = Vec::with_capacity(self.nodes.len());
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            out.push(id);
            stack.extend(self.children(id).iter().rev().copied());
        }
        out
    }

    fn node(&self, element: ElementId) -> Result<&Node, DomError> {
        self.nodes
            .get(&element)
            .ok_or(DomError::UnknownElement(element))
    }

    fn matches(&self, element: ElementId, selector: &Selector<'_>) -> bool {
        let Some(node) = self.nodes.get(&element) else {
            return false;
        };
        match selector {
            Selector::Tag(tag) => node.tag.eq_ignore_ascii_case(tag),
            Selector::Id(id) => node.attributes.get("id").is_some_and(|v| v == id),
            Selector::Class(class) => node
                .attributes
                .get("class")
                .is_some_and(|v| v.split_whitespace().any(|c| c == *class)),
        }
    }
}

enum Selector<'a> {
    Tag(&'a str),
    Id(&'a str),
    Class(&'a str),
}

/// Comma-separated list of `tag`, `#id` or `.class`.
fn parse_selectors(selector: &str) -> Result<Vec<Selector<'_>>, DomError> {
    fn ident(s: &str) -> bool {
        !s.is_empty()
            && s.chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    }

    let invalid = || DomError::InvalidSelector(selector.to_owned());
    selector
        .split(',')
        .map(str::trim)
        .map(|part| {
            let parsed = if let Some(id) = part.strip_prefix('#') {
                Selector::Id(id)
            } else if let Some(class) = part.strip_prefix('.') {
                Selector::Class(class)
            } else {
                Selector::Tag(part)
            };
            let name = match parsed {
                Selector::Tag(s) | Selector::Id(s) | Selector::Class(s) => s,
            };
            ident(name).then_some(parsed).ok_or_else(invalid)
        })
        .collect()
}

/// `translate(10px, -5px)` → `(10, -5)`.
fn parse_translate(value: &str) -> Option<Vec2> {
    let inner = value.trim().strip_prefix("translate(")?.strip_suffix(')')?;
    let (x, y) = inner.split_once(',')?;
    let num = |s: &str| s.trim().trim_end_matches("px").parse::<f32>().ok();
    Some(Vec2::new(num(x)?, num(y)?))
}

impl Dom for MemoryDom {
    fn computed_style(&self, element: ElementId) -> ComputedStyle {
        let Some(node) = self.nodes.get(&element) else {
            return ComputedStyle::default();
        };
        let inline = |name: &str, default: &str| {
            node.inline
                .get(name)
                .cloned()
                .unwrap_or_else(|| default.to_owned())
        };
        ComputedStyle {
            position: inline("position", "static"),
            left: inline("left", "auto"),
            top: inline("top", "auto"),
            z_index: inline("z-index", "auto"),
            width: format!("{}px", node.base.width()),
            height: format!("{}px", node.base.height()),
        }
    }

    fn bounding_rect(&self, element: ElementId) -> Option<Rect> {
        if !self.bounding_rect_supported {
            return None;
        }
        self.layout_rect(element)
    }

    fn offset_metrics(&self, element: ElementId) -> OffsetMetrics {
        let Some(node) = self.nodes.get(&element) else {
            return OffsetMetrics::default();
        };
        let Some(rect) = self.layout_rect(element) else {
            return OffsetMetrics::default();
        };
        let parent_min = node
            .parent
            .and_then(|p| self.layout_rect(p))
            .map_or(Pos2::ZERO, |r| r.min);
        OffsetMetrics {
            offset_left: Some(rect.min.x - parent_min.x),
            offset_top: Some(rect.min.y - parent_min.y),
            scroll_left: Some(node.scroll.x),
            scroll_top: Some(node.scroll.y),
            offset_parent: node.parent,
        }
    }

    fn set_style(&mut self, element: ElementId, property: &str, value: &str) {
        let Some(node) = self.nodes.get_mut(&element) else {
            return;
        };
        if value.is_empty() {
            node.inline.remove(property);
        } else {
            node.inline.insert(property.to_owned(), value.to_owned());
        }
    }

    fn set_attribute(&mut self, element: ElementId, name: &str, value: &str) {
        if let Some(node) = self.nodes.get_mut(&element) {
            node.attributes.insert(name.to_owned(), value.to_owned());
        }
    }

    fn remove_attribute(&mut self, element: ElementId, name: &str) {
        if let Some(node) = self.nodes.get_mut(&element) {
            node.attributes.remove(name);
            if name == "style" {
                node.inline.clear();
            }
        }
    }

    fn query_selector_all(
        &self,
        root: ElementId,
        selector: &str,
    ) -> Result<Vec<ElementId>, DomError> {
        let selectors = parse_selectors(selector)?;
        self.node(root)?;

        let mut out = Vec::new();
        let mut stack: Vec<ElementId> = self.children(root).iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            if selectors.iter().any(|s| self.matches(id, s)) {
                out.push(id);
            }
            stack.extend(self.children(id).iter().rev().copied());
        }
        Ok(out)
    }

    fn parent(&self, element: ElementId) -> Option<ElementId> {
        self.nodes.get(&element)?.parent
    }

    fn next_sibling(&self, element: ElementId) -> Option<ElementId> {
        let siblings = self.children(self.parent(element)?);
        let index = siblings.iter().position(|&e| e == element)?;
        siblings.get(index + 1).copied()
    }

    fn remove_child(&mut self, parent: ElementId, child: ElementId) -> Result<(), DomError> {
        if self.node(child)?.parent != Some(parent) {
            return Err(DomError::NotAChild { parent, child });
        }
        let p = self
            .nodes
            .get_mut(&parent)
            .ok_or(DomError::UnknownElement(parent))?;
        p.children.retain(|&c| c != child);
        if let Some(c) = self.nodes.get_mut(&child) {
            c.parent = None;
        }
        Ok(())
    }

    fn insert_before(
        &mut self,
        parent: ElementId,
        child: ElementId,
        reference: Option<ElementId>,
    ) -> Result<(), DomError> {
        self.node(parent)?;
        self.node(child)?;
        if let Some(reference) = reference {
            if self.node(reference)?.parent != Some(parent) {
                return Err(DomError::NotAChild {
                    parent,
                    child: reference,
                });
            }
        }
        if is_inclusive_ancestor(&*self, child, parent) {
            return Err(DomError::HierarchyRequest { parent, child });
        }
        if let Some(old_parent) = self.parent(child) {
            self.remove_child(old_parent, child)?;
        }

        let p = self
            .nodes
            .get_mut(&parent)
            .ok_or(DomError::UnknownElement(parent))?;
        let index = reference
            .and_then(|r| p.children.iter().position(|&c| c == r))
            .unwrap_or(p.children.len());
        p.children.insert(index, child);
        if let Some(c) = self.nodes.get_mut(&child) {
            c.parent = Some(parent);
        }
        Ok(())
    }
}

impl EventSource for MemoryDom {
    fn delivery_style(&self) -> DeliveryStyle {
        self.delivery_style
    }

    fn add_listener(&mut self, target: EventTarget, name: &str) -> ListenerId {
        let id = ListenerId(self.next_listener);
        self.next_listener += 1;
        self.listeners.insert(
            id,
            Listener {
                target,
                name: name.to_owned(),
            },
        );
        id
    }

    fn remove_listener(&mut self, id: ListenerId) {
        self.listeners.remove(&id);
    }
}

impl FrameScheduler for MemoryDom {
    fn request_animation_frame(&mut self) -> FrameId {
        let id = FrameId(self.next_frame);
        self.next_frame += 1;
        self.frames.insert(id);
        id
    }

    fn cancel_animation_frame(&mut self, id: FrameId) {
        self.frames.remove(&id);
    }
}

impl CapabilityProbe for MemoryDom {
    fn has_element_property(&self, name: &str) -> bool {
        self.native_drag_and_drop && name == "draggable"
    }

    fn has_handler_slot(&self, name: &str) -> bool {
        let Some(event) = name.strip_prefix("on") else {
            return false;
        };
        EventKind::ALL
            .iter()
            .filter(|k| {
                self.native_drag_and_drop
                    || matches!(k, EventKind::MouseDown | EventKind::MouseMove | EventKind::MouseUp)
            })
            .any(|k| k.name() == event)
    }

    fn handler_slot_is_object(&self, name: &str) -> bool {
        self.has_handler_slot(name)
    }

    fn supports_style_property(&self, property: &str) -> bool {
        self.style_properties.contains(&property)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sortable::Capabilities;

    fn rect(x: f32, y: f32, w: f32, h: f32) -> Rect {
        Rect::from_min_size(Pos2::new(x, y), Vec2::new(w, h))
    }

    #[test]
    fn selectors_match_descendants_in_document_order() {
        let mut dom = MemoryDom::new();
        let card = dom.create_element(dom.root(), "div", rect(0.0, 0.0, 100.0, 100.0));
        let header = dom.create_element(card, "header", rect(0.0, 0.0, 100.0, 20.0));
        let grip = dom.create_element(header, "span", rect(0.0, 0.0, 10.0, 10.0));
        let other = dom.create_element(card, "span", rect(0.0, 30.0, 10.0, 10.0));
        dom.set_attribute(grip, "class", "grip big");
        dom.set_attribute(other, "id", "x");

        assert_eq!(dom.query_selector_all(card, ".grip").unwrap(), vec![grip]);
        assert_eq!(dom.query_selector_all(card, "span").unwrap(), vec![grip, other]);
        assert_eq!(dom.query_selector_all(card, "#x, header").unwrap(), vec![header, other]);
        assert!(dom.query_selector_all(card, "div").unwrap().is_empty());
        assert_eq!(
            dom.query_selector_all(card, "div > span"),
            Err(DomError::InvalidSelector("div > span".to_owned()))
        );
    }

    #[test]
    fn tree_mutation_checks_parents() {
        let mut dom = MemoryDom::new();
        let list = dom.create_element(dom.root(), "ul", rect(0.0, 0.0, 100.0, 100.0));
        let a = dom.create_element(list, "li", rect(0.0, 0.0, 100.0, 10.0));
        let b = dom.create_element(list, "li", rect(0.0, 10.0, 100.0, 10.0));

        assert_eq!(
            dom.remove_child(dom.root(), a),
            Err(DomError::NotAChild {
                parent: dom.root(),
                child: a
            })
        );
        dom.insert_before(list, b, Some(a)).unwrap();
        assert_eq!(dom.children(list), &[b, a]);
        assert_eq!(dom.next_sibling(b), Some(a));
        assert_eq!(dom.next_sibling(a), None);
        assert_eq!(
            dom.insert_before(list, a, Some(ElementId(99))),
            Err(DomError::UnknownElement(ElementId(99)))
        );
    }

    #[test]
    fn insert_into_own_subtree_is_rejected() {
        let mut dom = MemoryDom::new();
        let outer = dom.create_element(dom.root(), "div", rect(0.0, 0.0, 100.0, 100.0));
        let inner = dom.create_element(outer, "div", rect(10.0, 10.0, 50.0, 50.0));

        assert_eq!(
            dom.insert_before(inner, outer, None),
            Err(DomError::HierarchyRequest {
                parent: inner,
                child: outer
            })
        );
        assert_eq!(
            dom.insert_before(outer, outer, None),
            Err(DomError::HierarchyRequest {
                parent: outer,
                child: outer
            })
        );
        assert_eq!(dom.parent(outer), Some(dom.root()));
        assert_eq!(dom.children(outer), &[inner]);
    }

    #[test]
    fn relative_offsets_and_transforms_move_the_visual_box() {
        let mut dom = MemoryDom::new();
        let a = dom.create_element(dom.root(), "div", rect(10.0, 20.0, 50.0, 50.0));
        dom.set_style(a, "position", "relative");
        dom.set_style(a, "left", "5px");
        dom.set_style(a, "transform", "translate(1px, -2px)");

        assert_eq!(dom.bounding_rect(a), Some(rect(15.0, 20.0, 50.0, 50.0)));
        assert_eq!(dom.visual_rect(a), Some(rect(16.0, 18.0, 50.0, 50.0)));

        dom.remove_attribute(a, "style");
        assert_eq!(dom.visual_rect(a), Some(rect(10.0, 20.0, 50.0, 50.0)));
    }

    #[test]
    fn element_at_prefers_higher_z_index() {
        let mut dom = MemoryDom::new();
        let a = dom.create_element(dom.root(), "div", rect(0.0, 0.0, 50.0, 50.0));
        let b = dom.create_element(dom.root(), "div", rect(0.0, 0.0, 50.0, 50.0));
        assert_eq!(dom.element_at(Pos2::new(5.0, 5.0)), Some(b));
        dom.set_style(a, "z-index", "3");
        assert_eq!(dom.element_at(Pos2::new(5.0, 5.0)), Some(a));
        assert_eq!(dom.element_at(Pos2::new(500.0, 500.0)), None);
    }

    #[test]
    fn probe_reports_configured_capabilities() {
        let mut dom = MemoryDom::new();
        dom.native_drag_and_drop = true;
        dom.style_properties = vec!["-webkit-transform"];
        let caps = Capabilities::detect(&dom);
        assert!(caps.native_drag_and_drop);
        assert_eq!(caps.transform.map(|t| t.name()), Some("-webkit-transform"));

        dom.native_drag_and_drop = false;
        dom.style_properties.clear();
        assert_eq!(Capabilities::detect(&dom), Capabilities::manual_layout_only());
    }

    #[test]
    fn frames_can_be_cancelled() {
        let mut dom = MemoryDom::new();
        let a = dom.request_animation_frame();
        let _b = dom.request_animation_frame();
        dom.cancel_animation_frame(a);
        assert_eq!(dom.pending_frame_count(), 1);
    }
}
