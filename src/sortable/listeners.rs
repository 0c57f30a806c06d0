use itertools::Itertools as _;

use super::event::{EventKind, subscribe};
use super::host::{ElementId, EventSource, EventTarget, ListenerId};

/// What a subscribed listener does when its event arrives.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) enum Role {
    /// Pointer-down on a handle of `element`.
    Grab { element: ElementId },
    /// Platform drag entered a tracked element.
    Enter { element: ElementId },
    /// First move on an armed element.
    ArmMove { element: ElementId },
    /// Pointer released anywhere in the document.
    Release,
    /// Document pointer move during a manual drag.
    PointerMove,
    NativeStart,
    NativeEnd,
    NativeOver,
    NativeDrop,
}

/// How long a listener lives.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) enum Scope {
    /// From `attach` until `detach`.
    Attached,
    /// While armed, removed on the first move.
    Pending,
    /// Removed on every exit from ARMED or ACTIVE.
    Drag,
}

#[derive(Clone, Copy, Debug)]
pub(super) struct Binding {
    pub(super) role: Role,
    pub(super) scope: Scope,
    pub(super) target: EventTarget,
    pub(super) kind: EventKind,
}

/// Every listener the controller has added and not yet removed.
#[derive(Debug, Default)]
pub(super) struct ListenerSet {
    bindings: ahash::HashMap<ListenerId, Binding>,
}

impl ListenerSet {
    pub(super) fn add(
        &mut self,
        host: &mut (impl EventSource + ?Sized),
        target: EventTarget,
        kind: EventKind,
        role: Role,
        scope: Scope,
    ) -> ListenerId {
        let id = subscribe(host, target, kind);
        log::trace!("listen {id:?} {} on {target:?} as {role:?}", kind.name());
        self.bindings.insert(
            id,
            Binding {
                role,
                scope,
                target,
                kind,
            },
        );
        id
    }

    pub(super) fn get(&self, id: ListenerId) -> Option<&Binding> {
        self.bindings.get(&id)
    }

    /// Remove every listener in `scope`; returns how many were removed.
    pub(super) fn release(&mut self, host: &mut (impl EventSource + ?Sized), scope: Scope) -> usize {
        let ids = self
            .bindings
            .iter()
            .filter(|(_, b)| b.scope == scope)
            .map(|(&id, _)| id)
            .sorted()
            .collect_vec();
        for &id in &ids {
            host.remove_listener(id);
            self.bindings.remove(&id);
        }
        ids.len()
    }

    pub(super) fn count(&self, scope: Scope) -> usize {
        self.bindings.values().filter(|b| b.scope == scope).count()
    }

    pub(super) fn len(&self) -> usize {
        self.bindings.len()
    }

    /// One line per listener, stable order; used by the debug log.
    pub(super) fn summary(&self) -> String {
        self.bindings
            .iter()
            .sorted_by_key(|(id, _)| **id)
            .map(|(id, b)| format!("{}:{}@{:?}/{:?}", id.0, b.kind.name(), b.target, b.scope))
            .join(" ")
    }
}
