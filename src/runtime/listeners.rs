use std::collections::HashSet;

/// Document-level listeners a mounted view keeps registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListenerKind {
    PointerMove,
    PointerUp,
}

/// Identity of a bound listener. The same handle must be used to attach and
/// to detach, otherwise the registration leaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerHandle {
    id: u64,
    kind: ListenerKind,
}

impl ListenerHandle {
    pub fn kind(&self) -> ListenerKind {
        self.kind
    }
}

#[derive(Debug, Default)]
pub struct ListenerRegistry {
    next_id: u64,
    attached: HashSet<ListenerHandle>,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a handle. Call once per listener for the lifetime of the view.
    pub fn bind(&mut self, kind: ListenerKind) -> ListenerHandle {
        self.next_id += 1;
        ListenerHandle {
            id: self.next_id,
            kind,
        }
    }

    /// Returns `false` when the handle was already attached.
    pub fn attach(&mut self, handle: ListenerHandle) -> bool {
        self.attached.insert(handle)
    }

    /// Returns `false` when the handle was not attached.
    pub fn detach(&mut self, handle: ListenerHandle) -> bool {
        self.attached.remove(&handle)
    }

    pub fn is_listening(&self, kind: ListenerKind) -> bool {
        self.attached.iter().any(|handle| handle.kind == kind)
    }

    pub fn active_count(&self) -> usize {
        self.attached.len()
    }
}

/// The pair of handles bound when a view is constructed.
#[derive(Debug, Clone, Copy)]
pub struct BoundListeners {
    pub pointer_move: ListenerHandle,
    pub pointer_up: ListenerHandle,
}

impl BoundListeners {
    pub fn bind(registry: &mut ListenerRegistry) -> Self {
        Self {
            pointer_move: registry.bind(ListenerKind::PointerMove),
            pointer_up: registry.bind(ListenerKind::PointerUp),
        }
    }

    pub fn attach(&self, registry: &mut ListenerRegistry) {
        registry.attach(self.pointer_move);
        registry.attach(self.pointer_up);
    }

    pub fn detach(&self, registry: &mut ListenerRegistry) {
        registry.detach(self.pointer_move);
        registry.detach(self.pointer_up);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_mount_cycles_leave_nothing_behind() {
        let mut registry = ListenerRegistry::new();
        let bound = BoundListeners::bind(&mut registry);
        for _ in 0..3 {
            bound.attach(&mut registry);
            bound.attach(&mut registry);
            assert_eq!(registry.active_count(), 2);
            assert!(registry.is_listening(ListenerKind::PointerMove));
            bound.detach(&mut registry);
            assert_eq!(registry.active_count(), 0);
        }
    }

    #[test]
    fn a_fresh_handle_cannot_detach_another_binding() {
        let mut registry = ListenerRegistry::new();
        let original = registry.bind(ListenerKind::PointerUp);
        registry.attach(original);
        let impostor = registry.bind(ListenerKind::PointerUp);
        assert!(!registry.detach(impostor));
        assert!(registry.is_listening(ListenerKind::PointerUp));
        assert!(registry.detach(original));
        assert_eq!(original.kind(), ListenerKind::PointerUp);
    }
}
