//! Explicit component lifecycles.
//!
//! Every scene element is mounted through [`Lifecycle::mount`], which hands
//! out a [`LifecycleHandle`]. The handle is the only way to unmount the
//! component again, and everything that acts on a component later (the
//! animation driver, asset completions) first checks that its id is still
//! live.

use std::collections::HashMap;

/// Identity of a mounted component.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ComponentId(pub(crate) u32);

/// Proof of a live mount. Not `Clone`: unmounting consumes it.
#[derive(Debug, PartialEq, Eq)]
pub struct LifecycleHandle {
    id: ComponentId,
    name: &'static str,
}

impl LifecycleHandle {
    pub fn id(&self) -> ComponentId {
        self.id
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

#[derive(Debug, Default)]
pub struct Lifecycle {
    live: HashMap<ComponentId, &'static str>,
    next: u32,
}

impl Lifecycle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mount(&mut self, name: &'static str) -> LifecycleHandle {
        let id = ComponentId(self.next);
        self.next += 1;
        self.live.insert(id, name);
        log::debug!("mounted {name} as {id:?}");
        LifecycleHandle { id, name }
    }

    pub fn unmount(&mut self, handle: LifecycleHandle) {
        if self.live.remove(&handle.id).is_some() {
            log::debug!("unmounted {} ({:?})", handle.name, handle.id);
        }
    }

    pub fn is_live(&self, id: ComponentId) -> bool {
        self.live.contains_key(&id)
    }

    /// Number of mounted components.
    pub fn live_count(&self) -> usize {
        self.live.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_never_reused() {
        let mut lifecycle = Lifecycle::new();
        let floor = lifecycle.mount("floor");
        let floor_id = floor.id();
        lifecycle.unmount(floor);
        let palms = lifecycle.mount("palms");
        assert_ne!(palms.id(), floor_id);
        assert!(!lifecycle.is_live(floor_id));
        assert!(lifecycle.is_live(palms.id()));
        assert_eq!(lifecycle.live_count(), 1);
    }
}
