//! Instance Registry - slot allocation for component instances.
//!
//! Manages the storage side of the instance lifecycle:
//! - Slot allocation with a free pool for O(1) reuse
//! - Generation counters so released ids never alias a newer instance
//! - Parent index per instance, walked by error-boundary lookup

use crate::component::Instance;
use crate::types::InstanceId;

// =============================================================================
// Registry State
// =============================================================================

struct Slot {
    generation: u32,
    instance: Option<Instance>,
}

#[derive(Default)]
pub(crate) struct Registry {
    slots: Vec<Slot>,
    /// Pool of freed slot indices for reuse.
    free: Vec<usize>,
    len: usize,
}

impl Registry {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    // =========================================================================
    // Allocation
    // =========================================================================

    /// Store an instance and return its id.
    pub(crate) fn allocate(&mut self, instance: Instance) -> InstanceId {
        self.len += 1;

        // Reuse free slot or grow
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index];
            slot.instance = Some(instance);
            return InstanceId {
                index,
                generation: slot.generation,
            };
        }

        let index = self.slots.len();
        self.slots.push(Slot {
            generation: 0,
            instance: Some(instance),
        });
        InstanceId {
            index,
            generation: 0,
        }
    }

    /// Remove an instance, returning it. The slot goes back to the pool with
    /// a bumped generation.
    pub(crate) fn release(&mut self, id: InstanceId) -> Option<Instance> {
        let slot = self.slots.get_mut(id.index)?;
        if slot.generation != id.generation {
            return None;
        }
        let instance = slot.instance.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.index);
        self.len -= 1;
        Some(instance)
    }

    // =========================================================================
    // Lookups
    // =========================================================================

    pub(crate) fn get(&self, id: InstanceId) -> Option<&Instance> {
        self.slots
            .get(id.index)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.instance.as_ref())
    }

    pub(crate) fn get_mut(&mut self, id: InstanceId) -> Option<&mut Instance> {
        self.slots
            .get_mut(id.index)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.instance.as_mut())
    }

    pub(crate) fn contains(&self, id: InstanceId) -> bool {
        self.get(id).is_some()
    }

    pub(crate) fn parent(&self, id: InstanceId) -> Option<InstanceId> {
        self.get(id).and_then(|instance| instance.data.parent)
    }

    /// `id` followed by each live ancestor, nearest first.
    pub(crate) fn ancestors(&self, id: InstanceId) -> impl Iterator<Item = InstanceId> + '_ {
        std::iter::successors(Some(id).filter(|id| self.contains(*id)), move |current| {
            self.parent(*current).filter(|parent| self.contains(*parent))
        })
    }

    pub(crate) fn len(&self) -> usize {
        self.len
    }

    #[cfg(test)]
    pub(crate) fn capacity(&self) -> usize {
        self.slots.len()
    }
}
