//! Generation-counted pool of recycled draw commands
//!
//! Commands are recycled across frames through a monotonically advancing
//! cursor that resets each frame; slots are appended but never moved or
//! destroyed, so ids handed out earlier in the same frame stay valid as the
//! pool grows.
//!
//! Each slot carries a generation stamp that is bumped every time the slot
//! is handed out. An id from a previous frame (or from a command that was
//! absorbed into a batch) fails the generation check and resolves to `None`
//! instead of aliasing a recycled command.

use log::debug;

use crate::command::DrawCommand;

/// Generation-stamped identity of a pooled draw command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CommandId {
    /// Slot index in the pool
    pub(crate) index: u32,
    /// Generation the slot had when this id was issued
    pub(crate) generation: u32,
}

impl CommandId {
    /// Slot index carried by this id
    pub fn index(&self) -> u32 {
        self.index
    }

    /// Generation stamp carried by this id
    pub fn generation(&self) -> u32 {
        self.generation
    }
}

struct CommandSlot {
    command: DrawCommand,
    generation: u32,
}

/// Reusable free-list of draw command slots
///
/// Invariant: the free cursor never exceeds the slot count; reaching it
/// appends a freshly constructed slot.
#[derive(Default)]
pub struct CommandPool {
    slots: Vec<CommandSlot>,
    next_free: usize,
}

impl CommandPool {
    /// Create an empty pool
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a pool with `capacity` slots constructed up front
    pub fn with_capacity(capacity: usize) -> Self {
        let mut slots = Vec::with_capacity(capacity);
        for _ in 0..capacity {
            slots.push(CommandSlot {
                command: DrawCommand::new(),
                generation: 0,
            });
        }
        Self { slots, next_free: 0 }
    }

    /// Hand out the slot at the free cursor, growing the pool if exhausted
    ///
    /// Bumps the slot's generation, invalidating any id issued for it
    /// earlier. The returned id stays valid until the pool is next reset
    /// and the slot recycled.
    pub fn next_free_command(&mut self) -> CommandId {
        if self.next_free == self.slots.len() {
            debug!("command pool growing to {} slots", self.slots.len() + 1);
            self.slots.push(CommandSlot {
                command: DrawCommand::new(),
                generation: 0,
            });
        }
        let index = self.next_free;
        self.next_free += 1;

        let slot = &mut self.slots[index];
        slot.generation = slot.generation.wrapping_add(1);
        CommandId {
            index: index as u32,
            generation: slot.generation,
        }
    }

    /// Resolve an id to its command, if the id is still live
    pub fn get(&self, id: CommandId) -> Option<&DrawCommand> {
        self.slots
            .get(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .map(|slot| &slot.command)
    }

    /// Resolve an id to its command mutably, if the id is still live
    pub fn get_mut(&mut self, id: CommandId) -> Option<&mut DrawCommand> {
        self.slots
            .get_mut(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .map(|slot| &mut slot.command)
    }

    /// Reset the free cursor for a new frame
    ///
    /// Slots are reused by re-`init`, not destroyed; generations only bump
    /// when a slot is handed out again.
    pub fn reset(&mut self) {
        self.next_free = 0;
    }

    /// Total slots constructed so far
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether no slots have been constructed
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Slots handed out this frame
    pub fn in_use(&self) -> usize {
        self.next_free
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grows_on_demand() {
        let mut pool = CommandPool::new();
        assert!(pool.is_empty());

        let a = pool.next_free_command();
        let b = pool.next_free_command();
        assert_eq!(pool.len(), 2);
        assert_eq!(pool.in_use(), 2);
        assert_ne!(a, b);
        assert!(pool.get(a).is_some());
        assert!(pool.get(b).is_some());
    }

    #[test]
    fn test_with_capacity_does_not_grow() {
        let mut pool = CommandPool::with_capacity(4);
        for _ in 0..4 {
            pool.next_free_command();
        }
        assert_eq!(pool.len(), 4);
    }

    #[test]
    fn test_reset_recycles_slots() {
        let mut pool = CommandPool::new();
        let first_frame = pool.next_free_command();

        pool.reset();
        let second_frame = pool.next_free_command();

        // Same slot, new generation
        assert_eq!(first_frame.index(), second_frame.index());
        assert_ne!(first_frame.generation(), second_frame.generation());
    }

    #[test]
    fn test_stale_id_resolves_to_none() {
        let mut pool = CommandPool::new();
        let stale = pool.next_free_command();
        pool.reset();
        let live = pool.next_free_command();

        assert!(pool.get(stale).is_none());
        assert!(pool.get_mut(stale).is_none());
        assert!(pool.get(live).is_some());
    }
}
