use crate::components::{Component, ComponentKind};
use hostlink_common::EntityId;

/// A structural change deferred until the buffer is played back.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Spawn(EntityId),
    Insert(EntityId, Component),
    Remove(EntityId, ComponentKind),
    Destroy(EntityId),
}

/// Records structural changes while systems read a world, so the world is
/// only mutated at a sync point.
///
/// Spawned entity ids are allocated up front; later commands in the same
/// buffer may refer to them.
#[derive(Debug, Clone, Default)]
pub struct CommandBuffer {
    commands: Vec<Command>,
}

impl CommandBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spawn(&mut self) -> EntityId {
        let id = EntityId::new();
        self.commands.push(Command::Spawn(id));
        id
    }

    /// Spawn an entity and attach `components` to it.
    pub fn spawn_with(&mut self, components: impl IntoIterator<Item = Component>) -> EntityId {
        let id = self.spawn();
        for component in components {
            self.insert(id, component);
        }
        id
    }

    pub fn insert(&mut self, entity: EntityId, component: impl Into<Component>) {
        self.commands.push(Command::Insert(entity, component.into()));
    }

    pub fn remove(&mut self, entity: EntityId, kind: ComponentKind) {
        self.commands.push(Command::Remove(entity, kind));
    }

    pub fn destroy(&mut self, entity: EntityId) {
        self.commands.push(Command::Destroy(entity));
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    /// Take the recorded commands, leaving the buffer empty for reuse.
    pub fn drain(&mut self) -> Vec<Command> {
        std::mem::take(&mut self.commands)
    }
}
