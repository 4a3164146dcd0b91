use hostlink_common::EntityId;
use hostlink_ecs::{Command, CommandBuffer, Component, ComponentKind, ComponentStore};
use serde::{Deserialize, Serialize};
use std::any::{Any, TypeId};
use std::collections::{BTreeSet, HashMap};

/// Which simulation a world runs. Systems filter on this.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WorldRole {
    /// Authoritative server simulation.
    Server,
    /// Full client simulation with presentation.
    Client,
    /// Client simulation without presentation, used by hosts.
    ThinClient,
    /// Plain local game world with no networking.
    Local,
}

impl WorldRole {
    pub fn is_server(self) -> bool {
        matches!(self, Self::Server)
    }

    pub fn is_client(self) -> bool {
        matches!(self, Self::Client | Self::ThinClient)
    }
}

impl std::fmt::Display for WorldRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Server => "server",
            Self::Client => "client",
            Self::ThinClient => "thin-client",
            Self::Local => "local",
        };
        f.write_str(s)
    }
}

/// An event record produced by every structural change to the world.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum WorldEvent {
    EntityCreated { id: EntityId },
    EntityDestroyed { id: EntityId },
    /// Simulation advanced one tick.
    Stepped { tick: u64 },
    /// The world released its entities and resources.
    Disposed,
}

/// A simulation context: entities, their components and singleton resources.
///
/// All mutations go through explicit operations. Structural changes requested
/// by systems are recorded in a [`CommandBuffer`] and applied by
/// [`World::playback`].
pub struct World {
    name: String,
    role: WorldRole,
    entities: BTreeSet<EntityId>,
    components: ComponentStore,
    resources: HashMap<TypeId, Box<dyn Any + Send + Sync>>,
    tick: u64,
    disposed: bool,
    /// Append-only event log of all structural mutations.
    event_log: Vec<WorldEvent>,
}

impl World {
    pub fn new(name: impl Into<String>, role: WorldRole) -> Self {
        Self {
            name: name.into(),
            role,
            entities: BTreeSet::new(),
            components: ComponentStore::new(),
            resources: HashMap::new(),
            tick: 0,
            disposed: false,
            event_log: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn role(&self) -> WorldRole {
        self.role
    }

    /// Current simulation tick.
    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Number of entities in the world.
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Read-only access to all entity ids, in deterministic order.
    pub fn entities(&self) -> &BTreeSet<EntityId> {
        &self.entities
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.entities.contains(&id)
    }

    pub fn components(&self) -> &ComponentStore {
        &self.components
    }

    pub fn components_mut(&mut self) -> &mut ComponentStore {
        &mut self.components
    }

    /// Drain and return the event log.
    pub fn drain_events(&mut self) -> Vec<WorldEvent> {
        std::mem::take(&mut self.event_log)
    }

    /// Read-only access to the event log.
    pub fn events(&self) -> &[WorldEvent] {
        &self.event_log
    }

    /// Create an empty entity. Returns its id.
    pub fn create_entity(&mut self) -> EntityId {
        let id = EntityId::new();
        self.create_entity_with_id(id);
        id
    }

    /// Create an entity and attach `components` to it.
    pub fn create_entity_with(
        &mut self,
        components: impl IntoIterator<Item = Component>,
    ) -> EntityId {
        let id = self.create_entity();
        for component in components {
            self.components.insert(id, component);
        }
        id
    }

    /// Create an entity with a known id (command playback, mirroring).
    pub fn create_entity_with_id(&mut self, id: EntityId) {
        if self.entities.insert(id) {
            self.event_log.push(WorldEvent::EntityCreated { id });
        }
    }

    /// Destroy an entity and all of its components.
    pub fn destroy_entity(&mut self, id: EntityId) -> bool {
        if !self.entities.remove(&id) {
            return false;
        }
        self.components.remove_entity(id);
        self.event_log.push(WorldEvent::EntityDestroyed { id });
        true
    }

    /// Attach a component. Returns false if the entity does not exist.
    pub fn add_component(&mut self, id: EntityId, component: impl Into<Component>) -> bool {
        if !self.entities.contains(&id) {
            return false;
        }
        self.components.insert(id, component.into());
        true
    }

    pub fn remove_component(&mut self, id: EntityId, kind: ComponentKind) -> Option<Component> {
        self.components.remove(id, kind)
    }

    pub fn has_component(&self, id: EntityId, kind: ComponentKind) -> bool {
        self.components.has(id, kind)
    }

    /// Insert a singleton resource, returning the one it replaced.
    pub fn insert_resource<T: Any + Send + Sync>(&mut self, value: T) -> Option<T> {
        self.resources
            .insert(TypeId::of::<T>(), Box::new(value))
            .and_then(|old| old.downcast::<T>().ok())
            .map(|old| *old)
    }

    pub fn resource<T: Any + Send + Sync>(&self) -> Option<&T> {
        self.resources
            .get(&TypeId::of::<T>())
            .and_then(|r| r.downcast_ref::<T>())
    }

    pub fn resource_mut<T: Any + Send + Sync>(&mut self) -> Option<&mut T> {
        self.resources
            .get_mut(&TypeId::of::<T>())
            .and_then(|r| r.downcast_mut::<T>())
    }

    pub fn remove_resource<T: Any + Send + Sync>(&mut self) -> Option<T> {
        self.resources
            .remove(&TypeId::of::<T>())
            .and_then(|r| r.downcast::<T>().ok())
            .map(|r| *r)
    }

    pub fn has_resource<T: Any + Send + Sync>(&self) -> bool {
        self.resources.contains_key(&TypeId::of::<T>())
    }

    /// Advance the simulation by one tick.
    pub fn step(&mut self) {
        self.tick += 1;
        self.event_log.push(WorldEvent::Stepped { tick: self.tick });
    }

    /// Apply every command recorded in `buffer`, in order. Returns how many
    /// commands took effect; commands targeting missing entities are skipped.
    pub fn playback(&mut self, buffer: &mut CommandBuffer) -> usize {
        let mut applied = 0;
        for command in buffer.drain() {
            let ok = match command {
                Command::Spawn(id) => {
                    self.create_entity_with_id(id);
                    true
                }
                Command::Insert(id, component) => self.add_component(id, component),
                Command::Remove(id, kind) => self.remove_component(id, kind).is_some(),
                Command::Destroy(id) => self.destroy_entity(id),
            };
            if ok {
                applied += 1;
            } else {
                tracing::debug!(world = %self.name, "skipped command for missing entity");
            }
        }
        applied
    }

    /// Release all entities, components and resources. The world keeps its
    /// name and role so late readers can still report what it was.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.entities.clear();
        self.components = ComponentStore::new();
        self.resources.clear();
        self.disposed = true;
        self.event_log.push(WorldEvent::Disposed);
        tracing::debug!(world = %self.name, role = %self.role, "world disposed");
    }
}

impl std::fmt::Debug for World {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("World")
            .field("name", &self.name)
            .field("role", &self.role)
            .field("tick", &self.tick)
            .field("entities", &self.entities.len())
            .field("resources", &self.resources.len())
            .field("disposed", &self.disposed)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hostlink_common::NetworkEndpoint;
    use hostlink_ecs::{GoInGameRequest, NetworkId, NetworkStreamInGame, NetworkStreamRequestListen};

    #[test]
    fn world_starts_empty() {
        let w = World::new("ServerWorld", WorldRole::Server);
        assert_eq!(w.tick(), 0);
        assert_eq!(w.entity_count(), 0);
        assert_eq!(w.name(), "ServerWorld");
        assert!(!w.is_disposed());
    }

    #[test]
    fn create_and_destroy_entity() {
        let mut w = World::new("w", WorldRole::Local);
        let id = w.create_entity_with([NetworkId(1).into()]);
        assert!(w.contains(id));
        assert_eq!(w.components().network_id(id), Some(NetworkId(1)));

        assert!(w.destroy_entity(id));
        assert!(!w.contains(id));
        assert!(w.components().network_id(id).is_none());
        assert!(!w.destroy_entity(id));
    }

    #[test]
    fn add_component_requires_entity() {
        let mut w = World::new("w", WorldRole::Local);
        assert!(!w.add_component(EntityId::new(), NetworkStreamInGame));
    }

    #[test]
    fn resources_are_typed_singletons() {
        #[derive(Debug, PartialEq)]
        struct Counter(u32);

        let mut w = World::new("w", WorldRole::Client);
        assert!(w.insert_resource(Counter(1)).is_none());
        assert_eq!(w.insert_resource(Counter(2)), Some(Counter(1)));
        w.resource_mut::<Counter>().unwrap().0 += 1;
        assert_eq!(w.resource::<Counter>(), Some(&Counter(3)));
        assert_eq!(w.remove_resource::<Counter>(), Some(Counter(3)));
        assert!(!w.has_resource::<Counter>());
    }

    #[test]
    fn step_increments_tick() {
        let mut w = World::new("w", WorldRole::Server);
        w.step();
        w.step();
        assert_eq!(w.tick(), 2);
        assert_eq!(w.events().last(), Some(&WorldEvent::Stepped { tick: 2 }));
    }

    #[test]
    fn playback_applies_in_order() {
        let mut w = World::new("w", WorldRole::Client);
        let conn = w.create_entity_with([NetworkId(1).into()]);

        let mut cb = CommandBuffer::new();
        cb.insert(conn, NetworkStreamInGame);
        let rpc = cb.spawn_with([GoInGameRequest.into()]);
        cb.destroy(EntityId::new());

        let applied = w.playback(&mut cb);
        assert_eq!(applied, 3);
        assert!(cb.is_empty());
        assert!(w.components().is_in_game(conn));
        assert!(w.components().go_in_game_requests().contains(&rpc));
    }

    #[test]
    fn dispose_releases_everything() {
        let mut w = World::new("w", WorldRole::Server);
        w.create_entity_with([NetworkStreamRequestListen {
            endpoint: NetworkEndpoint::any_ipv4(),
        }
        .into()]);
        w.insert_resource(5u32);
        w.dispose();
        w.dispose();

        assert!(w.is_disposed());
        assert_eq!(w.entity_count(), 0);
        assert!(w.components().listen_requests().is_empty());
        assert!(!w.has_resource::<u32>());
        let disposals = w.events().iter().filter(|e| **e == WorldEvent::Disposed).count();
        assert_eq!(disposals, 1);
    }

    #[test]
    fn role_predicates() {
        assert!(WorldRole::Server.is_server());
        assert!(WorldRole::ThinClient.is_client());
        assert!(!WorldRole::Local.is_client());
        assert!(!WorldRole::Local.is_server());
    }
}
