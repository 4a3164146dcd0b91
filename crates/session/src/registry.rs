use hostlink_common::WorldId;
use hostlink_kernel::{World, WorldRole};
use hostlink_netcode::{LinkReport, LoopbackLink, SimulationSchedule};
use hostlink_transport::{DriverConstructor, TransportError};
use std::collections::BTreeMap;

/// Owns every simulation world of the process and remembers which one is
/// the server world, the client world and the default injection world.
///
/// At most one server and one client world are registered at a time:
/// registering a different world in a slot disposes the previous occupant.
#[derive(Debug, Default)]
pub struct WorldRegistry {
    worlds: BTreeMap<WorldId, World>,
    next_id: u64,
    server: Option<WorldId>,
    client: Option<WorldId>,
    default_world: Option<WorldId>,
}

impl WorldRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.worlds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.worlds.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (WorldId, &World)> {
        self.worlds.iter().map(|(id, w)| (*id, w))
    }

    pub fn world(&self, id: WorldId) -> Option<&World> {
        self.worlds.get(&id)
    }

    pub fn world_mut(&mut self, id: WorldId) -> Option<&mut World> {
        self.worlds.get_mut(&id)
    }

    /// Create a world with no network driver.
    pub fn create_world(&mut self, name: impl Into<String>, role: WorldRole) -> WorldId {
        self.insert(World::new(name, role))
    }

    /// Create a server world whose driver comes from `drivers`. Nothing is
    /// added when driver construction fails.
    pub fn create_server_world(
        &mut self,
        name: impl Into<String>,
        drivers: &dyn DriverConstructor,
    ) -> Result<WorldId, TransportError> {
        let mut world = World::new(name, WorldRole::Server);
        drivers.create_server_driver(&mut world)?;
        Ok(self.insert(world))
    }

    pub fn create_client_world(
        &mut self,
        name: impl Into<String>,
        drivers: &dyn DriverConstructor,
    ) -> Result<WorldId, TransportError> {
        let mut world = World::new(name, WorldRole::Client);
        drivers.create_client_driver(&mut world)?;
        Ok(self.insert(world))
    }

    fn insert(&mut self, world: World) -> WorldId {
        self.next_id += 1;
        let id = WorldId(self.next_id);
        tracing::debug!(%id, world = world.name(), role = %world.role(), "world created");
        self.worlds.insert(id, world);
        id
    }

    fn remove(&mut self, id: WorldId) -> Option<World> {
        let mut world = self.worlds.remove(&id)?;
        world.dispose();
        if self.server == Some(id) {
            self.server = None;
        }
        if self.client == Some(id) {
            self.client = None;
        }
        if self.default_world == Some(id) {
            self.default_world = None;
        }
        Some(world)
    }

    /// Dispose and drop every world. Returns how many there were.
    pub fn dispose_all_worlds(&mut self) -> usize {
        let ids: Vec<WorldId> = self.worlds.keys().copied().collect();
        for id in &ids {
            self.remove(*id);
        }
        ids.len()
    }

    /// Dispose the plain local game worlds, leaving netcode worlds alone.
    pub fn destroy_local_simulation_worlds(&mut self) -> usize {
        let ids: Vec<WorldId> = self
            .worlds
            .iter()
            .filter(|(_, w)| w.role() == WorldRole::Local)
            .map(|(id, _)| *id)
            .collect();
        for id in &ids {
            self.remove(*id);
        }
        ids.len()
    }

    /// Make `id` the server world. Returns false if no such world exists.
    pub fn register_server_world(&mut self, id: WorldId) -> bool {
        if !self.worlds.contains_key(&id) {
            return false;
        }
        if let Some(previous) = self.server.filter(|p| *p != id) {
            self.remove(previous);
        }
        self.server = Some(id);
        true
    }

    pub fn register_client_world(&mut self, id: WorldId) -> bool {
        if !self.worlds.contains_key(&id) {
            return false;
        }
        if let Some(previous) = self.client.filter(|p| *p != id) {
            self.remove(previous);
        }
        self.client = Some(id);
        true
    }

    pub fn server_world_id(&self) -> Option<WorldId> {
        self.server
    }

    pub fn client_world_id(&self) -> Option<WorldId> {
        self.client
    }

    pub fn server_world(&self) -> Option<&World> {
        self.server.and_then(|id| self.worlds.get(&id))
    }

    pub fn server_world_mut(&mut self) -> Option<&mut World> {
        self.server.and_then(|id| self.worlds.get_mut(&id))
    }

    pub fn client_world(&self) -> Option<&World> {
        self.client.and_then(|id| self.worlds.get(&id))
    }

    pub fn client_world_mut(&mut self) -> Option<&mut World> {
        self.client.and_then(|id| self.worlds.get_mut(&id))
    }

    /// Both registered worlds at once, when both exist.
    pub fn server_and_client_mut(&mut self) -> Option<(&mut World, &mut World)> {
        let (server_id, client_id) = (self.server?, self.client?);
        let mut server = None;
        let mut client = None;
        for (id, world) in self.worlds.iter_mut() {
            if *id == server_id {
                server = Some(world);
            } else if *id == client_id {
                client = Some(world);
            }
        }
        Some((server?, client?))
    }

    pub fn default_injection_world_id(&self) -> Option<WorldId> {
        self.default_world
    }

    /// The world game-object systems are injected into.
    pub fn default_injection_world(&self) -> Option<&World> {
        self.default_world.and_then(|id| self.worlds.get(&id))
    }

    pub fn set_default_injection_world(&mut self, id: WorldId) -> bool {
        if !self.worlds.contains_key(&id) {
            return false;
        }
        self.default_world = Some(id);
        true
    }

    /// One simulation tick for every world: pump the loopback link between
    /// the server and client worlds when both exist, then run the schedule.
    /// Each world's event logs are drained afterwards.
    pub fn tick(
        &mut self,
        link: &mut LoopbackLink,
        schedule: &mut SimulationSchedule,
    ) -> Option<LinkReport> {
        let report = self
            .server_and_client_mut()
            .map(|(server, client)| link.pump(server, client));
        for world in self.worlds.values_mut() {
            schedule.run(world);
            let world_events = world.drain_events().len();
            let component_events = world.components_mut().drain_events().len();
            tracing::trace!(
                world = world.name(),
                world_events,
                component_events,
                "tick events drained"
            );
        }
        report
    }
}
