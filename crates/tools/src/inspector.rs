use hostlink_common::{EntityId, WorldId};
use hostlink_ecs::ComponentKind;
use hostlink_kernel::{World, WorldRole};
use hostlink_session::WorldRegistry;
use hostlink_transport::NetworkDriverStore;
use serde::Serialize;

/// World inspector for developer tooling.
///
/// Read-only queries against session worlds for debugging and the CLI.
pub struct WorldInspector;

impl WorldInspector {
    /// Produce a summary of the world state.
    pub fn summary(world: &World) -> WorldSummary {
        let store = world.components();
        WorldSummary {
            name: world.name().to_string(),
            role: world.role(),
            tick: world.tick(),
            entity_count: world.entity_count(),
            connections: store.connections().len(),
            in_game: store
                .connections()
                .keys()
                .filter(|e| store.is_in_game(**e))
                .count(),
            pending_listen: store.listen_requests().len(),
            pending_connect: store.connect_requests().len(),
            pending_rpcs: store.send_rpcs().len() + store.receive_rpcs().len(),
            driver: world
                .resource::<NetworkDriverStore>()
                .and_then(|d| d.first())
                .map(|d| d.kind_name()),
            disposed: world.is_disposed(),
        }
    }

    /// Component kinds attached to one entity.
    pub fn inspect_entity(world: &World, id: EntityId) -> Option<EntityInfo> {
        if !world.contains(id) {
            return None;
        }
        let store = world.components();
        Some(EntityInfo {
            id,
            components: store.kinds_of(id),
            network_id: store.network_id(id).map(|n| n.0),
        })
    }

    /// List all entity IDs in the world.
    pub fn list_entities(world: &World) -> Vec<EntityId> {
        world.entities().iter().copied().collect()
    }

    /// One row per registered world, in creation order.
    pub fn registry_report(registry: &WorldRegistry) -> Vec<RegistryEntry> {
        registry
            .iter()
            .map(|(id, world)| RegistryEntry {
                id,
                is_server: registry.server_world_id() == Some(id),
                is_client: registry.client_world_id() == Some(id),
                is_default: registry.default_injection_world_id() == Some(id),
                summary: Self::summary(world),
            })
            .collect()
    }
}

/// Summary of world state for the inspector.
#[derive(Debug, Clone, Serialize)]
pub struct WorldSummary {
    pub name: String,
    pub role: WorldRole,
    pub tick: u64,
    pub entity_count: usize,
    pub connections: usize,
    pub in_game: usize,
    pub pending_listen: usize,
    pub pending_connect: usize,
    pub pending_rpcs: usize,
    pub driver: Option<&'static str>,
    pub disposed: bool,
}

impl std::fmt::Display for WorldSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} ({}): tick={} entities={} connections={} in_game={} driver={}",
            self.name,
            self.role,
            self.tick,
            self.entity_count,
            self.connections,
            self.in_game,
            self.driver.unwrap_or("none"),
        )?;
        if self.pending_listen + self.pending_connect + self.pending_rpcs > 0 {
            write!(
                f,
                " pending(listen={} connect={} rpc={})",
                self.pending_listen, self.pending_connect, self.pending_rpcs
            )?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RegistryEntry {
    pub id: WorldId,
    pub is_server: bool,
    pub is_client: bool,
    pub is_default: bool,
    pub summary: WorldSummary,
}

impl std::fmt::Display for RegistryEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut tags = Vec::new();
        if self.is_server {
            tags.push("server");
        }
        if self.is_client {
            tags.push("client");
        }
        if self.is_default {
            tags.push("default");
        }
        write!(f, "{} [{}] {}", self.id, tags.join(","), self.summary)
    }
}

/// Detailed info about a single entity.
#[derive(Debug, Clone, Serialize)]
pub struct EntityInfo {
    pub id: EntityId,
    pub components: Vec<ComponentKind>,
    pub network_id: Option<u32>,
}

impl std::fmt::Display for EntityInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Entity [{}] {:?}", self.id.short(), self.components)?;
        if let Some(id) = self.network_id {
            write!(f, " network_id={id}")?;
        }
        Ok(())
    }
}
