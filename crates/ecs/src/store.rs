use crate::components::*;
use hostlink_common::EntityId;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Events produced by component mutations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ComponentEvent {
    Added { entity: EntityId, component: Component },
    Replaced { entity: EntityId, old: Component, new: Component },
    Removed { entity: EntityId, component: Component },
}

/// Deterministic component storage for the netcode component types.
///
/// Uses BTreeMap/BTreeSet for canonical iteration order. All mutations
/// produce events.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ComponentStore {
    listen_requests: BTreeMap<EntityId, NetworkStreamRequestListen>,
    connect_requests: BTreeMap<EntityId, NetworkStreamRequestConnect>,
    network_ids: BTreeMap<EntityId, NetworkId>,
    connections: BTreeMap<EntityId, NetworkStreamConnection>,
    in_game: BTreeSet<EntityId>,
    go_in_game: BTreeSet<EntityId>,
    send_rpcs: BTreeMap<EntityId, SendRpcCommandRequest>,
    receive_rpcs: BTreeMap<EntityId, ReceiveRpcCommandRequest>,
    #[serde(skip)]
    events: Vec<ComponentEvent>,
}

impl ComponentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drain and return all pending component events.
    pub fn drain_events(&mut self) -> Vec<ComponentEvent> {
        std::mem::take(&mut self.events)
    }

    /// Read-only access to pending events.
    pub fn events(&self) -> &[ComponentEvent] {
        &self.events
    }

    /// Add or replace a component on `entity`. Returns the previous value.
    pub fn insert(&mut self, entity: EntityId, component: Component) -> Option<Component> {
        let old = self.raw_insert(entity, component);
        match old {
            Some(old) => self.events.push(ComponentEvent::Replaced {
                entity,
                old,
                new: component,
            }),
            None => self.events.push(ComponentEvent::Added { entity, component }),
        }
        old
    }

    /// Remove the component of `kind` from `entity`, if present.
    pub fn remove(&mut self, entity: EntityId, kind: ComponentKind) -> Option<Component> {
        let removed = self.raw_remove(entity, kind);
        if let Some(component) = removed {
            self.events.push(ComponentEvent::Removed { entity, component });
        }
        removed
    }

    /// Remove all components for an entity.
    pub fn remove_entity(&mut self, entity: EntityId) {
        for kind in ComponentKind::ALL {
            self.remove(entity, kind);
        }
    }

    pub fn has(&self, entity: EntityId, kind: ComponentKind) -> bool {
        match kind {
            ComponentKind::RequestListen => self.listen_requests.contains_key(&entity),
            ComponentKind::RequestConnect => self.connect_requests.contains_key(&entity),
            ComponentKind::NetworkId => self.network_ids.contains_key(&entity),
            ComponentKind::Connection => self.connections.contains_key(&entity),
            ComponentKind::InGame => self.in_game.contains(&entity),
            ComponentKind::GoInGame => self.go_in_game.contains(&entity),
            ComponentKind::SendRpc => self.send_rpcs.contains_key(&entity),
            ComponentKind::ReceiveRpc => self.receive_rpcs.contains_key(&entity),
        }
    }

    /// Kinds of every component currently attached to `entity`.
    pub fn kinds_of(&self, entity: EntityId) -> Vec<ComponentKind> {
        ComponentKind::ALL
            .into_iter()
            .filter(|k| self.has(entity, *k))
            .collect()
    }

    pub fn listen_request(&self, entity: EntityId) -> Option<&NetworkStreamRequestListen> {
        self.listen_requests.get(&entity)
    }

    pub fn listen_requests(&self) -> &BTreeMap<EntityId, NetworkStreamRequestListen> {
        &self.listen_requests
    }

    pub fn connect_request(&self, entity: EntityId) -> Option<&NetworkStreamRequestConnect> {
        self.connect_requests.get(&entity)
    }

    pub fn connect_requests(&self) -> &BTreeMap<EntityId, NetworkStreamRequestConnect> {
        &self.connect_requests
    }

    pub fn network_id(&self, entity: EntityId) -> Option<NetworkId> {
        self.network_ids.get(&entity).copied()
    }

    pub fn network_ids(&self) -> &BTreeMap<EntityId, NetworkId> {
        &self.network_ids
    }

    pub fn connection(&self, entity: EntityId) -> Option<&NetworkStreamConnection> {
        self.connections.get(&entity)
    }

    pub fn connections(&self) -> &BTreeMap<EntityId, NetworkStreamConnection> {
        &self.connections
    }

    pub fn is_in_game(&self, entity: EntityId) -> bool {
        self.in_game.contains(&entity)
    }

    pub fn in_game(&self) -> &BTreeSet<EntityId> {
        &self.in_game
    }

    pub fn go_in_game_requests(&self) -> &BTreeSet<EntityId> {
        &self.go_in_game
    }

    pub fn send_rpc(&self, entity: EntityId) -> Option<&SendRpcCommandRequest> {
        self.send_rpcs.get(&entity)
    }

    pub fn send_rpcs(&self) -> &BTreeMap<EntityId, SendRpcCommandRequest> {
        &self.send_rpcs
    }

    pub fn receive_rpc(&self, entity: EntityId) -> Option<&ReceiveRpcCommandRequest> {
        self.receive_rpcs.get(&entity)
    }

    pub fn receive_rpcs(&self) -> &BTreeMap<EntityId, ReceiveRpcCommandRequest> {
        &self.receive_rpcs
    }

    fn raw_insert(&mut self, entity: EntityId, component: Component) -> Option<Component> {
        match component {
            Component::RequestListen(c) => self
                .listen_requests
                .insert(entity, c)
                .map(Component::RequestListen),
            Component::RequestConnect(c) => self
                .connect_requests
                .insert(entity, c)
                .map(Component::RequestConnect),
            Component::NetworkId(c) => self.network_ids.insert(entity, c).map(Component::NetworkId),
            Component::Connection(c) => self.connections.insert(entity, c).map(Component::Connection),
            Component::InGame(c) => (!self.in_game.insert(entity)).then_some(Component::InGame(c)),
            Component::GoInGame(c) => {
                (!self.go_in_game.insert(entity)).then_some(Component::GoInGame(c))
            }
            Component::SendRpc(c) => self.send_rpcs.insert(entity, c).map(Component::SendRpc),
            Component::ReceiveRpc(c) => self.receive_rpcs.insert(entity, c).map(Component::ReceiveRpc),
        }
    }

    fn raw_remove(&mut self, entity: EntityId, kind: ComponentKind) -> Option<Component> {
        match kind {
            ComponentKind::RequestListen => self
                .listen_requests
                .remove(&entity)
                .map(Component::RequestListen),
            ComponentKind::RequestConnect => self
                .connect_requests
                .remove(&entity)
                .map(Component::RequestConnect),
            ComponentKind::NetworkId => self.network_ids.remove(&entity).map(Component::NetworkId),
            ComponentKind::Connection => self.connections.remove(&entity).map(Component::Connection),
            ComponentKind::InGame => self
                .in_game
                .remove(&entity)
                .then_some(Component::InGame(NetworkStreamInGame)),
            ComponentKind::GoInGame => self
                .go_in_game
                .remove(&entity)
                .then_some(Component::GoInGame(GoInGameRequest)),
            ComponentKind::SendRpc => self.send_rpcs.remove(&entity).map(Component::SendRpc),
            ComponentKind::ReceiveRpc => self.receive_rpcs.remove(&entity).map(Component::ReceiveRpc),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hostlink_common::NetworkEndpoint;

    #[test]
    fn insert_and_remove_listen_request() {
        let mut store = ComponentStore::new();
        let id = EntityId::new();
        let listen = NetworkStreamRequestListen {
            endpoint: NetworkEndpoint::any_ipv4().with_port(7777),
        };
        store.insert(id, listen.into());
        assert_eq!(store.listen_request(id), Some(&listen));

        store.remove(id, ComponentKind::RequestListen);
        assert!(store.listen_request(id).is_none());
        assert_eq!(store.events().len(), 2);
    }

    #[test]
    fn replacing_network_id_produces_replaced_event() {
        let mut store = ComponentStore::new();
        let id = EntityId::new();
        store.insert(id, NetworkId(1).into());
        let old = store.insert(id, NetworkId(2).into());
        assert_eq!(old, Some(Component::NetworkId(NetworkId(1))));
        assert_eq!(store.network_id(id), Some(NetworkId(2)));
        assert!(matches!(store.events()[1], ComponentEvent::Replaced { .. }));
    }

    #[test]
    fn marker_components_report_previous_presence() {
        let mut store = ComponentStore::new();
        let id = EntityId::new();
        assert!(store.insert(id, NetworkStreamInGame.into()).is_none());
        assert!(store.insert(id, NetworkStreamInGame.into()).is_some());
        assert!(store.is_in_game(id));
    }

    #[test]
    fn remove_entity_clears_all() {
        let mut store = ComponentStore::new();
        let id = EntityId::new();
        store.insert(id, NetworkId(3).into());
        store.insert(id, NetworkStreamInGame.into());
        store.insert(id, GoInGameRequest.into());
        store.insert(id, SendRpcCommandRequest { target: EntityId::new() }.into());

        store.remove_entity(id);
        assert!(store.kinds_of(id).is_empty());
    }

    #[test]
    fn removing_missing_component_is_silent() {
        let mut store = ComponentStore::new();
        assert!(store.remove(EntityId::new(), ComponentKind::Connection).is_none());
        assert!(store.events().is_empty());
    }

    #[test]
    fn deterministic_iteration_order() {
        let mut store = ComponentStore::new();
        let mut ids: Vec<EntityId> = (0..50).map(|_| EntityId::new()).collect();
        for (i, id) in ids.iter().enumerate() {
            store.insert(*id, NetworkId(i as u32).into());
        }
        ids.sort();
        let stored: Vec<EntityId> = store.network_ids().keys().copied().collect();
        assert_eq!(stored, ids);
    }
}
