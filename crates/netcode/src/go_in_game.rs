use crate::system::{System, WorldSystemFilter};
use hostlink_ecs::{
    CommandBuffer, Component, GoInGameRequest, NetworkStreamInGame, SendRpcCommandRequest,
};
use hostlink_kernel::World;

/// Client half of the in-game handshake: any connection that has a network
/// id but is not yet in game is marked in game and sends a [`GoInGameRequest`].
#[derive(Debug, Default)]
pub struct GoInGameClientSystem;

impl System for GoInGameClientSystem {
    fn name(&self) -> &'static str {
        "go-in-game-client"
    }

    fn filter(&self) -> WorldSystemFilter {
        WorldSystemFilter::ClientSimulation
    }

    fn require_for_update(&self, world: &World) -> bool {
        let store = world.components();
        store.network_ids().keys().any(|e| !store.is_in_game(*e))
    }

    fn update(&mut self, world: &World, commands: &mut CommandBuffer) {
        let store = world.components();
        for (&connection, id) in store.network_ids() {
            if store.is_in_game(connection) {
                continue;
            }
            commands.insert(connection, NetworkStreamInGame);
            commands.spawn_with([
                Component::from(GoInGameRequest),
                Component::from(SendRpcCommandRequest { target: connection }),
            ]);
            tracing::debug!(world = world.name(), network_id = %id, "sending go-in-game request");
        }
    }
}

/// Server half: marks the source connection of each received request in
/// game and consumes the RPC entity.
#[derive(Debug, Default)]
pub struct GoInGameServerSystem;

impl System for GoInGameServerSystem {
    fn name(&self) -> &'static str {
        "go-in-game-server"
    }

    fn filter(&self) -> WorldSystemFilter {
        WorldSystemFilter::ServerSimulation
    }

    fn require_for_update(&self, world: &World) -> bool {
        let store = world.components();
        store
            .go_in_game_requests()
            .iter()
            .any(|e| store.receive_rpc(*e).is_some())
    }

    fn update(&mut self, world: &World, commands: &mut CommandBuffer) {
        let store = world.components();
        for &request in store.go_in_game_requests() {
            let Some(rpc) = store.receive_rpc(request) else {
                continue;
            };
            commands.insert(rpc.source, NetworkStreamInGame);
            match store.network_id(rpc.source) {
                Some(id) => tracing::info!(
                    world = world.name(),
                    network_id = %id,
                    "connection went in game"
                ),
                None => tracing::info!(
                    world = world.name(),
                    source = %rpc.source.short(),
                    "connection went in game"
                ),
            }
            commands.destroy(request);
        }
    }
}
