use hostlink_common::{EntityId, NetworkEndpoint};
use hostlink_ecs::{
    Component, GoInGameRequest, NetworkId, NetworkStreamConnection, NetworkStreamRequestConnect,
    ReceiveRpcCommandRequest,
};
use hostlink_kernel::World;
use hostlink_transport::{NetworkDriver, NetworkDriverStore};

/// Base of the ephemeral ports assigned to linked clients.
const EPHEMERAL_PORT_BASE: u16 = 50_000;

/// What one [`LoopbackLink::pump`] call did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LinkReport {
    pub listening: bool,
    pub accepted: usize,
    pub forwarded_rpcs: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct LinkedPair {
    client: EntityId,
    server: EntityId,
    network_id: NetworkId,
}

/// In-process stand-in for the network-stream receive system of a host.
///
/// Connects a server world and a client world living in the same process:
/// consumes listen and connect requests, creates connection entities on both
/// sides and moves outgoing RPC entities from the client to the server.
#[derive(Debug, Clone)]
pub struct LoopbackLink {
    listening: Option<NetworkEndpoint>,
    next_network_id: u32,
    pairs: Vec<LinkedPair>,
}

impl Default for LoopbackLink {
    fn default() -> Self {
        Self {
            listening: None,
            next_network_id: 1,
            pairs: Vec::new(),
        }
    }
}

impl LoopbackLink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn listening(&self) -> Option<NetworkEndpoint> {
        self.listening
    }

    pub fn connection_count(&self) -> usize {
        self.pairs.len()
    }

    /// Server-side connection entity paired with a client connection.
    pub fn server_peer(&self, client_connection: EntityId) -> Option<EntityId> {
        self.pairs
            .iter()
            .find(|p| p.client == client_connection)
            .map(|p| p.server)
    }

    pub fn pump(&mut self, server: &mut World, client: &mut World) -> LinkReport {
        self.consume_listen_requests(server);
        let accepted = self.accept_connections(server, client);
        let forwarded_rpcs = self.forward_rpcs(server, client);
        LinkReport {
            listening: self.listening.is_some(),
            accepted,
            forwarded_rpcs,
        }
    }

    fn consume_listen_requests(&mut self, server: &mut World) {
        let requests: Vec<_> = server
            .components()
            .listen_requests()
            .iter()
            .map(|(e, r)| (*e, r.endpoint))
            .collect();
        for (entity, endpoint) in requests {
            server.destroy_entity(entity);
            tracing::info!(world = server.name(), %endpoint, "listening");
            self.listening = Some(endpoint);
        }
    }

    fn accept_connections(&mut self, server: &mut World, client: &mut World) -> usize {
        let Some(listen) = self.listening else {
            return 0;
        };
        let requests: Vec<(EntityId, NetworkStreamRequestConnect)> = client
            .components()
            .connect_requests()
            .iter()
            .map(|(e, r)| (*e, *r))
            .collect();
        let mut accepted = 0;
        for (entity, request) in requests {
            if !reachable(listen, request.endpoint, server, client) {
                tracing::debug!(
                    world = client.name(),
                    endpoint = %request.endpoint,
                    "connect request does not reach listener"
                );
                continue;
            }
            client.destroy_entity(entity);

            let network_id = NetworkId(self.next_network_id);
            self.next_network_id += 1;
            let client_port = EPHEMERAL_PORT_BASE.wrapping_add(network_id.0 as u16);

            let client_conn = client.create_entity_with([
                Component::from(network_id),
                Component::from(NetworkStreamConnection {
                    remote: request.endpoint,
                }),
            ]);
            let server_conn = server.create_entity_with([
                Component::from(network_id),
                Component::from(NetworkStreamConnection {
                    remote: NetworkEndpoint::loopback_ipv4().with_port(client_port),
                }),
            ]);
            self.pairs.push(LinkedPair {
                client: client_conn,
                server: server_conn,
                network_id,
            });
            tracing::info!(
                server = server.name(),
                client = client.name(),
                network_id = %network_id,
                "connection accepted"
            );
            accepted += 1;
        }
        accepted
    }

    fn forward_rpcs(&mut self, server: &mut World, client: &mut World) -> usize {
        let outgoing: Vec<(EntityId, EntityId)> = client
            .components()
            .send_rpcs()
            .iter()
            .filter(|(e, _)| client.components().go_in_game_requests().contains(*e))
            .map(|(e, r)| (*e, r.target))
            .collect();
        let mut forwarded = 0;
        for (rpc, target) in outgoing {
            let Some(pair) = self.pairs.iter().find(|p| p.client == target) else {
                continue;
            };
            client.destroy_entity(rpc);
            server.create_entity_with([
                Component::from(GoInGameRequest),
                Component::from(ReceiveRpcCommandRequest {
                    source: pair.server,
                }),
            ]);
            tracing::debug!(network_id = %pair.network_id, "forwarded go-in-game rpc");
            forwarded += 1;
        }
        forwarded
    }
}

/// Relay drivers reach each other through a shared allocation; direct UDP
/// needs the connect port to hit the listen port.
fn reachable(
    listen: NetworkEndpoint,
    connect: NetworkEndpoint,
    server: &World,
    client: &World,
) -> bool {
    if let (Some(s), Some(c)) = (relay_allocation(server), relay_allocation(client)) {
        return s == c;
    }
    listen.port() == connect.port()
        && (listen.is_any() || connect.is_loopback() || listen.address() == connect.address())
}

fn relay_allocation(world: &World) -> Option<[u8; 16]> {
    world
        .resource::<NetworkDriverStore>()?
        .drivers()
        .iter()
        .find_map(|d| match d {
            NetworkDriver::Relay { data, .. } => Some(data.allocation_id),
            NetworkDriver::Udp { .. } => None,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use hostlink_ecs::{ComponentKind, NetworkStreamRequestListen, SendRpcCommandRequest};
    use hostlink_kernel::WorldRole;
    use hostlink_transport::{
        DefaultDriverConstructor, DriverConstructor, RelayDriverConstructor, RelayServerData,
    };

    fn direct_worlds(listen_port: u16, connect_port: u16) -> (World, World) {
        let mut server = World::new("ServerWorld", WorldRole::Server);
        let mut client = World::new("ClientWorld", WorldRole::Client);
        DefaultDriverConstructor.create_server_driver(&mut server).unwrap();
        DefaultDriverConstructor.create_client_driver(&mut client).unwrap();
        server.create_entity_with([Component::from(NetworkStreamRequestListen {
            endpoint: NetworkEndpoint::any_ipv4().with_port(listen_port),
        })]);
        client.create_entity_with([Component::from(NetworkStreamRequestConnect {
            endpoint: NetworkEndpoint::loopback_ipv4().with_port(connect_port),
        })]);
        (server, client)
    }

    fn relay_data(id: u8) -> RelayServerData {
        RelayServerData {
            endpoint: Some(NetworkEndpoint::loopback_ipv4().with_port(30001)),
            allocation_id: [id; 16],
            connection_data: vec![1; 16],
            key: vec![2; 64],
            ..RelayServerData::default()
        }
    }

    #[test]
    fn direct_pair_on_matching_port() {
        let (mut server, mut client) = direct_worlds(7777, 7777);
        let mut link = LoopbackLink::new();
        let report = link.pump(&mut server, &mut client);
        assert!(report.listening);
        assert_eq!(report.accepted, 1);
        assert!(server.components().listen_requests().is_empty());
        assert!(client.components().connect_requests().is_empty());

        let client_ids: Vec<_> = client.components().network_ids().values().copied().collect();
        let server_ids: Vec<_> = server.components().network_ids().values().copied().collect();
        assert_eq!(client_ids, vec![NetworkId(1)]);
        assert_eq!(server_ids, vec![NetworkId(1)]);
    }

    #[test]
    fn direct_port_mismatch_stays_pending() {
        let (mut server, mut client) = direct_worlds(7777, 7778);
        let mut link = LoopbackLink::new();
        let report = link.pump(&mut server, &mut client);
        assert_eq!(report.accepted, 0);
        assert_eq!(client.components().connect_requests().len(), 1);
    }

    #[test]
    fn relay_pairs_by_allocation() {
        let mut server = World::new("ServerWorld", WorldRole::Server);
        let mut client = World::new("ClientWorld", WorldRole::Client);
        let ctor = RelayDriverConstructor::new(relay_data(3), relay_data(3));
        ctor.create_server_driver(&mut server).unwrap();
        ctor.create_client_driver(&mut client).unwrap();
        server.create_entity_with([Component::from(NetworkStreamRequestListen {
            endpoint: NetworkEndpoint::any_ipv4(),
        })]);
        client.create_entity_with([Component::from(NetworkStreamRequestConnect {
            endpoint: NetworkEndpoint::loopback_ipv4().with_port(30001),
        })]);
        let report = LoopbackLink::new().pump(&mut server, &mut client);
        assert_eq!(report.accepted, 1);
    }

    #[test]
    fn relay_rejects_other_allocation() {
        let mut server = World::new("ServerWorld", WorldRole::Server);
        let mut client = World::new("ClientWorld", WorldRole::Client);
        RelayDriverConstructor::new(relay_data(3), relay_data(3))
            .create_server_driver(&mut server)
            .unwrap();
        RelayDriverConstructor::new(RelayServerData::empty(), relay_data(4))
            .create_client_driver(&mut client)
            .unwrap();
        server.create_entity_with([Component::from(NetworkStreamRequestListen {
            endpoint: NetworkEndpoint::any_ipv4(),
        })]);
        client.create_entity_with([Component::from(NetworkStreamRequestConnect {
            endpoint: NetworkEndpoint::loopback_ipv4().with_port(30001),
        })]);
        let report = LoopbackLink::new().pump(&mut server, &mut client);
        assert_eq!(report.accepted, 0);
    }

    #[test]
    fn forwards_go_in_game_rpc() {
        let (mut server, mut client) = direct_worlds(7777, 7777);
        let mut link = LoopbackLink::new();
        link.pump(&mut server, &mut client);
        let client_conn = *client.components().network_ids().keys().next().unwrap();
        let rpc = client.create_entity_with([
            Component::from(GoInGameRequest),
            Component::from(SendRpcCommandRequest {
                target: client_conn,
            }),
        ]);

        let report = link.pump(&mut server, &mut client);
        assert_eq!(report.forwarded_rpcs, 1);
        assert!(!client.contains(rpc));

        let server_conn = link.server_peer(client_conn).unwrap();
        let received: Vec<_> = server.components().receive_rpcs().iter().collect();
        assert_eq!(received.len(), 1);
        assert_eq!(received[0].1.source, server_conn);
        assert!(server.has_component(*received[0].0, ComponentKind::GoInGame));
    }

    #[test]
    fn network_ids_increase() {
        let (mut server, mut client) = direct_worlds(7777, 7777);
        client.create_entity_with([Component::from(NetworkStreamRequestConnect {
            endpoint: NetworkEndpoint::loopback_ipv4().with_port(7777),
        })]);
        let mut link = LoopbackLink::new();
        assert_eq!(link.pump(&mut server, &mut client).accepted, 2);
        let mut ids: Vec<_> = server.components().network_ids().values().copied().collect();
        ids.sort();
        assert_eq!(ids, vec![NetworkId(1), NetworkId(2)]);
        assert_eq!(link.connection_count(), 2);
    }
}
