use hostlink_common::WorldId;
use hostlink_ecs::ComponentKind;
use hostlink_kernel::World;
use hostlink_netcode::{LoopbackLink, SimulationSchedule};
use hostlink_relay::{FailPoint, LocalRelay};
use hostlink_session::{FlowKind, GameBootstrap, SessionConfig, SessionError, SessionEvent};

fn bootstrap(relay: &LocalRelay) -> GameBootstrap<LocalRelay> {
    GameBootstrap::new(relay.clone(), SessionConfig::default())
}

fn all_in_game(world: &World) -> bool {
    let store = world.components();
    !store.network_ids().is_empty() && store.network_ids().keys().all(|e| store.is_in_game(*e))
}

#[tokio::test]
async fn host_relay_then_join_from_another_process() {
    let relay = LocalRelay::default();
    let mut host = bootstrap(&relay);
    let code = host.start_host_relay(4).await.unwrap();

    let registry = host.registry();
    assert_eq!(registry.len(), 2);
    let server = registry.server_world().unwrap();
    let client = registry.client_world().unwrap();
    assert_eq!(server.name(), "ServerWorld");
    assert_eq!(client.name(), "ClientWorld");
    assert_eq!(
        registry.default_injection_world_id(),
        registry.server_world_id()
    );

    let listen: Vec<_> = server.components().listen_requests().values().collect();
    assert_eq!(listen[0].endpoint.to_string(), "0.0.0.0:0");
    let connect: Vec<_> = client.components().connect_requests().values().collect();
    assert_eq!(
        connect[0].endpoint.port(),
        relay.config().dtls_port,
        "client connects through the dtls relay port"
    );
    assert!(connect[0].endpoint.is_loopback());

    let mut guest = bootstrap(&relay);
    let mut events = guest.subscribe();
    guest.join_relay(&code.to_lowercase()).await.unwrap();
    assert_eq!(guest.registry().len(), 1);
    assert!(guest.registry().server_world().is_none());
    assert_eq!(
        guest.registry().default_injection_world_id(),
        guest.registry().client_world_id()
    );
    let guest_client = guest.registry().client_world().unwrap();
    let guest_connect: Vec<_> = guest_client
        .components()
        .connect_requests()
        .values()
        .collect();
    assert_eq!(guest_connect.len(), 1);
    assert!(guest_connect[0].endpoint.is_loopback());
    assert_eq!(guest_connect[0].endpoint.port(), relay.config().dtls_port);
    assert_eq!(
        events.recv().await.unwrap(),
        SessionEvent::ConnectionComplete(FlowKind::JoinRelay)
    );
}

#[tokio::test]
async fn join_code_arrives_before_completion() {
    let relay = LocalRelay::default();
    let mut host = bootstrap(&relay);
    let mut events = host.subscribe();
    host.start_host_relay(4).await.unwrap();

    match events.recv().await.unwrap() {
        SessionEvent::JoinCodeGenerated(code) => assert_eq!(code.len(), 6),
        other => panic!("expected join code first, got {other:?}"),
    }
    assert_eq!(
        events.recv().await.unwrap(),
        SessionEvent::ConnectionComplete(FlowKind::HostRelay)
    );
}

#[tokio::test]
async fn failed_join_allocation_emits_no_completion() {
    let relay = LocalRelay::default();
    let mut host = bootstrap(&relay);
    let mut events = host.subscribe();
    relay.fail_next(FailPoint::JoinAllocation);

    let err = host.start_host_relay(4).await.unwrap_err();
    assert!(matches!(err, SessionError::Relay(_)));
    assert!(host.registry().is_empty());

    assert!(matches!(
        events.recv().await.unwrap(),
        SessionEvent::JoinCodeGenerated(_)
    ));
    assert!(events.try_recv().is_err());
}

/// Start from a direct host session so an aborted relay flow has something
/// to leave untouched.
fn hosting_direct(relay: &LocalRelay) -> GameBootstrap<LocalRelay> {
    let mut boot = bootstrap(relay);
    boot.start_host_direct("0.0.0.0", 7777).unwrap();
    boot
}

fn assert_registry_kept(boot: &GameBootstrap<LocalRelay>, server: Option<WorldId>) {
    let registry = boot.registry();
    assert_eq!(registry.len(), 2);
    assert_eq!(registry.server_world_id(), server);
    assert_eq!(registry.default_injection_world_id(), server);
    let server_world = registry.server_world().unwrap();
    assert_eq!(server_world.components().listen_requests().len(), 1);
}

#[tokio::test]
async fn failed_initialize_aborts_host_relay() {
    let relay = LocalRelay::default();
    let mut boot = hosting_direct(&relay);
    let server = boot.registry().server_world_id();
    let mut events = boot.subscribe();
    relay.fail_next(FailPoint::Initialize);

    let err = boot.start_host_relay(4).await.unwrap_err();
    assert!(matches!(err, SessionError::Relay(_)));
    assert_registry_kept(&boot, server);
    assert!(events.try_recv().is_err());
    assert_eq!(relay.allocation_count(), 0);
}

#[tokio::test]
async fn failed_sign_in_aborts_join_relay() {
    let relay = LocalRelay::default();
    let mut boot = hosting_direct(&relay);
    let server = boot.registry().server_world_id();
    let mut events = boot.subscribe();
    relay.fail_next(FailPoint::SignIn);

    let err = boot.join_relay("ABCDEF").await.unwrap_err();
    assert!(matches!(err, SessionError::Relay(_)));
    assert_registry_kept(&boot, server);
    assert!(events.try_recv().is_err());
    assert!(!relay.calls().contains(&"join allocation"));
}

#[tokio::test]
async fn failed_join_code_fetch_announces_nothing() {
    let relay = LocalRelay::default();
    let mut boot = hosting_direct(&relay);
    let server = boot.registry().server_world_id();
    let mut events = boot.subscribe();
    relay.fail_next(FailPoint::GetJoinCode);

    let err = boot.start_host_relay(4).await.unwrap_err();
    assert!(matches!(err, SessionError::Relay(_)));
    assert_registry_kept(&boot, server);
    assert!(events.try_recv().is_err());
    assert_eq!(boot.last_join_code(), None);
}

#[tokio::test]
async fn unknown_join_code_fails() {
    let relay = LocalRelay::default();
    let mut guest = bootstrap(&relay);
    let err = guest.join_relay("ABCDEF").await.unwrap_err();
    assert!(matches!(err, SessionError::Relay(_)));
    assert!(guest.registry().is_empty());
}

#[test]
fn direct_host_goes_in_game() {
    let mut host = bootstrap(&LocalRelay::default());
    host.start_host_direct("0.0.0.0", 7777).unwrap();

    let mut link = LoopbackLink::new();
    let mut schedule = SimulationSchedule::netcode();
    let registry = host.registry_mut();

    let first = registry.tick(&mut link, &mut schedule).unwrap();
    assert!(first.listening);
    assert_eq!(first.accepted, 1);
    let second = registry.tick(&mut link, &mut schedule).unwrap();
    assert_eq!(second.forwarded_rpcs, 1);

    let server = registry.server_world().unwrap();
    let client = registry.client_world().unwrap();
    assert!(all_in_game(server));
    assert!(all_in_game(client));
    assert!(server.components().go_in_game_requests().is_empty());
    assert!(
        server
            .entities()
            .iter()
            .all(|e| !server.has_component(*e, ComponentKind::ReceiveRpc))
    );
}

#[tokio::test]
async fn relay_host_goes_in_game() {
    let relay = LocalRelay::default();
    let mut host = bootstrap(&relay);
    host.start_host_relay(4).await.unwrap();

    let mut link = LoopbackLink::new();
    let mut schedule = SimulationSchedule::netcode();
    for _ in 0..2 {
        host.registry_mut().tick(&mut link, &mut schedule);
    }
    assert!(all_in_game(host.registry().server_world().unwrap()));
    assert!(all_in_game(host.registry().client_world().unwrap()));
}

#[test]
fn join_direct_replaces_host_worlds() {
    let mut boot = bootstrap(&LocalRelay::default());
    boot.start_host_direct("0.0.0.0", 7777).unwrap();
    boot.join_direct("10.0.0.5", 9000).unwrap();

    let registry = boot.registry();
    assert_eq!(registry.len(), 1);
    let client = registry.client_world().unwrap();
    let connect: Vec<_> = client.components().connect_requests().values().collect();
    assert_eq!(connect[0].endpoint.to_string(), "10.0.0.5:9000");
}
