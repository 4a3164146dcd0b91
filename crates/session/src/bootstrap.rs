use crate::config::{PlayType, SessionConfig};
use crate::error::SessionError;
use crate::events::{FlowKind, SessionEvent};
use crate::registry::WorldRegistry;
use hostlink_common::NetworkEndpoint;
use hostlink_ecs::{Component, NetworkStreamRequestConnect, NetworkStreamRequestListen};
use hostlink_relay::{AuthService, RelayService, ServicesState, normalize_join_code};
use hostlink_transport::{
    DefaultDriverConstructor, DriverConstructor, RelayDriverConstructor, RelayServerData,
};
use tokio::sync::broadcast;
use tracing::Instrument;

const EVENT_CAPACITY: usize = 16;

/// Entry point for establishing a multiplayer session.
///
/// Each flow tears down any existing worlds, builds the server and/or client
/// world with the matching transport, queues the listen/connect requests
/// and announces completion on the event channel. Failures are logged and
/// returned; nothing is retried.
pub struct GameBootstrap<S> {
    services: S,
    config: SessionConfig,
    registry: WorldRegistry,
    events: broadcast::Sender<SessionEvent>,
    last_join_code: Option<String>,
}

impl<S: RelayService + AuthService> GameBootstrap<S> {
    pub fn new(services: S, config: SessionConfig) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            services,
            config,
            registry: WorldRegistry::new(),
            events,
            last_join_code: None,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    pub fn services(&self) -> &S {
        &self.services
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn registry(&self) -> &WorldRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut WorldRegistry {
        &mut self.registry
    }

    /// Join code of the most recent relay host session.
    pub fn last_join_code(&self) -> Option<&str> {
        self.last_join_code.as_deref()
    }

    /// Initialize platform services and sign in anonymously. Each step is
    /// skipped when already done, so a failed sign-in is retried by the
    /// next flow.
    pub async fn initialize_services(&self) -> Result<(), SessionError> {
        if self.services.state() != ServicesState::Initialized {
            self.services.initialize().await?;
        }
        if !self.services.is_signed_in() {
            let player = self.services.sign_in_anonymously().await?;
            tracing::info!(%player, "signed in anonymously");
        }
        Ok(())
    }

    /// Host through the relay. Returns the join code other players use.
    pub async fn start_host_relay(&mut self, max_connections: u32) -> Result<String, SessionError> {
        let span = tracing::info_span!("host_relay", max_connections);
        let result = self.host_relay(max_connections).instrument(span).await;
        log_failure(FlowKind::HostRelay, result)
    }

    pub async fn join_relay(&mut self, join_code: &str) -> Result<(), SessionError> {
        let span = tracing::info_span!("join_relay");
        let result = self.join_relay_inner(join_code).instrument(span).await;
        log_failure(FlowKind::JoinRelay, result)
    }

    /// Host over plain UDP, listening on `address:port`.
    pub fn start_host_direct(&mut self, address: &str, port: u16) -> Result<(), SessionError> {
        let _span = tracing::info_span!("host_direct", address, port).entered();
        let result = self.host_direct(address, port);
        log_failure(FlowKind::HostDirect, result)
    }

    pub fn join_direct(&mut self, ip: &str, port: u16) -> Result<(), SessionError> {
        let _span = tracing::info_span!("join_direct", ip, port).entered();
        let result = self.join_direct_inner(ip, port);
        log_failure(FlowKind::JoinDirect, result)
    }

    async fn host_relay(&mut self, max_connections: u32) -> Result<String, SessionError> {
        self.check_play_type(FlowKind::HostRelay)?;
        self.initialize_services().await?;

        let allocation = self.services.create_allocation(max_connections).await?;
        let join_code = self.services.get_join_code(allocation.allocation_id).await?;
        let server_data =
            RelayServerData::from_allocation(&allocation, &self.config.connection_type)?;

        tracing::info!(%join_code, "join code generated");
        self.last_join_code = Some(join_code.clone());
        self.emit(SessionEvent::JoinCodeGenerated(join_code.clone()));

        let join = self.services.join_allocation(&join_code).await?;
        let client_data =
            RelayServerData::from_join_allocation(&join, &self.config.connection_type)?;

        let relay_port = client_data.port();
        let drivers = RelayDriverConstructor::new(server_data, client_data);
        self.setup_host(
            &drivers,
            NetworkEndpoint::any_ipv4(),
            NetworkEndpoint::loopback_ipv4().with_port(relay_port),
        )?;
        self.emit(SessionEvent::ConnectionComplete(FlowKind::HostRelay));
        Ok(join_code)
    }

    async fn join_relay_inner(&mut self, join_code: &str) -> Result<(), SessionError> {
        let join_code = normalize_join_code(join_code)?;
        self.check_play_type(FlowKind::JoinRelay)?;
        self.initialize_services().await?;

        let join = self.services.join_allocation(&join_code).await?;
        let client_data =
            RelayServerData::from_join_allocation(&join, &self.config.connection_type)?;

        let relay_port = client_data.port();
        let drivers = RelayDriverConstructor::new(RelayServerData::empty(), client_data);
        self.setup_client(&drivers, NetworkEndpoint::loopback_ipv4().with_port(relay_port))?;
        tracing::info!(%join_code, "joined relay session");
        self.emit(SessionEvent::ConnectionComplete(FlowKind::JoinRelay));
        Ok(())
    }

    fn host_direct(&mut self, address: &str, port: u16) -> Result<(), SessionError> {
        self.check_play_type(FlowKind::HostDirect)?;
        let listen = NetworkEndpoint::parse(address, port)?;
        self.setup_host(
            &DefaultDriverConstructor,
            listen,
            NetworkEndpoint::loopback_ipv4().with_port(listen.port()),
        )?;
        self.emit(SessionEvent::ConnectionComplete(FlowKind::HostDirect));
        tracing::info!(%listen, "hosting direct session");
        Ok(())
    }

    fn join_direct_inner(&mut self, ip: &str, port: u16) -> Result<(), SessionError> {
        self.check_play_type(FlowKind::JoinDirect)?;
        let endpoint = NetworkEndpoint::parse(ip, port)?;
        self.setup_client(&DefaultDriverConstructor, endpoint)?;
        self.emit(SessionEvent::ConnectionComplete(FlowKind::JoinDirect));
        tracing::info!(%endpoint, "joining direct session");
        Ok(())
    }

    fn setup_host(
        &mut self,
        drivers: &dyn DriverConstructor,
        listen: NetworkEndpoint,
        connect: NetworkEndpoint,
    ) -> Result<(), SessionError> {
        self.registry.dispose_all_worlds();

        let server = self
            .registry
            .create_server_world(self.config.server_world_name.as_str(), drivers)?;
        let client = self
            .registry
            .create_client_world(self.config.client_world_name.as_str(), drivers)?;

        if let Some(world) = self.registry.world_mut(server) {
            world.create_entity_with([Component::from(NetworkStreamRequestListen {
                endpoint: listen,
            })]);
        }
        if let Some(world) = self.registry.world_mut(client) {
            world.create_entity_with([Component::from(NetworkStreamRequestConnect {
                endpoint: connect,
            })]);
        }

        self.registry.set_default_injection_world(server);
        self.registry.register_server_world(server);
        self.registry.register_client_world(client);
        tracing::debug!(%listen, %connect, "host worlds ready");
        Ok(())
    }

    fn setup_client(
        &mut self,
        drivers: &dyn DriverConstructor,
        connect: NetworkEndpoint,
    ) -> Result<(), SessionError> {
        self.registry.dispose_all_worlds();

        let client = self
            .registry
            .create_client_world(self.config.client_world_name.as_str(), drivers)?;
        if let Some(world) = self.registry.world_mut(client) {
            world.create_entity_with([Component::from(NetworkStreamRequestConnect {
                endpoint: connect,
            })]);
        }

        self.registry.set_default_injection_world(client);
        self.registry.register_client_world(client);
        tracing::debug!(%connect, "client world ready");
        Ok(())
    }

    fn check_play_type(&self, flow: FlowKind) -> Result<(), SessionError> {
        let configured = self.config.play_type;
        let allowed = if flow.is_host() {
            configured == PlayType::ClientAndServer
        } else {
            configured.includes_client()
        };
        if allowed {
            return Ok(());
        }
        let required = if flow.is_host() {
            PlayType::ClientAndServer
        } else {
            PlayType::Client
        };
        Err(SessionError::PlayTypeMismatch {
            flow,
            required,
            configured,
        })
    }

    fn emit(&self, event: SessionEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }
}

fn log_failure<T>(flow: FlowKind, result: Result<T, SessionError>) -> Result<T, SessionError> {
    if let Err(error) = &result {
        tracing::error!(%flow, %error, "session flow failed");
    }
    result
}
