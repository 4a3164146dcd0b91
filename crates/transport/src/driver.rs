use crate::error::TransportError;
use crate::relay_data::RelayServerData;
use crate::settings::NetworkSettings;
use hostlink_kernel::World;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverSide {
    Client,
    Server,
}

impl DriverSide {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Client => "client",
            Self::Server => "server",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NetworkDriver {
    /// Plain UDP sockets.
    Udp { side: DriverSide, settings: NetworkSettings },
    /// Traffic tunnelled through a relay allocation.
    Relay {
        side: DriverSide,
        settings: NetworkSettings,
        data: RelayServerData,
    },
}

impl NetworkDriver {
    pub fn udp(side: DriverSide) -> Self {
        Self::Udp {
            side,
            settings: NetworkSettings::default(),
        }
    }

    pub fn relay(side: DriverSide, data: RelayServerData) -> Result<Self, TransportError> {
        if data.is_empty() {
            return Err(TransportError::EmptyRelayData {
                side: side.as_str(),
            });
        }
        Ok(Self::Relay {
            side,
            settings: NetworkSettings::default().with_relay_parameters(&data),
            data,
        })
    }

    pub fn side(&self) -> DriverSide {
        match self {
            Self::Udp { side, .. } | Self::Relay { side, .. } => *side,
        }
    }

    pub fn settings(&self) -> &NetworkSettings {
        match self {
            Self::Udp { settings, .. } | Self::Relay { settings, .. } => settings,
        }
    }

    pub fn is_relay(&self) -> bool {
        matches!(self, Self::Relay { .. })
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Udp { .. } => "udp",
            Self::Relay { .. } => "relay",
        }
    }
}

/// Per-world driver registry, stored as a world resource.
#[derive(Debug, Clone, Default)]
pub struct NetworkDriverStore {
    drivers: Vec<NetworkDriver>,
}

impl NetworkDriverStore {
    pub fn register(&mut self, driver: NetworkDriver) -> usize {
        self.drivers.push(driver);
        self.drivers.len() - 1
    }

    pub fn drivers(&self) -> &[NetworkDriver] {
        &self.drivers
    }

    pub fn first(&self) -> Option<&NetworkDriver> {
        self.drivers.first()
    }

    pub fn len(&self) -> usize {
        self.drivers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.drivers.is_empty()
    }
}

fn register(world: &mut World, driver: NetworkDriver) {
    tracing::debug!(
        world = world.name(),
        kind = driver.kind_name(),
        side = driver.side().as_str(),
        "registering network driver"
    );
    if let Some(store) = world.resource_mut::<NetworkDriverStore>() {
        store.register(driver);
        return;
    }
    let mut store = NetworkDriverStore::default();
    store.register(driver);
    world.insert_resource(store);
}

/// Builds the drivers a world uses when it is created.
pub trait DriverConstructor {
    fn create_client_driver(&self, world: &mut World) -> Result<(), TransportError>;
    fn create_server_driver(&self, world: &mut World) -> Result<(), TransportError>;
}

/// Plain UDP on both sides.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultDriverConstructor;

impl DriverConstructor for DefaultDriverConstructor {
    fn create_client_driver(&self, world: &mut World) -> Result<(), TransportError> {
        register(world, NetworkDriver::udp(DriverSide::Client));
        Ok(())
    }

    fn create_server_driver(&self, world: &mut World) -> Result<(), TransportError> {
        register(world, NetworkDriver::udp(DriverSide::Server));
        Ok(())
    }
}

/// Relay drivers. A pure client passes [`RelayServerData::empty`] for the
/// server half, which is never used because no server world is created.
#[derive(Debug, Clone)]
pub struct RelayDriverConstructor {
    server_data: RelayServerData,
    client_data: RelayServerData,
}

impl RelayDriverConstructor {
    pub fn new(server_data: RelayServerData, client_data: RelayServerData) -> Self {
        Self {
            server_data,
            client_data,
        }
    }

    pub fn server_data(&self) -> &RelayServerData {
        &self.server_data
    }

    pub fn client_data(&self) -> &RelayServerData {
        &self.client_data
    }
}

impl DriverConstructor for RelayDriverConstructor {
    fn create_client_driver(&self, world: &mut World) -> Result<(), TransportError> {
        let driver = NetworkDriver::relay(DriverSide::Client, self.client_data.clone())?;
        register(world, driver);
        Ok(())
    }

    fn create_server_driver(&self, world: &mut World) -> Result<(), TransportError> {
        let driver = NetworkDriver::relay(DriverSide::Server, self.server_data.clone())?;
        register(world, driver);
        Ok(())
    }
}
