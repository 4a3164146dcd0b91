//! Transport drivers for netcode worlds.
//!
//! A [`DriverConstructor`] installs a [`NetworkDriverStore`] resource into
//! each world it builds. Relay sessions use [`RelayDriverConstructor`] with
//! parameters converted from relay allocations by [`RelayServerData`].

pub mod driver;
pub mod error;
pub mod relay_data;
pub mod settings;

pub use driver::{
    DefaultDriverConstructor, DriverConstructor, DriverSide, NetworkDriver, NetworkDriverStore,
    RelayDriverConstructor,
};
pub use error::TransportError;
pub use relay_data::{HostRelayData, RelayServerData};
pub use settings::NetworkSettings;

pub fn crate_info() -> &'static str {
    "hostlink-transport v0.1.0"
}
