use hostlink_ecs::CommandBuffer;
use hostlink_kernel::{World, WorldRole};

/// Which worlds a system runs in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorldSystemFilter {
    /// Client and thin-client worlds.
    ClientSimulation,
    ServerSimulation,
}

impl WorldSystemFilter {
    pub fn matches(self, role: WorldRole) -> bool {
        match self {
            Self::ClientSimulation => role.is_client(),
            Self::ServerSimulation => role.is_server(),
        }
    }
}

/// A unit of per-tick logic. Systems read the world and record structural
/// changes into a command buffer that the schedule plays back afterwards.
pub trait System: Send {
    fn name(&self) -> &'static str;

    fn filter(&self) -> WorldSystemFilter;

    /// Skip `update` this tick unless this returns true.
    fn require_for_update(&self, _world: &World) -> bool {
        true
    }

    fn update(&mut self, world: &World, commands: &mut CommandBuffer);
}
