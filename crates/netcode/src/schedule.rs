use crate::go_in_game::{GoInGameClientSystem, GoInGameServerSystem};
use crate::system::System;
use hostlink_ecs::CommandBuffer;
use hostlink_kernel::World;

/// Ordered list of systems run against one world per tick.
///
/// All systems share one command buffer, played back after the last system
/// ran. The world tick then advances.
#[derive(Default)]
pub struct SimulationSchedule {
    systems: Vec<Box<dyn System>>,
}

impl SimulationSchedule {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule with the go-in-game client and server systems.
    pub fn netcode() -> Self {
        let mut schedule = Self::new();
        schedule.add_system(GoInGameClientSystem);
        schedule.add_system(GoInGameServerSystem);
        schedule
    }

    pub fn add_system(&mut self, system: impl System + 'static) {
        self.systems.push(Box::new(system));
    }

    pub fn system_names(&self) -> Vec<&'static str> {
        self.systems.iter().map(|s| s.name()).collect()
    }

    /// Run one tick. Returns how many systems updated; disposed worlds are
    /// left alone.
    pub fn run(&mut self, world: &mut World) -> usize {
        if world.is_disposed() {
            return 0;
        }
        let mut commands = CommandBuffer::new();
        let mut ran = 0;
        for system in &mut self.systems {
            if !system.filter().matches(world.role()) || !system.require_for_update(world) {
                continue;
            }
            system.update(world, &mut commands);
            ran += 1;
        }
        if !commands.is_empty() {
            let applied = world.playback(&mut commands);
            tracing::debug!(world = world.name(), applied, "played back commands");
        }
        world.step();
        ran
    }
}

impl std::fmt::Debug for SimulationSchedule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimulationSchedule")
            .field("systems", &self.system_names())
            .finish()
    }
}
