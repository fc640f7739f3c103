/// Appliance profiles and running appliance instances.
pub mod appliance;
/// Simulated and wall clocks.
pub mod clock;
pub mod live;
pub mod random;
/// Periodic price refresh and simulator tasks.
pub mod scheduler;
