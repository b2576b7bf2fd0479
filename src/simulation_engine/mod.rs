pub mod clock;
pub mod events;
pub mod journey;
pub mod movement;
