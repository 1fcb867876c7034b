//! Castaway Capital: a tick-driven clicker economy about surviving on an
//! island and building it up into a space program.

pub mod autoplay;
pub mod scheduler;
pub mod simulation;
