//! Application lifecycle: startup wiring, server mode and shutdown

pub mod lifetime;
pub mod modes;
