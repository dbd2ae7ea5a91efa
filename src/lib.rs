//! Idle Combat - tick-driven combat core for an incremental RPG
//!
//! A scheduler calls [`session::CombatSession::tick`] with the elapsed time.
//! The session resolves attacks ([`combat`]), drives boss behaviour
//! ([`boss`]) and rolls rewards with pity guarantees ([`loot`]). All
//! quantities are arbitrary-precision [`core::Amount`]s.

pub mod boss;
pub mod combat;
pub mod core;
pub mod loot;
pub mod session;
