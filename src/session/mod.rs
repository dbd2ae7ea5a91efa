//! Fight lifecycle: enter, tick, resolve, exit

pub mod clock;
pub mod events;
pub mod state;

pub use clock::FrameClock;
pub use events::{CombatEvent, FightOutcome, InventoryFull, MemorySink, RewardSink};
pub use state::{CombatPhase, CombatSession};
