//! Boss fight behaviour layered on top of the regular attack loop

pub mod mechanics;

pub use mechanics::{BossDirective, BossMechanics, ThresholdTrigger, UltimateCycle};
