//! Test doubles for pipeline tests.

mod runners;

pub use runners::ScriptedStageRunner;
