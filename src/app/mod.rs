// Application layer: email source, result sink and the engine that ties them to the checker.

pub mod engine;
pub mod input;
pub mod output;
