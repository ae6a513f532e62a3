// Adapters layer: concrete implementations of the domain ports (http, clock, storage).

pub mod clock;
pub mod hibp;
pub mod storage;
