// Domain layer: texture models and the ports the engine is written against.

pub mod model;
pub mod ports;
