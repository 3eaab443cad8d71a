// Domain layer: core models and ports (interfaces). No framework types leak in here.

pub mod model;
pub mod ports;
