// Domain layer: core models and ports (interfaces). No HTTP or config types leak in here.

pub mod model;
pub mod ports;
