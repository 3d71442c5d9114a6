// Domain layer: form model and ports (interfaces).

pub mod model;
pub mod ports;
