// Domain layer: models, ports, the hierarchy guard and the list query contract.
// Nothing here touches SQL or HTTP.

pub mod guard;
pub mod model;
pub mod ports;
pub mod query;
