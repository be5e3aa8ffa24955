// Domain layer: the user model, collaborator errors and the capability ports.
// No runtime or logging dependencies here.

pub mod errors;
pub mod model;
pub mod ports;
