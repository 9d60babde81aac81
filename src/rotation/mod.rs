pub mod engine;
pub mod policy;

pub use engine::{RotationEngine, RotationEvent, RotationReport};
pub use policy::RetentionPolicy;
