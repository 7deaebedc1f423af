pub mod applier;
pub mod builder;
pub mod types;
pub mod validator;

pub use applier::{ApplyResult, DeltaApplier};
pub use builder::DeltaBuilder;
pub use types::{FactionCreation, FactionDelta, RegionCreation, RegionDelta, WorldDelta};
pub use validator::{DeltaValidator, Severity, ValidationError};
