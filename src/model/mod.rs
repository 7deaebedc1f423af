pub mod faction;
pub mod power;
pub mod region;
pub mod resources;
pub mod world;

pub use faction::{Faction, Trait};
pub use power::Power;
pub use region::{Environment, Region, SocioEconomic};
pub use resources::Resources;
pub use world::World;
