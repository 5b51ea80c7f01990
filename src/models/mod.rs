// Models module - Game state snapshots and policy result types

pub mod resources;
pub mod buildings;
pub mod galaxy;
pub mod planet;
pub mod responses;

// Re-export all models for easier imports
pub use resources::*;
pub use buildings::*;
pub use galaxy::*;
pub use planet::*;
pub use responses::*;
