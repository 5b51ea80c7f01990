// Expansion module - Galaxy scanning, target scoring and the colonization state machine
pub mod positions;
pub mod scanner;
pub mod colonization;
pub mod policy;

pub use colonization::*;
pub use positions::*;
pub use policy::{ExpansionAction, ExpansionConfig, ExpansionConfigPatch, ExpansionPolicy, ExpansionRun, ExpansionStatus};
pub use scanner::GalaxyScanner;
