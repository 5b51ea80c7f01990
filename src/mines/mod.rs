// Mines module - Mine upgrade decisions, storage gating and the mines task
pub mod decision;
pub mod storage;
pub mod policy;

pub use decision::{decide_next_upgrade, Alternative, MineDecision, Shortfall};
pub use storage::{determine_storage_needed, StorageNeed};
pub use policy::MaximizeMinesPolicy;
