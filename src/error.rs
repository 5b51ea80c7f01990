// Error taxonomy for the policy engine
//
// Every variant is recovered locally: task bodies turn it into a failed
// `TaskResult` and the next scheduled tick retries.
use crate::models::Cost;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BotError {
    /// The game client is not logged in.
    #[error("No active game session")]
    NoActiveSession,

    /// A price exceeds the current stockpile.
    #[error("Insufficient resources: missing {missing}")]
    InsufficientResources { missing: Cost },

    /// Resources suffice but the energy balance would go negative.
    #[error("Insufficient energy: missing {missing} energy")]
    InsufficientEnergy { missing: i64 },

    #[error("No valid colonization target found")]
    NoValidTarget,

    /// An actuation call on the game client returned false.
    #[error("Game client action failed: {action}")]
    CollaboratorActionFailed { action: String },

    #[error("Cached {what} is older than {max_age_seconds}s, waiting for a refresh")]
    StaleCache { what: String, max_age_seconds: u64 },

    #[error("Data sync must be enabled to run this task")]
    DataFeedDisabled,

    #[error("Unknown task: {0}")]
    UnknownTask(String),

    /// A read from the game client or the data feed returned nothing usable.
    #[error("Could not read {0}")]
    ReadFailed(String),
}

impl BotError {
    pub fn action_failed(action: impl Into<String>) -> Self {
        BotError::CollaboratorActionFailed { action: action.into() }
    }

    pub fn read_failed(what: impl Into<String>) -> Self {
        BotError::ReadFailed(what.into())
    }
}
