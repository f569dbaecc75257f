pub mod decision;
pub mod state_store;
pub mod trader;

pub use decision::{BracketParams, Decision, DecisionEngine, HoldReason};
pub use state_store::{PersistedState, StateStore, StateStoreError};
pub use trader::{SentimentTrader, SkipReason, TickOutcome};
