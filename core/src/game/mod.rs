mod bootstrap;
mod conflict;
mod constants;
pub(crate) use constants::*;
mod country;
mod engine;
mod events;
mod reparations;
mod state;
pub(crate) mod systems;
mod territory;
mod time;

pub use bootstrap::{GameBuilder, default_definitions};
pub use conflict::{
    Conflict, ConflictKind, ConflictOutcome, Justification, PeaceTerm, StrategyTransition,
    WarStrategy,
};
pub use country::{CountryDefinition, CountryState};
pub use events::ConflictEvent;
pub use reparations::{ReparationAgreement, ReparationBook};
pub use state::GameState;
pub use territory::{
    Rebellion, RebellionOutcome, SuppressionReport, Territory, TerritoryKind,
};
