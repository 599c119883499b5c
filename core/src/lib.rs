mod game;
mod scheduler;
mod time;

pub use game::{
    Conflict, ConflictEvent, ConflictKind, ConflictOutcome, CountryDefinition, CountryState,
    GameBuilder, GameState, Justification, PeaceTerm, Rebellion, RebellionOutcome,
    ReparationAgreement, ReparationBook, StrategyTransition, SuppressionReport, Territory,
    TerritoryKind, WarStrategy, default_definitions,
};
pub use scheduler::{ScheduleSpec, ScheduledTask, Scheduler, TaskKind};
pub use time::{CalendarDate, GameClock};
