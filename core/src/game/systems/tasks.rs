use crate::game::events::ConflictEvent;
use crate::game::state::GameState;
use crate::{ScheduledTask, TaskKind};

pub(crate) fn execute(task: &ScheduledTask, game: &mut GameState) -> Vec<ConflictEvent> {
    match task.kind {
        TaskKind::AiWarCouncil => game.process_ai_council(),
        TaskKind::RebellionCheck => game.process_rebellion_check(),
        TaskKind::StrengthEvolution => {
            game.process_strength_evolution();
            Vec::new()
        }
        TaskKind::ReparationTransfer => game.process_reparations(),
    }
}
