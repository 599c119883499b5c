use anyhow::Result;
use rand::rngs::StdRng;

use crate::CalendarDate;
use crate::game::country::CountryState;
use crate::game::engine::ConflictEngine;
use crate::game::events::ConflictEvent;
use crate::game::reparations::ReparationBook;
use crate::game::territory::TerritoryRegistry;

use super::{ai, combat, strength};

pub(crate) struct SystemsFacade;

impl SystemsFacade {
    pub fn new() -> Self {
        Self
    }

    #[allow(clippy::too_many_arguments)]
    pub fn process_conflict_day(
        &mut self,
        engine: &mut ConflictEngine,
        countries: &mut [CountryState],
        registry: &mut TerritoryRegistry,
        book: &mut ReparationBook,
        player_code: &str,
        current_day: u64,
        date: CalendarDate,
    ) -> Result<Vec<ConflictEvent>> {
        let (mut events, concluded) = combat::advance_all(engine, countries, current_day);
        engine.archive_resolved();
        events.extend(ai::resolve_ai_conflicts(
            engine,
            countries,
            registry,
            book,
            player_code,
            &concluded,
            date,
        )?);
        Ok(events)
    }

    pub fn process_territory_decay(&mut self, registry: &mut TerritoryRegistry, days: u64) {
        registry.update_morale(days);
    }

    pub fn process_ai_council(
        &mut self,
        engine: &mut ConflictEngine,
        countries: &[CountryState],
        rng: &mut StdRng,
        player_code: &str,
        current_day: u64,
        date: CalendarDate,
    ) -> Vec<ConflictEvent> {
        let mut events = Vec::new();
        if let Some(event) =
            ai::evaluate_war_declaration(engine, countries, rng, player_code, date)
        {
            events.push(event);
        }
        events.extend(ai::evaluate_strategy_changes(
            engine,
            countries,
            player_code,
            current_day,
        ));
        events
    }

    pub fn process_rebellion_check(
        &mut self,
        registry: &mut TerritoryRegistry,
        rng: &mut StdRng,
        date: CalendarDate,
    ) -> Vec<ConflictEvent> {
        registry.check_for_rebellions(rng, date)
    }

    pub fn process_strength_evolution(
        &mut self,
        countries: &mut [CountryState],
        engine: &ConflictEngine,
    ) {
        strength::evolve(countries, engine);
    }

    pub fn process_reparations(
        &mut self,
        book: &mut ReparationBook,
        countries: &mut [CountryState],
    ) -> Vec<ConflictEvent> {
        book.process_yearly(countries)
    }
}
