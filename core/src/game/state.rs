use anyhow::{Result, anyhow, ensure};
#[cfg(test)]
use rand::SeedableRng;
use rand::rngs::StdRng;

use super::{
    MAX_SIMULTANEOUS_CONFLICTS,
    bootstrap::{GameBootstrap, GameBuilder, default_definitions},
    conflict::{Conflict, ConflictKind, ConflictOutcome, Justification, PeaceTerm, WarStrategy},
    country::{CountryDefinition, CountryState, display_name, index_of},
    engine::ConflictEngine,
    events::ConflictEvent,
    reparations::ReparationBook,
    systems::{facade::SystemsFacade, peace},
    territory::{Rebellion, Territory, TerritoryRegistry},
    time::SimulationClock,
};
use crate::{CalendarDate, ScheduledTask};

pub struct GameState {
    simulation_clock: SimulationClock,
    rng: StdRng,
    countries: Vec<CountryState>,
    engine: ConflictEngine,
    territories: TerritoryRegistry,
    reparations: ReparationBook,
    systems: SystemsFacade,
    player_code: String,
}

impl GameState {
    pub fn from_definitions(definitions: Vec<CountryDefinition>) -> Result<Self> {
        GameBuilder::new(definitions).build()
    }

    pub fn from_definitions_with_rng(
        definitions: Vec<CountryDefinition>,
        rng: StdRng,
    ) -> Result<Self> {
        GameBuilder::new(definitions).with_rng(rng).build()
    }

    pub fn from_default_scenario() -> Result<Self> {
        GameBuilder::new(default_definitions()?).build()
    }

    #[cfg(test)]
    pub fn from_definitions_with_seed(
        definitions: Vec<CountryDefinition>,
        seed: u64,
    ) -> Result<Self> {
        GameBuilder::new(definitions)
            .with_rng(StdRng::seed_from_u64(seed))
            .build()
    }

    pub(crate) fn new(bootstrap: GameBootstrap) -> Self {
        Self {
            simulation_clock: SimulationClock::new(bootstrap.scheduler),
            rng: bootstrap.rng,
            countries: bootstrap.countries,
            engine: ConflictEngine::new(),
            territories: TerritoryRegistry::new(),
            reparations: ReparationBook::new(),
            systems: SystemsFacade::new(),
            player_code: bootstrap.player_code,
        }
    }

    pub fn calendar_date(&self) -> CalendarDate {
        self.simulation_clock.calendar_date()
    }

    pub fn simulation_days(&self) -> u64 {
        self.simulation_clock.simulation_days()
    }

    pub fn player_code(&self) -> &str {
        &self.player_code
    }

    pub fn countries(&self) -> &[CountryState] {
        &self.countries
    }

    #[cfg(test)]
    pub fn countries_mut(&mut self) -> &mut [CountryState] {
        &mut self.countries
    }

    pub fn country(&self, code: &str) -> Option<&CountryState> {
        index_of(&self.countries, code).map(|idx| &self.countries[idx])
    }

    pub fn conflicts(&self) -> &[Conflict] {
        self.engine.active()
    }

    pub fn conflict_history(&self) -> &[Conflict] {
        self.engine.history()
    }

    pub fn conflict(&self, id: u32) -> Option<&Conflict> {
        self.engine.find(id)
    }

    pub fn territories(&self) -> &[Territory] {
        self.territories.territories()
    }

    pub fn territory(&self, id: u32) -> Option<&Territory> {
        self.territories.territory(id)
    }

    pub fn rebellions(&self) -> &[Rebellion] {
        self.territories.rebellions()
    }

    pub fn rebellion_history(&self) -> &[Rebellion] {
        self.territories.rebellion_history()
    }

    pub fn reparations(&self) -> &ReparationBook {
        &self.reparations
    }

    pub fn find_country_index(&self, name_or_index: &str) -> Option<usize> {
        if let Ok(id) = name_or_index.parse::<usize>() {
            if id > 0 && id <= self.countries.len() {
                return Some(id - 1);
            }
        }

        if let Some(idx) = index_of(&self.countries, name_or_index) {
            return Some(idx);
        }

        let name_lower = name_or_index.to_ascii_lowercase();
        self.countries
            .iter()
            .position(|country| country.name.to_ascii_lowercase() == name_lower)
    }

    pub fn advance_days(&mut self, days: u64) -> Result<Vec<ConflictEvent>> {
        ensure!(days > 0, "日数は1以上で指定してください");

        let mut events = Vec::new();
        for _ in 0..days {
            let day_outcome = self.simulation_clock.advance_day();
            let current_day = self.simulation_clock.simulation_days();
            let date = self.simulation_clock.calendar_date();

            events.extend(self.systems.process_conflict_day(
                &mut self.engine,
                &mut self.countries,
                &mut self.territories,
                &mut self.reparations,
                &self.player_code,
                current_day,
                date,
            )?);

            self.systems.process_territory_decay(&mut self.territories, 1);

            for task in day_outcome.ready_tasks {
                events.extend(task.execute(self));
            }
        }
        Ok(events)
    }

    pub fn declare_war(
        &mut self,
        attacker: &str,
        defender: &str,
        justification: Justification,
    ) -> Result<ConflictEvent> {
        let attacker_idx = self
            .find_country_index(attacker)
            .ok_or_else(|| anyhow!("国を特定できませんでした: {}", attacker))?;
        let defender_idx = self
            .find_country_index(defender)
            .ok_or_else(|| anyhow!("国を特定できませんでした: {}", defender))?;
        ensure!(
            attacker_idx != defender_idx,
            "自国に宣戦布告することはできません"
        );
        ensure!(
            self.engine.active_count() < MAX_SIMULTANEOUS_CONFLICTS,
            "同時に進行できる紛争は {} 件までです",
            MAX_SIMULTANEOUS_CONFLICTS
        );
        let attacker_code = self.countries[attacker_idx].code.clone();
        let defender_code = self.countries[defender_idx].code.clone();
        ensure!(
            !self.engine.active().iter().any(|conflict| {
                conflict.involves(&attacker_code) && conflict.involves(&defender_code)
            }),
            "{} と {} は既に交戦中です",
            self.countries[attacker_idx].name,
            self.countries[defender_idx].name
        );

        let conflict_id = self.engine.declare(
            attacker_code.clone(),
            defender_code.clone(),
            ConflictKind::Offensive,
            justification,
            self.countries[attacker_idx].mobilized_strength(),
            self.countries[defender_idx].mobilized_strength(),
            self.simulation_clock.calendar_date(),
        );

        Ok(ConflictEvent::WarDeclared {
            conflict_id,
            attacker: attacker_code,
            attacker_name: self.countries[attacker_idx].name.clone(),
            defender: defender_code,
            defender_name: self.countries[defender_idx].name.clone(),
            justification,
        })
    }

    pub fn change_strategy(
        &mut self,
        conflict_id: u32,
        target: WarStrategy,
    ) -> Result<ConflictEvent> {
        let current_day = self.simulation_clock.simulation_days();
        let (from, subject_code) = {
            let conflict = self
                .engine
                .find(conflict_id)
                .ok_or_else(|| anyhow!("指定された紛争が見つかりません: {}", conflict_id))?;
            let subject = if conflict.involves(&self.player_code) {
                self.player_code.clone()
            } else {
                conflict.attacker.clone()
            };
            (conflict.strategy, subject)
        };
        let transition_days = self.engine.change_strategy(conflict_id, target, current_day)?;
        Ok(ConflictEvent::StrategyShift {
            conflict_id,
            country_name: display_name(&self.countries, &subject_code),
            from,
            to: target,
            transition_days,
        })
    }

    pub fn negotiate_peace(
        &mut self,
        conflict_id: u32,
        term: PeaceTerm,
    ) -> Result<Vec<ConflictEvent>> {
        let date = self.simulation_clock.calendar_date();
        let already_resolved = self
            .engine
            .find(conflict_id)
            .ok_or_else(|| anyhow!("指定された紛争が見つかりません: {}", conflict_id))?
            .is_resolved();

        let mut events = Vec::new();
        if !already_resolved {
            self.engine
                .resolve_war(conflict_id, ConflictOutcome::PeaceTreaty)?;
            let conflict = self
                .engine
                .find(conflict_id)
                .expect("resolved conflict must exist");
            events.push(ConflictEvent::WarConcluded {
                conflict_id,
                attacker_name: display_name(&self.countries, &conflict.attacker),
                defender_name: display_name(&self.countries, &conflict.defender),
                outcome: ConflictOutcome::PeaceTreaty,
                territory_conquered: conflict.territory_conquered,
            });
            self.engine.archive_resolved();
        }

        events.extend(peace::apply_peace_terms(
            &mut self.engine,
            conflict_id,
            term,
            &mut self.countries,
            &mut self.territories,
            &mut self.reparations,
            date,
        )?);
        Ok(events)
    }

    pub fn launch_nuclear_strike(
        &mut self,
        conflict_id: u32,
        nuclear_capable: bool,
    ) -> Result<ConflictEvent> {
        ensure!(
            nuclear_capable,
            "核戦力を保有していないため核攻撃を実行できません"
        );
        self.engine
            .resolve_war(conflict_id, ConflictOutcome::NuclearAnnihilation)?;
        let event = {
            let conflict = self
                .engine
                .find(conflict_id)
                .expect("resolved conflict must exist");
            ConflictEvent::WarConcluded {
                conflict_id,
                attacker_name: display_name(&self.countries, &conflict.attacker),
                defender_name: display_name(&self.countries, &conflict.defender),
                outcome: ConflictOutcome::NuclearAnnihilation,
                territory_conquered: conflict.territory_conquered,
            }
        };
        self.engine.archive_resolved();
        Ok(event)
    }

    pub fn invest_in_territory(&mut self, territory_id: u32, amount: f64) -> Result<f64> {
        self.territories.invest(territory_id, amount)
    }

    pub fn annex_territory(&mut self, territory_id: u32) -> Result<()> {
        self.territories.annex(territory_id)
    }

    pub fn grant_territory_autonomy(&mut self, territory_id: u32) -> Result<ConflictEvent> {
        self.territories.grant_autonomy(territory_id)?;
        let territory_name = self
            .territories
            .territory(territory_id)
            .expect("territory must exist after autonomy grant")
            .name
            .clone();
        Ok(ConflictEvent::AutonomyGranted { territory_name })
    }

    pub fn gdp_contribution_multiplier(&self, territory_id: u32) -> Result<f64> {
        self.territories
            .gdp_contribution_multiplier(territory_id, self.simulation_clock.calendar_date())
    }

    pub fn suppress_rebellion(
        &mut self,
        rebellion_id: u32,
        military_strength: i64,
    ) -> Result<ConflictEvent> {
        let date = self.simulation_clock.calendar_date();
        let report = self.territories.suppress_rebellion(
            rebellion_id,
            military_strength,
            &mut self.rng,
            date,
        )?;
        Ok(if report.success {
            ConflictEvent::RebellionSuppressed {
                rebellion_id: report.rebellion_id,
                territory_name: report.territory_name,
                casualties: report.casualties,
                cost: report.cost,
            }
        } else {
            ConflictEvent::SuppressionFailed {
                rebellion_id: report.rebellion_id,
                territory_name: report.territory_name,
            }
        })
    }

    pub fn grant_independence(&mut self, rebellion_id: u32) -> Result<ConflictEvent> {
        let date = self.simulation_clock.calendar_date();
        let territory = self.territories.grant_independence(rebellion_id, date)?;
        if let Some(idx) = index_of(&self.countries, &territory.current_owner) {
            self.countries[idx].release_holding(territory.size, territory.population);
        }
        Ok(ConflictEvent::IndependenceGranted {
            territory_name: territory.name,
        })
    }

    pub fn grant_rebellion_autonomy(&mut self, rebellion_id: u32) -> Result<ConflictEvent> {
        let date = self.simulation_clock.calendar_date();
        let territory_name = self
            .territories
            .grant_autonomy_to_rebellion(rebellion_id, date)?;
        Ok(ConflictEvent::AutonomyGranted { territory_name })
    }

    pub(crate) fn process_ai_council(&mut self) -> Vec<ConflictEvent> {
        let current_day = self.simulation_clock.simulation_days();
        let date = self.simulation_clock.calendar_date();
        self.systems.process_ai_council(
            &mut self.engine,
            &self.countries,
            &mut self.rng,
            &self.player_code,
            current_day,
            date,
        )
    }

    pub(crate) fn process_rebellion_check(&mut self) -> Vec<ConflictEvent> {
        let date = self.simulation_clock.calendar_date();
        self.systems
            .process_rebellion_check(&mut self.territories, &mut self.rng, date)
    }

    pub(crate) fn process_strength_evolution(&mut self) {
        self.systems
            .process_strength_evolution(&mut self.countries, &self.engine);
    }

    pub(crate) fn process_reparations(&mut self) -> Vec<ConflictEvent> {
        self.systems
            .process_reparations(&mut self.reparations, &mut self.countries)
    }
}

impl ScheduledTask {
    pub(crate) fn execute(&self, game: &mut GameState) -> Vec<ConflictEvent> {
        super::systems::tasks::execute(self, game)
    }
}
