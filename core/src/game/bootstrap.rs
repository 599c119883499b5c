use std::collections::HashSet;

use anyhow::{Result, anyhow, ensure};
use rand::{SeedableRng, rngs::StdRng};

use super::country::{CountryDefinition, CountryState};
use super::state::GameState;
use crate::scheduler::{ONE_MONTH_DAYS, ONE_YEAR_DAYS};
use crate::{ScheduleSpec, ScheduledTask, Scheduler, TaskKind};

const EMBEDDED_SCENARIO: &str = include_str!("../../../config/countries.yaml");

pub struct GameBuilder {
    definitions: Vec<CountryDefinition>,
    rng: StdRng,
    player_code: Option<String>,
}

impl GameBuilder {
    pub fn new(definitions: Vec<CountryDefinition>) -> Self {
        Self {
            definitions,
            rng: StdRng::from_entropy(),
            player_code: None,
        }
    }

    pub fn with_rng(mut self, rng: StdRng) -> Self {
        self.rng = rng;
        self
    }

    pub fn with_player(mut self, code: impl Into<String>) -> Self {
        self.player_code = Some(code.into());
        self
    }

    pub fn build(self) -> Result<GameState> {
        let bootstrap = self.into_bootstrap()?;
        Ok(GameState::new(bootstrap))
    }

    pub(crate) fn into_bootstrap(self) -> Result<GameBootstrap> {
        self.validate_definitions()?;
        let GameBuilder {
            definitions,
            rng,
            player_code,
        } = self;

        let player_code = match player_code {
            Some(code) => {
                ensure!(
                    definitions
                        .iter()
                        .any(|definition| definition.code.eq_ignore_ascii_case(&code)),
                    "プレイヤー国コードが定義に存在しません: {}",
                    code
                );
                code
            }
            None => definitions[0].code.clone(),
        };

        let countries = definitions.into_iter().map(CountryState::new).collect();

        let mut scheduler = Scheduler::new();
        register_core_tasks(&mut scheduler);

        Ok(GameBootstrap {
            rng,
            scheduler,
            countries,
            player_code,
        })
    }

    fn validate_definitions(&self) -> Result<()> {
        ensure!(
            !self.definitions.is_empty(),
            "国が1つも定義されていません。最低1件の国を用意してください。"
        );
        let mut seen = HashSet::new();
        for definition in &self.definitions {
            ensure!(
                !definition.code.trim().is_empty(),
                "国コードが空です: {}",
                definition.name
            );
            ensure!(
                seen.insert(definition.code.to_ascii_uppercase()),
                "国コードが重複しています: {}",
                definition.code
            );
            ensure!(
                definition.base_territory.is_finite() && definition.base_territory > 0.0,
                "{} の領土面積が不正です",
                definition.name
            );
            ensure!(
                definition.population > 0,
                "{} の人口が不正です",
                definition.name
            );
            ensure!(
                definition.gdp.is_finite() && definition.gdp >= 0.0,
                "{} のGDPが不正です",
                definition.name
            );
            ensure!(
                definition.military_strength >= 0,
                "{} の軍事力が不正です",
                definition.name
            );
        }
        Ok(())
    }
}

pub(crate) struct GameBootstrap {
    pub(crate) rng: StdRng,
    pub(crate) scheduler: Scheduler,
    pub(crate) countries: Vec<CountryState>,
    pub(crate) player_code: String,
}

pub fn default_definitions() -> Result<Vec<CountryDefinition>> {
    serde_yaml::from_str(EMBEDDED_SCENARIO)
        .map_err(|err| anyhow!("組み込みシナリオの解析に失敗しました: {}", err))
}

fn register_core_tasks(scheduler: &mut Scheduler) {
    scheduler.schedule(
        ScheduledTask::new(TaskKind::AiWarCouncil, ONE_MONTH_DAYS)
            .with_schedule(ScheduleSpec::Monthly),
    );
    scheduler.schedule(
        ScheduledTask::new(TaskKind::RebellionCheck, ONE_MONTH_DAYS)
            .with_schedule(ScheduleSpec::Monthly),
    );
    scheduler.schedule(
        ScheduledTask::new(TaskKind::StrengthEvolution, ONE_MONTH_DAYS)
            .with_schedule(ScheduleSpec::Monthly),
    );
    scheduler.schedule(
        ScheduledTask::new(TaskKind::ReparationTransfer, ONE_YEAR_DAYS)
            .with_schedule(ScheduleSpec::Yearly),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_scenario_parses_and_builds() {
        let definitions = default_definitions().expect("組み込みシナリオは必ず読める");
        assert!(definitions.len() >= 4);
        let game = GameBuilder::new(definitions)
            .with_rng(StdRng::seed_from_u64(1))
            .build()
            .unwrap();
        assert_eq!(game.player_code(), "AST");
        assert!(game.countries().iter().any(|country| country.nuclear_capable));
    }

    #[test]
    fn duplicate_codes_are_rejected() {
        let mut definitions = default_definitions().unwrap();
        let mut clone = definitions[0].clone();
        clone.name = "Second Asteria".to_string();
        definitions.push(clone);
        assert!(GameBuilder::new(definitions).build().is_err());
    }

    #[test]
    fn unknown_player_code_is_rejected() {
        let definitions = default_definitions().unwrap();
        let result = GameBuilder::new(definitions).with_player("XXX").build();
        assert!(result.is_err());
    }
}
