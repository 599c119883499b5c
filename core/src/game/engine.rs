use std::collections::HashMap;

use anyhow::{Result, anyhow, ensure};

use super::conflict::{
    Conflict, ConflictKind, ConflictOutcome, Justification, StrategyTransition, WarStrategy,
};
use super::{
    ATTRITION_DEFEAT_THRESHOLD, BASE_DAILY_ATTRITION, DAILY_COST_PER_THOUSAND_TROOPS,
    MAX_TERRITORY_CONQUERED, MIN_TERRITORY_CONQUERED,
};
use crate::CalendarDate;

pub struct ConflictEngine {
    active: Vec<Conflict>,
    history: Vec<Conflict>,
    next_id: u32,
}

impl ConflictEngine {
    pub(crate) fn new() -> Self {
        Self {
            active: Vec::new(),
            history: Vec::new(),
            next_id: 1,
        }
    }

    pub fn active(&self) -> &[Conflict] {
        &self.active
    }

    pub fn history(&self) -> &[Conflict] {
        &self.history
    }

    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    pub fn active_count_for(&self, code: &str) -> usize {
        self.active
            .iter()
            .filter(|conflict| conflict.involves(code))
            .count()
    }

    pub fn find(&self, id: u32) -> Option<&Conflict> {
        self.active
            .iter()
            .find(|conflict| conflict.id == id)
            .or_else(|| self.history.iter().find(|conflict| conflict.id == id))
    }

    fn find_active_mut(&mut self, id: u32) -> Result<&mut Conflict> {
        self.active
            .iter_mut()
            .find(|conflict| conflict.id == id)
            .ok_or_else(|| anyhow!("指定された紛争が見つかりません: {}", id))
    }

    pub(crate) fn find_any_mut(&mut self, id: u32) -> Result<&mut Conflict> {
        if let Some(idx) = self.active.iter().position(|conflict| conflict.id == id) {
            return Ok(&mut self.active[idx]);
        }
        self.history
            .iter_mut()
            .find(|conflict| conflict.id == id)
            .ok_or_else(|| anyhow!("指定された紛争が見つかりません: {}", id))
    }

    #[allow(clippy::too_many_arguments)]
    pub(crate) fn declare(
        &mut self,
        attacker: String,
        defender: String,
        kind: ConflictKind,
        justification: Justification,
        attacker_strength: i64,
        defender_strength: i64,
        start_date: CalendarDate,
    ) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        let mut casualties = HashMap::new();
        casualties.insert(attacker.clone(), 0);
        casualties.insert(defender.clone(), 0);
        let mut costs = HashMap::new();
        costs.insert(attacker.clone(), 0.0);
        costs.insert(defender.clone(), 0.0);
        self.active.push(Conflict {
            id,
            attacker,
            defender,
            kind,
            justification,
            attacker_strength: attacker_strength.max(1),
            defender_strength: defender_strength.max(1),
            attacker_attrition: 0.0,
            defender_attrition: 0.0,
            casualties,
            costs,
            strategy: WarStrategy::Balanced,
            transition: None,
            start_date,
            end_date: None,
            outcome: None,
            territory_conquered: None,
            peace_term: None,
            days_since_start: 0,
        });
        id
    }

    pub(crate) fn simulate_day(
        &mut self,
        id: u32,
        current_day: u64,
    ) -> Result<Option<ConflictOutcome>> {
        let decided = {
            let conflict = self.find_active_mut(id)?;
            ensure!(
                !conflict.is_resolved(),
                "終結済みの紛争は進行できません: {}",
                id
            );

            conflict.days_since_start += 1;

            if let Some(transition) = conflict.transition {
                if current_day.saturating_sub(transition.started_day) >= transition.duration_days {
                    conflict.strategy = transition.target;
                    conflict.transition = None;
                }
            }

            let ratio =
                conflict.attacker_strength as f64 / conflict.defender_strength.max(1) as f64;
            let multiplier = conflict.effective_multiplier(current_day);
            let attacker_delta = BASE_DAILY_ATTRITION * multiplier * (2.0 - ratio).max(0.0);
            let defender_delta = BASE_DAILY_ATTRITION * multiplier * ratio;

            let attacker_before = conflict.attacker_attrition;
            let defender_before = conflict.defender_attrition;
            conflict.attacker_attrition = (attacker_before + attacker_delta).min(1.0);
            conflict.defender_attrition = (defender_before + defender_delta).min(1.0);

            let attacker_losses = (conflict.attacker_strength as f64
                * (conflict.attacker_attrition - attacker_before))
                as i64;
            let defender_losses = (conflict.defender_strength as f64
                * (conflict.defender_attrition - defender_before))
                as i64;
            let attacker_code = conflict.attacker.clone();
            let defender_code = conflict.defender.clone();
            *conflict.casualties.entry(attacker_code.clone()).or_insert(0) += attacker_losses;
            *conflict.casualties.entry(defender_code.clone()).or_insert(0) += defender_losses;

            let attacker_cost = (conflict.attacker_strength / 1000) as f64
                * DAILY_COST_PER_THOUSAND_TROOPS;
            let defender_cost = (conflict.defender_strength / 1000) as f64
                * DAILY_COST_PER_THOUSAND_TROOPS;
            *conflict.costs.entry(attacker_code).or_insert(0.0) += attacker_cost;
            *conflict.costs.entry(defender_code).or_insert(0.0) += defender_cost;

            if conflict.defender_attrition >= ATTRITION_DEFEAT_THRESHOLD {
                Some(ConflictOutcome::AttackerVictory)
            } else if conflict.attacker_attrition >= ATTRITION_DEFEAT_THRESHOLD {
                Some(ConflictOutcome::DefenderVictory)
            } else {
                None
            }
        };

        if let Some(outcome) = decided {
            self.resolve_war(id, outcome)?;
        }
        Ok(decided)
    }

    pub(crate) fn change_strategy(
        &mut self,
        id: u32,
        target: WarStrategy,
        current_day: u64,
    ) -> Result<u64> {
        let conflict = self.find_active_mut(id)?;
        ensure!(
            !conflict.is_resolved(),
            "終結済みの紛争では戦略を変更できません: {}",
            id
        );
        ensure!(
            conflict.strategy != target,
            "既に {} 戦略を採用しています",
            target.label()
        );
        if let Some(transition) = &conflict.transition {
            ensure!(
                transition.target != target,
                "既に {} への移行が進行中です",
                target.label()
            );
        }
        let duration_days = conflict.strategy.transition_days(target);
        conflict.transition = Some(StrategyTransition {
            target,
            started_day: current_day,
            duration_days,
        });
        Ok(duration_days)
    }

    pub(crate) fn resolve_war(&mut self, id: u32, outcome: ConflictOutcome) -> Result<()> {
        let conflict = self.find_active_mut(id)?;
        ensure!(
            conflict.outcome.is_none(),
            "紛争 {} は既に終結しています",
            id
        );
        let mut end_date = conflict.start_date;
        end_date.advance_days(conflict.days_since_start);
        conflict.end_date = Some(end_date);
        conflict.outcome = Some(outcome);
        conflict.territory_conquered = match outcome {
            ConflictOutcome::AttackerVictory => {
                let surviving_attacker = 1.0 - conflict.attacker_attrition;
                let surviving_defender = 1.0 - conflict.defender_attrition;
                let margin = (surviving_attacker - surviving_defender) * 0.5;
                Some(margin.clamp(MIN_TERRITORY_CONQUERED, MAX_TERRITORY_CONQUERED))
            }
            ConflictOutcome::DefenderVictory | ConflictOutcome::PeaceTreaty => Some(0.0),
            ConflictOutcome::Stalemate | ConflictOutcome::NuclearAnnihilation => None,
        };
        Ok(())
    }

    pub(crate) fn archive_resolved(&mut self) -> Vec<u32> {
        let mut archived = Vec::new();
        let mut idx = 0;
        while idx < self.active.len() {
            if self.active[idx].is_resolved() {
                let conflict = self.active.remove(idx);
                archived.push(conflict.id);
                self.history.push(conflict);
            } else {
                idx += 1;
            }
        }
        archived
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine_with_conflict(attacker_strength: i64, defender_strength: i64) -> (ConflictEngine, u32) {
        let mut engine = ConflictEngine::new();
        let id = engine.declare(
            "AST".to_string(),
            "BOR".to_string(),
            ConflictKind::Offensive,
            Justification::TerritorialExpansion,
            attacker_strength,
            defender_strength,
            CalendarDate::from_start(),
        );
        (engine, id)
    }

    #[test]
    fn attrition_is_monotonic_and_bounded() {
        let (mut engine, id) = engine_with_conflict(100_000, 50_000);
        let mut previous_attacker = 0.0;
        let mut previous_defender = 0.0;
        for day in 1..=300 {
            engine.simulate_day(id, day).unwrap();
            let conflict = engine.find(id).unwrap();
            assert!(conflict.attacker_attrition >= previous_attacker);
            assert!(conflict.defender_attrition >= previous_defender);
            assert!(conflict.attacker_attrition <= 1.0);
            assert!(conflict.defender_attrition <= 1.0);
            previous_attacker = conflict.attacker_attrition;
            previous_defender = conflict.defender_attrition;
        }
    }

    #[test]
    fn weaker_defender_bleeds_out_first() {
        let (mut engine, id) = engine_with_conflict(100_000, 50_000);
        let mut outcome = None;
        for day in 1..=1000 {
            outcome = engine.simulate_day(id, day).unwrap();
            if outcome.is_some() {
                break;
            }
        }
        assert_eq!(outcome, Some(ConflictOutcome::AttackerVictory));
        let conflict = engine.find(id).unwrap();
        assert!(conflict.defender_attrition >= ATTRITION_DEFEAT_THRESHOLD);
        assert!(conflict.attacker_attrition < ATTRITION_DEFEAT_THRESHOLD);
        assert!((399..=401).contains(&conflict.days_since_start));
    }

    #[test]
    fn resolved_conflict_rejects_further_simulation() {
        let (mut engine, id) = engine_with_conflict(100_000, 50_000);
        for day in 1..=401 {
            if engine.simulate_day(id, day).unwrap().is_some() {
                break;
            }
        }
        assert!(engine.find(id).unwrap().is_resolved());
        assert!(engine.simulate_day(id, 401).is_err());
        assert!(engine.change_strategy(id, WarStrategy::Defensive, 401).is_err());
        assert_eq!(
            engine.find(id).unwrap().outcome,
            Some(ConflictOutcome::AttackerVictory)
        );
    }

    #[test]
    fn victory_margin_stays_within_bounds() {
        let (mut engine, id) = engine_with_conflict(100_000, 50_000);
        for day in 1..=401 {
            if engine.simulate_day(id, day).unwrap().is_some() {
                break;
            }
        }
        let conflict = engine.find(id).unwrap();
        let conquered = conflict.territory_conquered.unwrap();
        assert!((MIN_TERRITORY_CONQUERED..=MAX_TERRITORY_CONQUERED).contains(&conquered));
    }

    #[test]
    fn defender_victory_records_zero_conquest() {
        let (mut engine, id) = engine_with_conflict(40_000, 100_000);
        let mut outcome = None;
        for day in 1..=2000 {
            outcome = engine.simulate_day(id, day).unwrap();
            if outcome.is_some() {
                break;
            }
        }
        assert_eq!(outcome, Some(ConflictOutcome::DefenderVictory));
        assert_eq!(engine.find(id).unwrap().territory_conquered, Some(0.0));
    }

    #[test]
    fn strategy_transition_runs_its_full_course() {
        let (mut engine, id) = engine_with_conflict(80_000, 80_000);
        engine
            .change_strategy(id, WarStrategy::Aggressive, 0)
            .unwrap();
        for day in 1..=30 {
            engine.simulate_day(id, day).unwrap();
        }
        let conflict = engine.find(id).unwrap();
        assert_eq!(conflict.strategy, WarStrategy::Aggressive);
        assert!(conflict.transition.is_none());

        let duration = engine
            .change_strategy(id, WarStrategy::Defensive, 30)
            .unwrap();
        assert_eq!(duration, 90);
        assert!(engine.change_strategy(id, WarStrategy::Defensive, 45).is_err());
        for day in 31..=119 {
            engine.simulate_day(id, day).unwrap();
            assert_eq!(engine.find(id).unwrap().strategy, WarStrategy::Aggressive);
        }
        engine.simulate_day(id, 120).unwrap();
        let conflict = engine.find(id).unwrap();
        assert_eq!(conflict.strategy, WarStrategy::Defensive);
        assert!(conflict.transition.is_none());
    }

    #[test]
    fn daily_cost_accrues_per_thousand_troops() {
        let (mut engine, id) = engine_with_conflict(100_000, 50_000);
        engine.simulate_day(id, 1).unwrap();
        let conflict = engine.find(id).unwrap();
        assert_eq!(conflict.cost_of("AST"), 100.0 * 1_000_000.0);
        assert_eq!(conflict.cost_of("BOR"), 50.0 * 1_000_000.0);
    }

    #[test]
    fn archive_moves_resolved_conflicts_to_history() {
        let (mut engine, id) = engine_with_conflict(100_000, 50_000);
        engine
            .resolve_war(id, ConflictOutcome::Stalemate)
            .unwrap();
        let archived = engine.archive_resolved();
        assert_eq!(archived, vec![id]);
        assert!(engine.active().is_empty());
        assert_eq!(engine.history().len(), 1);
        assert!(engine.find(id).is_some());
        assert!(engine.resolve_war(id, ConflictOutcome::AttackerVictory).is_err());
    }
}
