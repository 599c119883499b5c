use anyhow::{Result, anyhow, ensure};

use crate::CalendarDate;
use crate::game::conflict::{ConflictOutcome, PeaceTerm};
use crate::game::country::{CountryState, index_of};
use crate::game::engine::ConflictEngine;
use crate::game::events::ConflictEvent;
use crate::game::reparations::ReparationBook;
use crate::game::territory::TerritoryRegistry;
use crate::game::{
    CONQUERED_INITIAL_MORALE, CONQUEST_GDP_ABSORPTION, CONQUEST_TRANSFER_EXPONENT,
    FULL_CONQUEST_DEFAULT, PARTIAL_TERRITORY_DEFAULT, REPARATION_DEFAULT_YEARS,
    REPARATION_GDP_FRACTION, TERRITORY_MILESTONES,
};

#[allow(clippy::too_many_arguments)]
pub(crate) fn apply_peace_terms(
    engine: &mut ConflictEngine,
    conflict_id: u32,
    term: PeaceTerm,
    countries: &mut [CountryState],
    registry: &mut TerritoryRegistry,
    book: &mut ReparationBook,
    date: CalendarDate,
) -> Result<Vec<ConflictEvent>> {
    let (outcome, attacker, defender, attacker_attrition, defender_attrition, recorded_percent) = {
        let conflict = engine
            .find(conflict_id)
            .ok_or_else(|| anyhow!("指定された紛争が見つかりません: {}", conflict_id))?;
        let outcome = conflict.outcome.ok_or_else(|| {
            anyhow!("終結していない紛争には講和条件を適用できません: {}", conflict_id)
        })?;
        ensure!(
            !matches!(
                outcome,
                ConflictOutcome::Stalemate | ConflictOutcome::NuclearAnnihilation
            ),
            "{}で終わった紛争に講和条件は適用できません",
            outcome.label()
        );
        ensure!(
            conflict.peace_term.is_none(),
            "紛争 {} には講和条件が既に適用されています",
            conflict_id
        );
        (
            outcome,
            conflict.attacker.clone(),
            conflict.defender.clone(),
            conflict.attacker_attrition,
            conflict.defender_attrition,
            conflict.territory_conquered,
        )
    };

    let (winner_code, loser_code) = match outcome {
        ConflictOutcome::AttackerVictory => (attacker, defender),
        ConflictOutcome::DefenderVictory => (defender, attacker),
        ConflictOutcome::PeaceTreaty => {
            if attacker_attrition < defender_attrition {
                (attacker, defender)
            } else {
                (defender, attacker)
            }
        }
        ConflictOutcome::Stalemate | ConflictOutcome::NuclearAnnihilation => unreachable!(),
    };

    let winner_idx = index_of(countries, &winner_code)
        .ok_or_else(|| anyhow!("不明な国コードです: {}", winner_code))?;
    let loser_idx = index_of(countries, &loser_code)
        .ok_or_else(|| anyhow!("不明な国コードです: {}", loser_code))?;

    let winner_name = countries[winner_idx].name.clone();
    let loser_name = countries[loser_idx].name.clone();
    let mut events = vec![ConflictEvent::PeaceSettled {
        conflict_id,
        winner_name: winner_name.clone(),
        loser_name: loser_name.clone(),
        term,
    }];

    match term {
        PeaceTerm::StatusQuo => {}
        PeaceTerm::Reparations => {
            schedule_reparations(book, countries, winner_idx, loser_idx, conflict_id, &mut events);
        }
        PeaceTerm::PartialTerritory | PeaceTerm::FullConquest => {
            let percent = recorded_percent
                .filter(|value| *value > 0.0)
                .unwrap_or(match term {
                    PeaceTerm::PartialTerritory => PARTIAL_TERRITORY_DEFAULT,
                    _ => FULL_CONQUEST_DEFAULT,
                });
            let land = countries[loser_idx].base_territory * percent;
            let transfer_factor = percent.powf(CONQUEST_TRANSFER_EXPONENT);
            let people = (countries[loser_idx].population as f64 * transfer_factor) as i64;
            let gdp_moved = countries[loser_idx].gdp * transfer_factor;

            countries[loser_idx].record_conquest_loss(land, people);
            countries[loser_idx].gdp = (countries[loser_idx].gdp - gdp_moved).max(0.0);
            countries[winner_idx].record_conquest_gain(land, people);
            countries[winner_idx].gdp += gdp_moved * CONQUEST_GDP_ABSORPTION;

            registry.register_conquest(
                format!("旧{}領", loser_name),
                loser_code.clone(),
                winner_code.clone(),
                land,
                people,
                CONQUERED_INITIAL_MORALE,
                date,
            );
            events.push(ConflictEvent::TerritoryTransferred {
                conflict_id,
                winner_name: winner_name.clone(),
                loser_name: loser_name.clone(),
                size: land,
                population: people,
                percent,
            });
            events.extend(check_milestones(countries, winner_idx));

            if term == PeaceTerm::FullConquest {
                schedule_reparations(
                    book,
                    countries,
                    winner_idx,
                    loser_idx,
                    conflict_id,
                    &mut events,
                );
            }
        }
    }

    engine.find_any_mut(conflict_id)?.peace_term = Some(term);
    Ok(events)
}

fn schedule_reparations(
    book: &mut ReparationBook,
    countries: &[CountryState],
    winner_idx: usize,
    loser_idx: usize,
    conflict_id: u32,
    events: &mut Vec<ConflictEvent>,
) {
    let total = countries[loser_idx].gdp * REPARATION_GDP_FRACTION;
    book.schedule(
        countries[loser_idx].code.clone(),
        countries[winner_idx].code.clone(),
        total,
        REPARATION_DEFAULT_YEARS,
        conflict_id,
    );
    events.push(ConflictEvent::ReparationScheduled {
        payer_name: countries[loser_idx].name.clone(),
        recipient_name: countries[winner_idx].name.clone(),
        total_amount: total,
        total_years: REPARATION_DEFAULT_YEARS,
    });
}

fn check_milestones(countries: &mut [CountryState], idx: usize) -> Vec<ConflictEvent> {
    let mut events = Vec::new();
    let country = &mut countries[idx];
    if country.base_territory <= 0.0 {
        return events;
    }
    let ratio = country.total_territory() / country.base_territory;
    let mut level = country.milestone_level();
    while level < TERRITORY_MILESTONES.len() && ratio >= TERRITORY_MILESTONES[level] {
        events.push(ConflictEvent::TerritoryMilestone {
            country_name: country.name.clone(),
            ratio: TERRITORY_MILESTONES[level],
        });
        level += 1;
    }
    country.set_milestone_level(level);
    events
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::conflict::{ConflictKind, Justification};
    use crate::game::country::CountryDefinition;
    use crate::game::territory::TerritoryKind;

    fn sample_countries() -> Vec<CountryState> {
        vec![
            CountryState::new(CountryDefinition {
                code: "AST".to_string(),
                name: "Asteria".to_string(),
                government: "Republic".to_string(),
                base_territory: 1_000_000.0,
                population: 50_000_000,
                gdp: 2_000_000_000_000.0,
                military_strength: 300_000,
                nuclear_capable: false,
            }),
            CountryState::new(CountryDefinition {
                code: "BOR".to_string(),
                name: "Borealis".to_string(),
                government: "Federation".to_string(),
                base_territory: 800_000.0,
                population: 40_000_000,
                gdp: 1_000_000_000_000.0,
                military_strength: 100_000,
                nuclear_capable: false,
            }),
        ]
    }

    fn resolved_engine(outcome: ConflictOutcome) -> (ConflictEngine, u32) {
        let mut engine = ConflictEngine::new();
        let id = engine.declare(
            "AST".to_string(),
            "BOR".to_string(),
            ConflictKind::Offensive,
            Justification::TerritorialExpansion,
            300_000,
            100_000,
            CalendarDate::from_start(),
        );
        engine.resolve_war(id, outcome).unwrap();
        engine.archive_resolved();
        (engine, id)
    }

    #[test]
    fn full_conquest_conserves_territory_and_population() {
        let mut countries = sample_countries();
        let (mut engine, id) = resolved_engine(ConflictOutcome::AttackerVictory);
        let mut registry = TerritoryRegistry::new();
        let mut book = ReparationBook::new();

        let territory_before: f64 = countries.iter().map(|c| c.total_territory()).sum();
        let population_before: i64 = countries.iter().map(|c| c.population).sum();

        let events = apply_peace_terms(
            &mut engine,
            id,
            PeaceTerm::FullConquest,
            &mut countries,
            &mut registry,
            &mut book,
            CalendarDate::from_start(),
        )
        .unwrap();

        let territory_after: f64 = countries.iter().map(|c| c.total_territory()).sum();
        let population_after: i64 = countries.iter().map(|c| c.population).sum();
        assert!((territory_before - territory_after).abs() < 1e-6);
        assert_eq!(population_before, population_after);

        assert_eq!(registry.territories().len(), 1);
        let territory = &registry.territories()[0];
        assert_eq!(territory.kind, TerritoryKind::Conquered);
        assert_eq!(territory.current_owner, "AST");
        assert!((territory.morale - CONQUERED_INITIAL_MORALE).abs() < 1e-9);

        assert_eq!(book.active().len(), 1);
        assert!(events.iter().any(|event| matches!(
            event,
            ConflictEvent::TerritoryTransferred { .. }
        )));
        assert_eq!(
            engine.find(id).unwrap().peace_term,
            Some(PeaceTerm::FullConquest)
        );
    }

    #[test]
    fn population_transfer_is_sublinear() {
        let mut countries = sample_countries();
        let (mut engine, id) = resolved_engine(ConflictOutcome::AttackerVictory);
        let mut registry = TerritoryRegistry::new();
        let mut book = ReparationBook::new();

        // 攻撃側は無傷、防衛側は無傷のまま解決したので占領率は下限の 0.1 にクランプされる
        let percent = engine.find(id).unwrap().territory_conquered.unwrap();
        assert!((percent - 0.1).abs() < 1e-9);

        apply_peace_terms(
            &mut engine,
            id,
            PeaceTerm::PartialTerritory,
            &mut countries,
            &mut registry,
            &mut book,
            CalendarDate::from_start(),
        )
        .unwrap();

        let land_share = 0.1;
        let people_share = 0.1_f64.powf(CONQUEST_TRANSFER_EXPONENT);
        assert!(people_share > land_share);
        let expected_people = (40_000_000.0 * people_share) as i64;
        assert_eq!(countries[1].population, 40_000_000 - expected_people);
        assert!((countries[1].lost_territory - 80_000.0).abs() < 1e-6);
        // 獲得側の GDP 増分は移転額の 30% に留まる
        let gdp_moved = 1_000_000_000_000.0 * people_share;
        assert!((countries[0].gdp - (2_000_000_000_000.0 + gdp_moved * 0.3)).abs() < 1.0);
        assert!((countries[1].gdp - (1_000_000_000_000.0 - gdp_moved)).abs() < 1.0);
        assert!(book.active().is_empty());
    }

    #[test]
    fn reparations_term_books_a_tenth_of_loser_gdp() {
        let mut countries = sample_countries();
        let (mut engine, id) = resolved_engine(ConflictOutcome::AttackerVictory);
        let mut registry = TerritoryRegistry::new();
        let mut book = ReparationBook::new();

        apply_peace_terms(
            &mut engine,
            id,
            PeaceTerm::Reparations,
            &mut countries,
            &mut registry,
            &mut book,
            CalendarDate::from_start(),
        )
        .unwrap();

        assert!(registry.territories().is_empty());
        assert_eq!(book.active().len(), 1);
        let agreement = &book.active()[0];
        assert_eq!(agreement.payer, "BOR");
        assert_eq!(agreement.recipient, "AST");
        assert!((agreement.total_amount - 100_000_000_000.0).abs() < 1.0);
        assert_eq!(agreement.total_years, 10);
    }

    #[test]
    fn settlement_is_all_or_nothing_and_applied_once() {
        let mut countries = sample_countries();
        let (mut engine, id) = resolved_engine(ConflictOutcome::AttackerVictory);
        let mut registry = TerritoryRegistry::new();
        let mut book = ReparationBook::new();

        apply_peace_terms(
            &mut engine,
            id,
            PeaceTerm::StatusQuo,
            &mut countries,
            &mut registry,
            &mut book,
            CalendarDate::from_start(),
        )
        .unwrap();
        let second = apply_peace_terms(
            &mut engine,
            id,
            PeaceTerm::FullConquest,
            &mut countries,
            &mut registry,
            &mut book,
            CalendarDate::from_start(),
        );
        assert!(second.is_err());
        assert!(registry.territories().is_empty());
        assert_eq!(countries[0].conquered_territory, 0.0);
    }

    #[test]
    fn unknown_loser_code_applies_nothing() {
        let mut countries = sample_countries();
        let mut engine = ConflictEngine::new();
        let id = engine.declare(
            "AST".to_string(),
            "XQZ".to_string(),
            ConflictKind::Offensive,
            Justification::TerritorialExpansion,
            300_000,
            100_000,
            CalendarDate::from_start(),
        );
        engine
            .resolve_war(id, ConflictOutcome::AttackerVictory)
            .unwrap();
        engine.archive_resolved();
        let mut registry = TerritoryRegistry::new();
        let mut book = ReparationBook::new();
        let result = apply_peace_terms(
            &mut engine,
            id,
            PeaceTerm::FullConquest,
            &mut countries,
            &mut registry,
            &mut book,
            CalendarDate::from_start(),
        );
        assert!(result.is_err());
        assert!(registry.territories().is_empty());
        assert!(book.active().is_empty());
        assert_eq!(countries[0].conquered_territory, 0.0);
        assert_eq!(countries[0].gdp, 2_000_000_000_000.0);
        assert_eq!(engine.find(id).unwrap().peace_term, None);
    }

    #[test]
    fn nuclear_and_stalemate_outcomes_reject_settlement() {
        let mut countries = sample_countries();
        let (mut engine, id) = resolved_engine(ConflictOutcome::Stalemate);
        let mut registry = TerritoryRegistry::new();
        let mut book = ReparationBook::new();
        let result = apply_peace_terms(
            &mut engine,
            id,
            PeaceTerm::Reparations,
            &mut countries,
            &mut registry,
            &mut book,
            CalendarDate::from_start(),
        );
        assert!(result.is_err());
        assert!(book.active().is_empty());
    }

    #[test]
    fn peace_treaty_winner_is_the_less_attrited_side() {
        let mut countries = sample_countries();
        let mut engine = ConflictEngine::new();
        let id = engine.declare(
            "AST".to_string(),
            "BOR".to_string(),
            ConflictKind::Offensive,
            Justification::HistoricalClaims,
            100_000,
            100_000,
            CalendarDate::from_start(),
        );
        // 均衡戦力で数日進めても損耗は対称なので、防衛側が勝者になる
        for day in 1..=10 {
            engine.simulate_day(id, day).unwrap();
        }
        engine.resolve_war(id, ConflictOutcome::PeaceTreaty).unwrap();
        engine.archive_resolved();
        let mut registry = TerritoryRegistry::new();
        let mut book = ReparationBook::new();
        let events = apply_peace_terms(
            &mut engine,
            id,
            PeaceTerm::Reparations,
            &mut countries,
            &mut registry,
            &mut book,
            CalendarDate::from_start(),
        )
        .unwrap();
        assert!(events.iter().any(|event| matches!(
            event,
            ConflictEvent::PeaceSettled { winner_name, .. } if winner_name == "Borealis"
        )));
        assert_eq!(book.active()[0].payer, "AST");
    }

    #[test]
    fn milestone_fires_once_per_threshold() {
        let mut countries = sample_countries();
        countries[0].record_conquest_gain(300_000.0, 0);
        let events = check_milestones(&mut countries, 0);
        assert_eq!(events.len(), 1);
        assert!(events[0].describe().contains("125%"));
        assert!(check_milestones(&mut countries, 0).is_empty());
        countries[0].record_conquest_gain(1_100_000.0, 0);
        let events = check_milestones(&mut countries, 0);
        assert_eq!(events.len(), 2);
    }
}
