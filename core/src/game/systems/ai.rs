use anyhow::Result;
use rand::Rng;
use rand::rngs::StdRng;

use crate::CalendarDate;
use crate::game::conflict::{Conflict, ConflictKind, ConflictOutcome, Justification, PeaceTerm, WarStrategy};
use crate::game::country::{CountryState, display_name};
use crate::game::engine::ConflictEngine;
use crate::game::events::ConflictEvent;
use crate::game::reparations::ReparationBook;
use crate::game::systems::peace;
use crate::game::territory::TerritoryRegistry;
use crate::game::{MAX_CONFLICTS_PER_COUNTRY, MAX_SIMULTANEOUS_CONFLICTS};

const WAR_DECLARATION_BASE_CHANCE: f64 = 0.02;
const TOP_GDP_RANKS: usize = 5;
const MID_GDP_RANKS: usize = 15;
const TOP_GDP_ACCEPTANCE: f64 = 0.1;
const MID_GDP_ACCEPTANCE: f64 = 0.3;
const TARGET_RATIO_MIN: f64 = 0.5;
const TARGET_RATIO_MAX: f64 = 5.0;
const PREFERRED_RATIO_MIN: f64 = 1.5;
const PREFERRED_RATIO_MAX: f64 = 3.0;
const WEIGHT_PREFERRED: f64 = 3.0;
const WEIGHT_OVERWHELMING: f64 = 0.5;
const WEIGHT_UNDERDOG: f64 = 0.3;
const WEIGHT_NEUTRAL: f64 = 1.0;
const TERRITORY_VALUE_DIVISOR: f64 = 10_000_000.0;
const TERRITORY_VALUE_WEIGHT: f64 = 0.1;

const STRATEGY_REVIEW_INTERVAL: u64 = 30;
const EXHAUSTION_CASUALTY_WEIGHT: f64 = 1.2;
const EXHAUSTION_DURATION_DAYS: f64 = 730.0;

const EXPANSIONIST_JUSTIFICATIONS: &[Justification] = &[
    Justification::TerritorialExpansion,
    Justification::ResourceAcquisition,
    Justification::RegionalHegemony,
];
const PARITY_JUSTIFICATIONS: &[Justification] = &[
    Justification::HistoricalClaims,
    Justification::RegimeChange,
];
const DEFENSIVE_JUSTIFICATIONS: &[Justification] = &[
    Justification::PreemptiveDefense,
    Justification::BorderSecurity,
];

pub(crate) fn evaluate_war_declaration(
    engine: &mut ConflictEngine,
    countries: &[CountryState],
    rng: &mut StdRng,
    player_code: &str,
    date: CalendarDate,
) -> Option<ConflictEvent> {
    if engine.active_count() >= MAX_SIMULTANEOUS_CONFLICTS {
        return None;
    }
    if !rng.gen_bool(WAR_DECLARATION_BASE_CHANCE) {
        return None;
    }

    let candidates: Vec<usize> = countries
        .iter()
        .enumerate()
        .filter(|(_, country)| !country.code.eq_ignore_ascii_case(player_code))
        .map(|(idx, _)| idx)
        .collect();
    if candidates.is_empty() {
        return None;
    }
    let aggressor_idx = candidates[rng.gen_range(0..candidates.len())];

    let rank = gdp_rank(countries, aggressor_idx);
    let acceptance = if rank < TOP_GDP_RANKS {
        TOP_GDP_ACCEPTANCE
    } else if rank < MID_GDP_RANKS {
        MID_GDP_ACCEPTANCE
    } else {
        1.0
    };
    if acceptance < 1.0 && !rng.gen_bool(acceptance) {
        return None;
    }

    let aggressor = &countries[aggressor_idx];
    if engine.active_count_for(&aggressor.code) >= MAX_CONFLICTS_PER_COUNTRY {
        return None;
    }

    let aggressor_strength = aggressor.military_strength.max(1) as f64;
    let weighted: Vec<(usize, f64)> = countries
        .iter()
        .enumerate()
        .filter(|(idx, _)| *idx != aggressor_idx)
        .filter(|(_, country)| {
            engine.active_count_for(&country.code) < MAX_CONFLICTS_PER_COUNTRY
        })
        .filter_map(|(idx, country)| {
            let ratio = aggressor_strength / country.military_strength.max(1) as f64;
            if !(TARGET_RATIO_MIN..=TARGET_RATIO_MAX).contains(&ratio) {
                return None;
            }
            let tier = if (PREFERRED_RATIO_MIN..=PREFERRED_RATIO_MAX).contains(&ratio) {
                WEIGHT_PREFERRED
            } else if ratio > PREFERRED_RATIO_MAX {
                WEIGHT_OVERWHELMING
            } else if ratio < 1.0 {
                WEIGHT_UNDERDOG
            } else {
                WEIGHT_NEUTRAL
            };
            let value =
                1.0 + country.base_territory / TERRITORY_VALUE_DIVISOR * TERRITORY_VALUE_WEIGHT;
            Some((idx, tier * value))
        })
        .collect();
    if weighted.is_empty() {
        return None;
    }

    let total_weight: f64 = weighted.iter().map(|(_, weight)| weight).sum();
    let mut draw = rng.gen_range(0.0..total_weight);
    let mut target_idx = weighted[weighted.len() - 1].0;
    for (idx, weight) in &weighted {
        if draw < *weight {
            target_idx = *idx;
            break;
        }
        draw -= weight;
    }

    let target = &countries[target_idx];
    let ratio = aggressor_strength / target.military_strength.max(1) as f64;
    let justification = pick_justification(ratio, rng);
    let conflict_id = engine.declare(
        aggressor.code.clone(),
        target.code.clone(),
        ConflictKind::Offensive,
        justification,
        aggressor.mobilized_strength(),
        target.mobilized_strength(),
        date,
    );

    Some(ConflictEvent::WarDeclared {
        conflict_id,
        attacker: aggressor.code.clone(),
        attacker_name: aggressor.name.clone(),
        defender: target.code.clone(),
        defender_name: target.name.clone(),
        justification,
    })
}

pub(crate) fn evaluate_strategy_changes(
    engine: &mut ConflictEngine,
    countries: &[CountryState],
    player_code: &str,
    current_day: u64,
) -> Vec<ConflictEvent> {
    let mut events = Vec::new();
    let ids: Vec<u32> = engine.active().iter().map(|conflict| conflict.id).collect();
    for id in ids {
        let decision = {
            let Some(conflict) = engine.find(id) else {
                continue;
            };
            if conflict.transition.is_some() {
                continue;
            }
            // 評議会自体が30日周期なので、開戦から30日未満の紛争だけ除外する
            if conflict.days_since_start < STRATEGY_REVIEW_INTERVAL {
                continue;
            }
            let mut decision = None;
            for code in [conflict.attacker.clone(), conflict.defender.clone()] {
                if code.eq_ignore_ascii_case(player_code) {
                    continue;
                }
                if let Some(target) = desired_strategy(conflict, &code) {
                    if target != conflict.strategy {
                        decision = Some((code, conflict.strategy, target));
                        break;
                    }
                }
            }
            decision
        };
        if let Some((code, from, target)) = decision {
            if let Ok(transition_days) = engine.change_strategy(id, target, current_day) {
                events.push(ConflictEvent::StrategyShift {
                    conflict_id: id,
                    country_name: display_name(countries, &code),
                    from,
                    to: target,
                    transition_days,
                });
            }
        }
    }
    events
}

pub(crate) fn resolve_ai_conflicts(
    engine: &mut ConflictEngine,
    countries: &mut [CountryState],
    registry: &mut TerritoryRegistry,
    book: &mut ReparationBook,
    player_code: &str,
    concluded: &[u32],
    date: CalendarDate,
) -> Result<Vec<ConflictEvent>> {
    let mut events = Vec::new();
    for &id in concluded {
        let margin = {
            let Some(conflict) = engine.find(id) else {
                continue;
            };
            if conflict.involves(player_code) {
                continue;
            }
            match conflict.outcome {
                Some(ConflictOutcome::Stalemate)
                | Some(ConflictOutcome::NuclearAnnihilation)
                | None => continue,
                Some(_) => conflict.territory_conquered.unwrap_or(0.0),
            }
        };
        let term = if margin >= 0.30 {
            PeaceTerm::FullConquest
        } else if margin >= 0.20 {
            PeaceTerm::PartialTerritory
        } else if margin >= 0.10 {
            PeaceTerm::Reparations
        } else {
            PeaceTerm::StatusQuo
        };
        events.extend(peace::apply_peace_terms(
            engine, id, term, countries, registry, book, date,
        )?);
    }
    Ok(events)
}

pub(crate) fn desired_strategy(conflict: &Conflict, code: &str) -> Option<WarStrategy> {
    let (own_strength, enemy_strength) = if conflict.attacker.eq_ignore_ascii_case(code) {
        (conflict.attacker_strength, conflict.defender_strength)
    } else {
        (conflict.defender_strength, conflict.attacker_strength)
    };
    let ratio = own_strength.max(1) as f64 / enemy_strength.max(1) as f64;
    let casualty_rate = conflict.casualties_of(code) as f64 / own_strength.max(1) as f64;
    let exhaustion = (casualty_rate * EXHAUSTION_CASUALTY_WEIGHT
        + conflict.days_since_start as f64 / EXHAUSTION_DURATION_DAYS)
        .clamp(0.0, 1.0);

    if ratio >= 2.0 && casualty_rate < 0.3 {
        Some(WarStrategy::Aggressive)
    } else if ratio <= 0.5 {
        Some(WarStrategy::Defensive)
    } else if exhaustion >= 0.6 || casualty_rate >= 0.4 {
        Some(WarStrategy::Attrition)
    } else if (0.8..=1.2).contains(&ratio) {
        Some(WarStrategy::Balanced)
    } else {
        None
    }
}

fn gdp_rank(countries: &[CountryState], idx: usize) -> usize {
    countries
        .iter()
        .filter(|country| country.gdp > countries[idx].gdp)
        .count()
}

fn pick_justification(ratio: f64, rng: &mut StdRng) -> Justification {
    let pool = if ratio >= PREFERRED_RATIO_MIN {
        EXPANSIONIST_JUSTIFICATIONS
    } else if ratio >= 1.0 {
        PARITY_JUSTIFICATIONS
    } else {
        DEFENSIVE_JUSTIFICATIONS
    };
    pool[rng.gen_range(0..pool.len())]
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use std::collections::HashMap;

    use crate::game::country::CountryDefinition;

    fn country(code: &str, name: &str, gdp: f64, strength: i64, territory: f64) -> CountryState {
        CountryState::new(CountryDefinition {
            code: code.to_string(),
            name: name.to_string(),
            government: "Republic".to_string(),
            base_territory: territory,
            population: 30_000_000,
            gdp,
            military_strength: strength,
            nuclear_capable: false,
        })
    }

    fn sample_world() -> Vec<CountryState> {
        vec![
            country("AST", "Asteria", 2.0e12, 250_000, 1_200_000.0),
            country("BOR", "Borealis", 1.4e12, 180_000, 900_000.0),
            country("CAL", "Caldora", 0.9e12, 120_000, 700_000.0),
            country("DRA", "Dravenia", 0.5e12, 90_000, 500_000.0),
        ]
    }

    fn make_conflict(
        own: i64,
        enemy: i64,
        casualties: i64,
        days: u64,
    ) -> Conflict {
        let mut casualty_map = HashMap::new();
        casualty_map.insert("AST".to_string(), casualties);
        casualty_map.insert("BOR".to_string(), 0);
        Conflict {
            id: 1,
            attacker: "AST".to_string(),
            defender: "BOR".to_string(),
            kind: ConflictKind::Offensive,
            justification: Justification::HistoricalClaims,
            attacker_strength: own,
            defender_strength: enemy,
            attacker_attrition: 0.0,
            defender_attrition: 0.0,
            casualties: casualty_map,
            costs: HashMap::new(),
            strategy: WarStrategy::Balanced,
            transition: None,
            start_date: CalendarDate::from_start(),
            end_date: None,
            outcome: None,
            territory_conquered: None,
            peace_term: None,
            days_since_start: days,
        }
    }

    #[test]
    fn strategy_table_follows_ratio_and_casualties() {
        assert_eq!(
            desired_strategy(&make_conflict(200_000, 80_000, 0, 30), "AST"),
            Some(WarStrategy::Aggressive)
        );
        assert_eq!(
            desired_strategy(&make_conflict(40_000, 100_000, 0, 30), "AST"),
            Some(WarStrategy::Defensive)
        );
        assert_eq!(
            desired_strategy(&make_conflict(100_000, 70_000, 45_000, 30), "AST"),
            Some(WarStrategy::Attrition)
        );
        assert_eq!(
            desired_strategy(&make_conflict(100_000, 100_000, 0, 30), "AST"),
            Some(WarStrategy::Balanced)
        );
        assert_eq!(
            desired_strategy(&make_conflict(100_000, 70_000, 0, 30), "AST"),
            None
        );
        // 長期戦は損耗が軽くても消耗戦へ移行する
        assert_eq!(
            desired_strategy(&make_conflict(100_000, 70_000, 0, 450), "AST"),
            Some(WarStrategy::Attrition)
        );
    }

    #[test]
    fn conflict_cap_blocks_new_declarations() {
        let countries = sample_world();
        let mut engine = ConflictEngine::new();
        for _ in 0..MAX_SIMULTANEOUS_CONFLICTS {
            engine.declare(
                "AST".to_string(),
                "BOR".to_string(),
                ConflictKind::Proxy,
                Justification::HistoricalClaims,
                10_000,
                10_000,
                CalendarDate::from_start(),
            );
        }
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..200 {
            assert!(
                evaluate_war_declaration(
                    &mut engine,
                    &countries,
                    &mut rng,
                    "AST",
                    CalendarDate::from_start()
                )
                .is_none()
            );
        }
    }

    #[test]
    fn declared_wars_exclude_player_and_mobilize_both_sides() {
        let countries = sample_world();
        let mut engine = ConflictEngine::new();
        let mut rng = StdRng::seed_from_u64(5);
        let mut declared = None;
        for _ in 0..5_000 {
            if let Some(event) = evaluate_war_declaration(
                &mut engine,
                &countries,
                &mut rng,
                "AST",
                CalendarDate::from_start(),
            ) {
                declared = Some(event);
                break;
            }
        }
        let Some(ConflictEvent::WarDeclared {
            conflict_id,
            attacker,
            defender,
            ..
        }) = declared
        else {
            panic!("2% の基礎確率なら数千回の評価で開戦するはず");
        };
        assert_ne!(attacker, "AST");
        let conflict = engine.find(conflict_id).unwrap();
        let aggressor = countries
            .iter()
            .find(|country| country.code == attacker)
            .unwrap();
        let target = countries
            .iter()
            .find(|country| country.code == defender)
            .unwrap();
        assert_eq!(conflict.attacker_strength, aggressor.mobilized_strength());
        assert_eq!(conflict.defender_strength, target.mobilized_strength());
        let ratio = aggressor.military_strength as f64 / target.military_strength as f64;
        assert!((TARGET_RATIO_MIN..=TARGET_RATIO_MAX).contains(&ratio));
    }

    #[test]
    fn busy_aggressors_sit_out() {
        let countries = vec![
            country("AST", "Asteria", 2.0e12, 250_000, 1_200_000.0),
            country("BOR", "Borealis", 1.4e12, 180_000, 900_000.0),
        ];
        let mut engine = ConflictEngine::new();
        for _ in 0..MAX_CONFLICTS_PER_COUNTRY {
            engine.declare(
                "BOR".to_string(),
                "AST".to_string(),
                ConflictKind::Proxy,
                Justification::HistoricalClaims,
                10_000,
                10_000,
                CalendarDate::from_start(),
            );
        }
        let mut rng = StdRng::seed_from_u64(9);
        for _ in 0..2_000 {
            assert!(
                evaluate_war_declaration(
                    &mut engine,
                    &countries,
                    &mut rng,
                    "AST",
                    CalendarDate::from_start()
                )
                .is_none()
            );
        }
    }

    #[test]
    fn ai_settlement_picks_term_from_margin() {
        let mut countries = sample_world();
        let mut engine = ConflictEngine::new();
        let id = engine.declare(
            "BOR".to_string(),
            "CAL".to_string(),
            ConflictKind::Offensive,
            Justification::TerritorialExpansion,
            360_000,
            180_000,
            CalendarDate::from_start(),
        );
        let mut outcome = None;
        for day in 1..=2_000 {
            outcome = engine.simulate_day(id, day).unwrap();
            if outcome.is_some() {
                break;
            }
        }
        assert_eq!(outcome, Some(ConflictOutcome::AttackerVictory));
        engine.archive_resolved();
        let margin = engine.find(id).unwrap().territory_conquered.unwrap();
        assert!(margin >= 0.30);

        let mut registry = TerritoryRegistry::new();
        let mut book = ReparationBook::new();
        let events = resolve_ai_conflicts(
            &mut engine,
            &mut countries,
            &mut registry,
            &mut book,
            "AST",
            &[id],
            CalendarDate::from_start(),
        )
        .unwrap();
        assert_eq!(
            engine.find(id).unwrap().peace_term,
            Some(PeaceTerm::FullConquest)
        );
        assert_eq!(registry.territories().len(), 1);
        assert_eq!(book.active().len(), 1);
        assert!(events.iter().any(|event| matches!(
            event,
            ConflictEvent::PeaceSettled { term: PeaceTerm::FullConquest, .. }
        )));
    }

    #[test]
    fn player_conflicts_are_left_for_manual_settlement() {
        let mut countries = sample_world();
        let mut engine = ConflictEngine::new();
        let id = engine.declare(
            "AST".to_string(),
            "BOR".to_string(),
            ConflictKind::Offensive,
            Justification::TerritorialExpansion,
            270_000,
            180_000,
            CalendarDate::from_start(),
        );
        engine
            .resolve_war(id, ConflictOutcome::AttackerVictory)
            .unwrap();
        engine.archive_resolved();
        let mut registry = TerritoryRegistry::new();
        let mut book = ReparationBook::new();
        let events = resolve_ai_conflicts(
            &mut engine,
            &mut countries,
            &mut registry,
            &mut book,
            "AST",
            &[id],
            CalendarDate::from_start(),
        )
        .unwrap();
        assert!(events.is_empty());
        assert_eq!(engine.find(id).unwrap().peace_term, None);
    }
}
