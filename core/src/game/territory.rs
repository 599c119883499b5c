use anyhow::{Result, anyhow, ensure};
use rand::Rng;
use rand::rngs::StdRng;
use serde::Serialize;

use super::events::ConflictEvent;
use super::{
    ANNEXATION_MORALE_THRESHOLD, AUTONOMY_MORALE_BONUS, REBELLION_RISK_MORALE_WEIGHT,
    SUPPRESSION_MORALE_PENALTY,
};
use crate::CalendarDate;

const INVESTMENT_MORALE_PER_BILLION: f64 = 0.05;
const REBELLION_STRENGTH_MIN_RATE: f64 = 0.001;
const REBELLION_STRENGTH_MAX_RATE: f64 = 0.02;
const SUPPRESSION_BASE_CHANCE: f64 = 0.7;
const SUPPRESSION_MAX_CHANCE: f64 = 0.95;
const SUPPRESSION_CASUALTY_MIN: f64 = 0.05;
const SUPPRESSION_CASUALTY_MAX: f64 = 0.15;
const SUPPRESSION_COST_PER_TEN_THOUSAND: f64 = 100_000_000.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TerritoryKind {
    Conquered,
    Annexed,
    Puppet,
}

impl TerritoryKind {
    pub(crate) fn monthly_morale_decay(self) -> f64 {
        match self {
            TerritoryKind::Conquered => 0.03,
            TerritoryKind::Annexed => 0.015,
            TerritoryKind::Puppet => 0.005,
        }
    }

    pub(crate) fn base_rebellion_risk(self) -> f64 {
        match self {
            TerritoryKind::Conquered => 0.30,
            TerritoryKind::Annexed => 0.15,
            TerritoryKind::Puppet => 0.05,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TerritoryKind::Conquered => "占領地",
            TerritoryKind::Annexed => "併合地",
            TerritoryKind::Puppet => "自治領",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Territory {
    pub id: u32,
    pub name: String,
    pub former_owner: String,
    pub current_owner: String,
    pub size: f64,
    pub population: i64,
    pub morale: f64,
    pub kind: TerritoryKind,
    pub rebellion_risk: f64,
    pub conquest_date: CalendarDate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RebellionOutcome {
    Suppressed,
    Independence,
    Autonomy,
}

impl RebellionOutcome {
    pub fn label(self) -> &'static str {
        match self {
            RebellionOutcome::Suppressed => "鎮圧",
            RebellionOutcome::Independence => "独立",
            RebellionOutcome::Autonomy => "自治権付与",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Rebellion {
    pub id: u32,
    pub territory_id: u32,
    pub territory_name: String,
    pub strength: i64,
    pub support: f64,
    pub start_date: CalendarDate,
    pub end_date: Option<CalendarDate>,
    pub outcome: Option<RebellionOutcome>,
}

#[derive(Debug, Clone)]
pub struct SuppressionReport {
    pub rebellion_id: u32,
    pub territory_name: String,
    pub success: bool,
    pub casualties: i64,
    pub cost: f64,
}

pub struct TerritoryRegistry {
    territories: Vec<Territory>,
    rebellions: Vec<Rebellion>,
    rebellion_history: Vec<Rebellion>,
    next_territory_id: u32,
    next_rebellion_id: u32,
}

impl TerritoryRegistry {
    pub(crate) fn new() -> Self {
        Self {
            territories: Vec::new(),
            rebellions: Vec::new(),
            rebellion_history: Vec::new(),
            next_territory_id: 1,
            next_rebellion_id: 1,
        }
    }

    pub fn territories(&self) -> &[Territory] {
        &self.territories
    }

    pub fn rebellions(&self) -> &[Rebellion] {
        &self.rebellions
    }

    pub fn rebellion_history(&self) -> &[Rebellion] {
        &self.rebellion_history
    }

    pub fn territory(&self, id: u32) -> Option<&Territory> {
        self.territories.iter().find(|territory| territory.id == id)
    }

    fn territory_mut(&mut self, id: u32) -> Result<&mut Territory> {
        self.territories
            .iter_mut()
            .find(|territory| territory.id == id)
            .ok_or_else(|| anyhow!("指定された領土が見つかりません: {}", id))
    }

    fn rebellion_index(&self, id: u32) -> Result<usize> {
        self.rebellions
            .iter()
            .position(|rebellion| rebellion.id == id)
            .ok_or_else(|| anyhow!("指定された反乱が見つかりません: {}", id))
    }

    pub(crate) fn register_conquest(
        &mut self,
        name: String,
        former_owner: String,
        current_owner: String,
        size: f64,
        population: i64,
        morale: f64,
        conquest_date: CalendarDate,
    ) -> u32 {
        let id = self.next_territory_id;
        self.next_territory_id += 1;
        let kind = TerritoryKind::Conquered;
        let morale = morale.clamp(0.0, 1.0);
        self.territories.push(Territory {
            id,
            name,
            former_owner,
            current_owner,
            size: size.max(0.0),
            population: population.max(0),
            morale,
            kind,
            rebellion_risk: rebellion_risk(kind, morale),
            conquest_date,
        });
        id
    }

    pub(crate) fn update_morale(&mut self, days: u64) {
        for territory in self.territories.iter_mut() {
            let decay = territory.kind.monthly_morale_decay() / 30.0 * days as f64;
            territory.morale = (territory.morale - decay).max(0.0);
            territory.rebellion_risk = rebellion_risk(territory.kind, territory.morale);
        }
    }

    pub(crate) fn invest(&mut self, id: u32, amount: f64) -> Result<f64> {
        ensure!(
            amount.is_finite() && amount > 0.0,
            "投資額は正の値で指定してください"
        );
        let territory = self.territory_mut(id)?;
        let gain = amount / 1_000_000_000.0 * INVESTMENT_MORALE_PER_BILLION;
        territory.morale = (territory.morale + gain).min(1.0);
        territory.rebellion_risk = rebellion_risk(territory.kind, territory.morale);
        Ok(territory.morale)
    }

    pub(crate) fn annex(&mut self, id: u32) -> Result<()> {
        let territory = self.territory_mut(id)?;
        ensure!(
            territory.kind == TerritoryKind::Conquered,
            "併合できるのは占領地のみです: {}",
            territory.name
        );
        ensure!(
            territory.morale >= ANNEXATION_MORALE_THRESHOLD,
            "士気が {:.1} 未満の領土は併合できません (現在 {:.2})",
            ANNEXATION_MORALE_THRESHOLD,
            territory.morale
        );
        territory.kind = TerritoryKind::Annexed;
        territory.rebellion_risk = rebellion_risk(territory.kind, territory.morale);
        Ok(())
    }

    pub(crate) fn grant_autonomy(&mut self, id: u32) -> Result<()> {
        let territory = self.territory_mut(id)?;
        ensure!(
            territory.kind != TerritoryKind::Puppet,
            "{} は既に自治領です",
            territory.name
        );
        territory.kind = TerritoryKind::Puppet;
        territory.morale = (territory.morale + AUTONOMY_MORALE_BONUS).min(1.0);
        territory.rebellion_risk = rebellion_risk(territory.kind, territory.morale);
        Ok(())
    }

    pub fn gdp_contribution_multiplier(&self, id: u32, now: CalendarDate) -> Result<f64> {
        let territory = self
            .territory(id)
            .ok_or_else(|| anyhow!("指定された領土が見つかりません: {}", id))?;
        let years_held = territory.conquest_date.whole_years_until(now);
        let multiplier = match years_held {
            0 => 0.30,
            1 => 0.50,
            2 => 0.70,
            _ => {
                if territory.morale >= 0.5 {
                    0.90
                } else {
                    0.70
                }
            }
        };
        Ok(multiplier)
    }

    pub(crate) fn has_active_rebellion(&self, territory_id: u32) -> bool {
        self.rebellions
            .iter()
            .any(|rebellion| rebellion.territory_id == territory_id)
    }

    pub(crate) fn check_for_rebellions(
        &mut self,
        rng: &mut StdRng,
        date: CalendarDate,
    ) -> Vec<ConflictEvent> {
        let mut events = Vec::new();
        let candidates: Vec<u32> = self
            .territories
            .iter()
            .filter(|territory| !self.has_active_rebellion(territory.id))
            .map(|territory| territory.id)
            .collect();
        for territory_id in candidates {
            let (risk, name, population, morale) = {
                let territory = self
                    .territory(territory_id)
                    .expect("candidate territory must exist");
                (
                    territory.rebellion_risk,
                    territory.name.clone(),
                    territory.population,
                    territory.morale,
                )
            };
            if rng.gen_range(0.0..1.0) >= risk {
                continue;
            }
            let rate = rng.gen_range(REBELLION_STRENGTH_MIN_RATE..REBELLION_STRENGTH_MAX_RATE);
            let strength = ((population as f64 * rate) as i64).max(1);
            let id = self.next_rebellion_id;
            self.next_rebellion_id += 1;
            let support = (1.0 - morale).clamp(0.0, 1.0);
            self.rebellions.push(Rebellion {
                id,
                territory_id,
                territory_name: name.clone(),
                strength,
                support,
                start_date: date,
                end_date: None,
                outcome: None,
            });
            events.push(ConflictEvent::RebellionStarted {
                rebellion_id: id,
                territory_name: name,
                strength,
                support,
            });
        }
        events
    }

    pub(crate) fn suppress_rebellion(
        &mut self,
        id: u32,
        military_strength: i64,
        rng: &mut StdRng,
        date: CalendarDate,
    ) -> Result<SuppressionReport> {
        ensure!(
            military_strength > 0,
            "鎮圧には正の軍事力を投入してください"
        );
        let idx = self.rebellion_index(id)?;
        let (territory_id, territory_name, strength) = {
            let rebellion = &self.rebellions[idx];
            (
                rebellion.territory_id,
                rebellion.territory_name.clone(),
                rebellion.strength,
            )
        };
        let ratio = military_strength as f64 / strength.max(1) as f64;
        let success_chance = (SUPPRESSION_BASE_CHANCE * ratio).min(SUPPRESSION_MAX_CHANCE);
        let success = rng.gen_bool(success_chance);
        let casualty_rate = rng.gen_range(SUPPRESSION_CASUALTY_MIN..SUPPRESSION_CASUALTY_MAX);
        let casualties = (strength as f64 * casualty_rate) as i64;
        let cost = SUPPRESSION_COST_PER_TEN_THOUSAND * (strength as f64 / 10_000.0);

        if success {
            self.archive_rebellion(idx, RebellionOutcome::Suppressed, date);
            if let Ok(territory) = self.territory_mut(territory_id) {
                territory.morale = (territory.morale - SUPPRESSION_MORALE_PENALTY).max(0.0);
                territory.rebellion_risk = rebellion_risk(territory.kind, territory.morale);
            }
        }

        Ok(SuppressionReport {
            rebellion_id: id,
            territory_name,
            success,
            casualties,
            cost,
        })
    }

    pub(crate) fn grant_independence(&mut self, rebellion_id: u32, date: CalendarDate) -> Result<Territory> {
        let idx = self.rebellion_index(rebellion_id)?;
        let territory_id = self.rebellions[idx].territory_id;
        let position = self
            .territories
            .iter()
            .position(|territory| territory.id == territory_id)
            .ok_or_else(|| anyhow!("反乱対象の領土が見つかりません: {}", territory_id))?;
        self.archive_rebellion(idx, RebellionOutcome::Independence, date);
        Ok(self.territories.remove(position))
    }

    pub(crate) fn grant_autonomy_to_rebellion(
        &mut self,
        rebellion_id: u32,
        date: CalendarDate,
    ) -> Result<String> {
        let idx = self.rebellion_index(rebellion_id)?;
        let territory_id = self.rebellions[idx].territory_id;
        self.archive_rebellion(idx, RebellionOutcome::Autonomy, date);
        let territory = self.territory_mut(territory_id)?;
        territory.kind = TerritoryKind::Puppet;
        territory.morale = (territory.morale + AUTONOMY_MORALE_BONUS).min(1.0);
        territory.rebellion_risk = rebellion_risk(territory.kind, territory.morale);
        Ok(territory.name.clone())
    }

    fn archive_rebellion(&mut self, idx: usize, outcome: RebellionOutcome, date: CalendarDate) {
        let mut rebellion = self.rebellions.remove(idx);
        rebellion.outcome = Some(outcome);
        rebellion.end_date = Some(date);
        self.rebellion_history.push(rebellion);
    }
}

fn rebellion_risk(kind: TerritoryKind, morale: f64) -> f64 {
    (kind.base_rebellion_risk() + (1.0 - morale) * REBELLION_RISK_MORALE_WEIGHT).clamp(0.0, 1.0)
}
