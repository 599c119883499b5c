use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::CalendarDate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConflictKind {
    Defensive,
    Offensive,
    Proxy,
    Civil,
}

impl ConflictKind {
    pub fn label(self) -> &'static str {
        match self {
            ConflictKind::Defensive => "防衛戦争",
            ConflictKind::Offensive => "侵攻戦争",
            ConflictKind::Proxy => "代理戦争",
            ConflictKind::Civil => "内戦",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Justification {
    TerritorialExpansion,
    ResourceAcquisition,
    RegionalHegemony,
    HistoricalClaims,
    RegimeChange,
    PreemptiveDefense,
    BorderSecurity,
}

impl Justification {
    pub fn label(self) -> &'static str {
        match self {
            Justification::TerritorialExpansion => "領土拡張",
            Justification::ResourceAcquisition => "資源獲得",
            Justification::RegionalHegemony => "地域覇権",
            Justification::HistoricalClaims => "歴史的権利",
            Justification::RegimeChange => "体制転換",
            Justification::PreemptiveDefense => "予防的自衛",
            Justification::BorderSecurity => "国境安全保障",
        }
    }

    pub fn parse(token: &str) -> Option<Self> {
        match token.to_ascii_lowercase().as_str() {
            "expansion" => Some(Justification::TerritorialExpansion),
            "resource" => Some(Justification::ResourceAcquisition),
            "hegemony" => Some(Justification::RegionalHegemony),
            "claims" => Some(Justification::HistoricalClaims),
            "regime" => Some(Justification::RegimeChange),
            "defense" => Some(Justification::PreemptiveDefense),
            "border" => Some(Justification::BorderSecurity),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WarStrategy {
    Aggressive,
    Balanced,
    Attrition,
    Defensive,
}

impl WarStrategy {
    pub fn attrition_multiplier(self) -> f64 {
        match self {
            WarStrategy::Aggressive => 1.5,
            WarStrategy::Balanced => 1.0,
            WarStrategy::Attrition => 0.8,
            WarStrategy::Defensive => 0.6,
        }
    }

    fn transition_tier(self) -> i32 {
        match self {
            WarStrategy::Aggressive => 3,
            WarStrategy::Balanced => 2,
            WarStrategy::Attrition => 1,
            WarStrategy::Defensive => 0,
        }
    }

    pub fn transition_days(self, target: WarStrategy) -> u64 {
        match (self, target) {
            (WarStrategy::Aggressive, WarStrategy::Defensive)
            | (WarStrategy::Defensive, WarStrategy::Aggressive) => 90,
            (from, to) => {
                let delta = (from.transition_tier() - to.transition_tier()).unsigned_abs() as u64;
                30 + 15 * delta.saturating_sub(1)
            }
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            WarStrategy::Aggressive => "攻勢",
            WarStrategy::Balanced => "均衡",
            WarStrategy::Attrition => "消耗戦",
            WarStrategy::Defensive => "守勢",
        }
    }

    pub fn parse(token: &str) -> Option<Self> {
        match token.to_ascii_lowercase().as_str() {
            "aggressive" => Some(WarStrategy::Aggressive),
            "balanced" => Some(WarStrategy::Balanced),
            "attrition" => Some(WarStrategy::Attrition),
            "defensive" => Some(WarStrategy::Defensive),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StrategyTransition {
    pub target: WarStrategy,
    pub started_day: u64,
    pub duration_days: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConflictOutcome {
    AttackerVictory,
    DefenderVictory,
    Stalemate,
    PeaceTreaty,
    NuclearAnnihilation,
}

impl ConflictOutcome {
    pub fn label(self) -> &'static str {
        match self {
            ConflictOutcome::AttackerVictory => "攻撃側勝利",
            ConflictOutcome::DefenderVictory => "防衛側勝利",
            ConflictOutcome::Stalemate => "膠着状態",
            ConflictOutcome::PeaceTreaty => "和平条約",
            ConflictOutcome::NuclearAnnihilation => "核による壊滅",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PeaceTerm {
    StatusQuo,
    Reparations,
    PartialTerritory,
    FullConquest,
}

impl PeaceTerm {
    pub fn label(self) -> &'static str {
        match self {
            PeaceTerm::StatusQuo => "現状維持",
            PeaceTerm::Reparations => "賠償金",
            PeaceTerm::PartialTerritory => "領土の一部割譲",
            PeaceTerm::FullConquest => "全面征服",
        }
    }

    pub fn parse(token: &str) -> Option<Self> {
        match token.to_ascii_lowercase().as_str() {
            "statusquo" | "status" => Some(PeaceTerm::StatusQuo),
            "reparations" => Some(PeaceTerm::Reparations),
            "partial" => Some(PeaceTerm::PartialTerritory),
            "conquest" | "full" => Some(PeaceTerm::FullConquest),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Conflict {
    pub id: u32,
    pub attacker: String,
    pub defender: String,
    pub kind: ConflictKind,
    pub justification: Justification,
    pub attacker_strength: i64,
    pub defender_strength: i64,
    pub attacker_attrition: f64,
    pub defender_attrition: f64,
    pub casualties: HashMap<String, i64>,
    pub costs: HashMap<String, f64>,
    pub strategy: WarStrategy,
    pub transition: Option<StrategyTransition>,
    pub start_date: CalendarDate,
    pub end_date: Option<CalendarDate>,
    pub outcome: Option<ConflictOutcome>,
    pub territory_conquered: Option<f64>,
    pub peace_term: Option<PeaceTerm>,
    pub days_since_start: u64,
}

impl Conflict {
    pub fn is_resolved(&self) -> bool {
        self.outcome.is_some()
    }

    pub fn involves(&self, code: &str) -> bool {
        self.attacker.eq_ignore_ascii_case(code) || self.defender.eq_ignore_ascii_case(code)
    }

    pub fn opponent_of(&self, code: &str) -> Option<&str> {
        if self.attacker.eq_ignore_ascii_case(code) {
            Some(&self.defender)
        } else if self.defender.eq_ignore_ascii_case(code) {
            Some(&self.attacker)
        } else {
            None
        }
    }

    pub fn casualties_of(&self, code: &str) -> i64 {
        self.casualties.get(code).copied().unwrap_or(0)
    }

    pub fn cost_of(&self, code: &str) -> f64 {
        self.costs.get(code).copied().unwrap_or(0.0)
    }

    pub(crate) fn effective_multiplier(&self, current_day: u64) -> f64 {
        let base = self.strategy.attrition_multiplier();
        match &self.transition {
            None => base,
            Some(transition) => {
                let elapsed = current_day.saturating_sub(transition.started_day) as f64;
                let fraction = (elapsed / transition.duration_days.max(1) as f64).clamp(0.0, 1.0);
                base + (transition.target.attrition_multiplier() - base) * fraction
            }
        }
    }
}
