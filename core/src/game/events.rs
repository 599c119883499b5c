use serde::Serialize;

use super::conflict::{ConflictOutcome, Justification, PeaceTerm, WarStrategy};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ConflictEvent {
    WarDeclared {
        conflict_id: u32,
        attacker: String,
        attacker_name: String,
        defender: String,
        defender_name: String,
        justification: Justification,
    },
    StrategyShift {
        conflict_id: u32,
        country_name: String,
        from: WarStrategy,
        to: WarStrategy,
        transition_days: u64,
    },
    WarConcluded {
        conflict_id: u32,
        attacker_name: String,
        defender_name: String,
        outcome: ConflictOutcome,
        territory_conquered: Option<f64>,
    },
    PeaceSettled {
        conflict_id: u32,
        winner_name: String,
        loser_name: String,
        term: PeaceTerm,
    },
    TerritoryTransferred {
        conflict_id: u32,
        winner_name: String,
        loser_name: String,
        size: f64,
        population: i64,
        percent: f64,
    },
    TerritoryMilestone {
        country_name: String,
        ratio: f64,
    },
    ReparationScheduled {
        payer_name: String,
        recipient_name: String,
        total_amount: f64,
        total_years: u32,
    },
    ReparationPaid {
        payer_name: String,
        recipient_name: String,
        amount: f64,
        years_paid: u32,
        total_years: u32,
    },
    ReparationCompleted {
        payer_name: String,
        recipient_name: String,
    },
    RebellionStarted {
        rebellion_id: u32,
        territory_name: String,
        strength: i64,
        support: f64,
    },
    RebellionSuppressed {
        rebellion_id: u32,
        territory_name: String,
        casualties: i64,
        cost: f64,
    },
    SuppressionFailed {
        rebellion_id: u32,
        territory_name: String,
    },
    IndependenceGranted {
        territory_name: String,
    },
    AutonomyGranted {
        territory_name: String,
    },
}

impl ConflictEvent {
    pub fn describe(&self) -> String {
        match self {
            ConflictEvent::WarDeclared {
                attacker_name,
                defender_name,
                justification,
                ..
            } => format!(
                "{} が{}を掲げて {} に宣戦布告しました。",
                attacker_name,
                justification.label(),
                defender_name
            ),
            ConflictEvent::StrategyShift {
                country_name,
                from,
                to,
                transition_days,
                ..
            } => format!(
                "{} は戦略を{}から{}へ移行し始めました (完了まで {} 日)。",
                country_name,
                from.label(),
                to.label(),
                transition_days
            ),
            ConflictEvent::WarConcluded {
                attacker_name,
                defender_name,
                outcome,
                territory_conquered,
                ..
            } => match territory_conquered {
                Some(percent) if *percent > 0.0 => format!(
                    "{} と {} の戦争が終結しました: {} (占領率 {:.0}%)。",
                    attacker_name,
                    defender_name,
                    outcome.label(),
                    percent * 100.0
                ),
                _ => format!(
                    "{} と {} の戦争が終結しました: {}。",
                    attacker_name,
                    defender_name,
                    outcome.label()
                ),
            },
            ConflictEvent::PeaceSettled {
                winner_name,
                loser_name,
                term,
                ..
            } => format!(
                "{} と {} の間で講和が成立しました ({})。",
                winner_name,
                loser_name,
                term.label()
            ),
            ConflictEvent::TerritoryTransferred {
                winner_name,
                loser_name,
                size,
                population,
                percent,
                ..
            } => format!(
                "{} は領土 {:.0} km² (人口 {} 人、全土の {:.0}%) を {} に割譲しました。",
                loser_name,
                size,
                population,
                percent * 100.0,
                winner_name
            ),
            ConflictEvent::TerritoryMilestone { country_name, ratio } => format!(
                "{} の総領土が建国時の {:.0}% に達しました。",
                country_name,
                ratio * 100.0
            ),
            ConflictEvent::ReparationScheduled {
                payer_name,
                recipient_name,
                total_amount,
                total_years,
            } => format!(
                "{} は {} への賠償金 {:.0} ドルを {} 年賦で支払います。",
                payer_name, recipient_name, total_amount, total_years
            ),
            ConflictEvent::ReparationPaid {
                payer_name,
                recipient_name,
                amount,
                years_paid,
                total_years,
            } => format!(
                "{} は賠償金 {:.0} ドルを {} に支払いました ({}/{} 年)。",
                payer_name, amount, recipient_name, years_paid, total_years
            ),
            ConflictEvent::ReparationCompleted {
                payer_name,
                recipient_name,
            } => format!(
                "{} の {} への賠償義務が完了しました。",
                payer_name, recipient_name
            ),
            ConflictEvent::RebellionStarted {
                territory_name,
                strength,
                support,
                ..
            } => format!(
                "{} で反乱が発生しました (兵力 {} 人、住民支持率 {:.0}%)。",
                territory_name,
                strength,
                support * 100.0
            ),
            ConflictEvent::RebellionSuppressed {
                territory_name,
                casualties,
                cost,
                ..
            } => format!(
                "{} の反乱を鎮圧しました (死傷者 {} 人、費用 {:.0} ドル)。",
                territory_name, casualties, cost
            ),
            ConflictEvent::SuppressionFailed { territory_name, .. } => {
                format!("{} の反乱鎮圧に失敗しました。", territory_name)
            }
            ConflictEvent::IndependenceGranted { territory_name } => {
                format!("{} の独立が承認されました。", territory_name)
            }
            ConflictEvent::AutonomyGranted { territory_name } => {
                format!("{} に自治権が付与されました。", territory_name)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn war_declaration_mentions_justification() {
        let event = ConflictEvent::WarDeclared {
            conflict_id: 1,
            attacker: "AST".to_string(),
            attacker_name: "Asteria".to_string(),
            defender: "BOR".to_string(),
            defender_name: "Borealis".to_string(),
            justification: Justification::ResourceAcquisition,
        };
        let text = event.describe();
        assert!(text.contains("宣戦布告"));
        assert!(text.contains("資源獲得"));
    }

    #[test]
    fn conclusion_includes_conquest_share_only_when_present() {
        let base = ConflictEvent::WarConcluded {
            conflict_id: 2,
            attacker_name: "Asteria".to_string(),
            defender_name: "Borealis".to_string(),
            outcome: ConflictOutcome::AttackerVictory,
            territory_conquered: Some(0.4),
        };
        assert!(base.describe().contains("占領率 40%"));

        let stalemate = ConflictEvent::WarConcluded {
            conflict_id: 3,
            attacker_name: "Asteria".to_string(),
            defender_name: "Borealis".to_string(),
            outcome: ConflictOutcome::Stalemate,
            territory_conquered: None,
        };
        assert!(stalemate.describe().contains("膠着状態"));
        assert!(!stalemate.describe().contains("占領率"));
    }
}
