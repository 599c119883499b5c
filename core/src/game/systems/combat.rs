use crate::game::country::{CountryState, display_name};
use crate::game::engine::ConflictEngine;
use crate::game::events::ConflictEvent;

pub(crate) fn advance_all(
    engine: &mut ConflictEngine,
    countries: &[CountryState],
    current_day: u64,
) -> (Vec<ConflictEvent>, Vec<u32>) {
    let ids: Vec<u32> = engine.active().iter().map(|conflict| conflict.id).collect();
    let mut events = Vec::new();
    let mut concluded = Vec::new();
    for id in ids {
        // 同一ティック内で解決済みになった紛争は失敗扱いで読み飛ばす
        let Ok(outcome) = engine.simulate_day(id, current_day) else {
            continue;
        };
        if let Some(outcome) = outcome {
            let conflict = engine.find(id).expect("simulated conflict must exist");
            events.push(ConflictEvent::WarConcluded {
                conflict_id: id,
                attacker_name: display_name(countries, &conflict.attacker),
                defender_name: display_name(countries, &conflict.defender),
                outcome,
                territory_conquered: conflict.territory_conquered,
            });
            concluded.push(id);
        }
    }
    (events, concluded)
}
