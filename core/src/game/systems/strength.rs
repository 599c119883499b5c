use crate::game::country::CountryState;
use crate::game::engine::ConflictEngine;

const PEACETIME_RECOVERY_STEP: f64 = 0.05;
const WARTIME_RECOVERY_STEP: f64 = 0.02;
const STRENGTH_POPULATION_RATE: f64 = 0.004;
const GDP_PER_CAPITA_BASELINE: f64 = 20_000.0;

pub(crate) fn evolve(countries: &mut [CountryState], engine: &ConflictEngine) {
    for country in countries.iter_mut() {
        let wealth_factor = (country.gdp_per_capita() / GDP_PER_CAPITA_BASELINE).clamp(0.5, 2.0);
        let target = country.population as f64 * STRENGTH_POPULATION_RATE * wealth_factor;
        let step = if engine.active_count_for(&country.code) > 0 {
            WARTIME_RECOVERY_STEP
        } else {
            PEACETIME_RECOVERY_STEP
        };
        let next = country.military_strength as f64
            + (target - country.military_strength as f64) * step;
        country.military_strength = next.max(0.0) as i64;
    }
}
