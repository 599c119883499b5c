use serde::{Deserialize, Serialize};

use super::WARTIME_MOBILIZATION;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CountryDefinition {
    pub code: String,
    pub name: String,
    pub government: String,
    pub base_territory: f64,
    pub population: i64,
    pub gdp: f64,
    pub military_strength: i64,
    #[serde(default)]
    pub nuclear_capable: bool,
}

#[derive(Debug, Clone)]
pub struct CountryState {
    pub code: String,
    pub name: String,
    pub government: String,
    pub base_territory: f64,
    pub conquered_territory: f64,
    pub lost_territory: f64,
    pub gdp: f64,
    pub population: i64,
    pub military_strength: i64,
    pub nuclear_capable: bool,
    milestone_level: usize,
}

impl CountryState {
    pub(crate) fn new(definition: CountryDefinition) -> Self {
        Self {
            code: definition.code,
            name: definition.name,
            government: definition.government,
            base_territory: definition.base_territory.max(0.0),
            conquered_territory: 0.0,
            lost_territory: 0.0,
            gdp: definition.gdp.max(0.0),
            population: definition.population.max(0),
            military_strength: definition.military_strength.max(0),
            nuclear_capable: definition.nuclear_capable,
            milestone_level: 0,
        }
    }

    pub fn total_territory(&self) -> f64 {
        (self.base_territory + self.conquered_territory - self.lost_territory).max(0.0)
    }

    pub fn mobilized_strength(&self) -> i64 {
        ((self.military_strength as f64) * WARTIME_MOBILIZATION) as i64
    }

    pub fn gdp_per_capita(&self) -> f64 {
        if self.population <= 0 {
            return 0.0;
        }
        self.gdp / self.population as f64
    }

    pub(crate) fn record_conquest_gain(&mut self, size: f64, population: i64) {
        self.conquered_territory += size.max(0.0);
        self.population = self.population.saturating_add(population.max(0));
    }

    pub(crate) fn record_conquest_loss(&mut self, size: f64, population: i64) {
        self.lost_territory += size.max(0.0);
        self.population = (self.population - population.max(0)).max(0);
    }

    pub(crate) fn release_holding(&mut self, size: f64, population: i64) {
        self.conquered_territory = (self.conquered_territory - size.max(0.0)).max(0.0);
        self.population = (self.population - population.max(0)).max(0);
    }

    pub(crate) fn milestone_level(&self) -> usize {
        self.milestone_level
    }

    pub(crate) fn set_milestone_level(&mut self, level: usize) {
        self.milestone_level = level;
    }
}

pub(crate) fn index_of(countries: &[CountryState], code: &str) -> Option<usize> {
    countries
        .iter()
        .position(|country| country.code.eq_ignore_ascii_case(code))
}

pub(crate) fn display_name(countries: &[CountryState], code: &str) -> String {
    index_of(countries, code)
        .map(|idx| countries[idx].name.clone())
        .unwrap_or_else(|| code.to_string())
}
