pub(crate) const BASE_DAILY_ATTRITION: f64 = 0.001;
pub(crate) const ATTRITION_DEFEAT_THRESHOLD: f64 = 0.8;
pub(crate) const DAILY_COST_PER_THOUSAND_TROOPS: f64 = 1_000_000.0;
pub(crate) const MIN_TERRITORY_CONQUERED: f64 = 0.1;
pub(crate) const MAX_TERRITORY_CONQUERED: f64 = 0.4;
pub(crate) const WARTIME_MOBILIZATION: f64 = 1.5;
pub(crate) const MAX_SIMULTANEOUS_CONFLICTS: usize = 5;
pub(crate) const MAX_CONFLICTS_PER_COUNTRY: usize = 2;
pub(crate) const REPARATION_GDP_FRACTION: f64 = 0.10;
pub(crate) const REPARATION_DEFAULT_YEARS: u32 = 10;
pub(crate) const CONQUEST_GDP_ABSORPTION: f64 = 0.30;
pub(crate) const CONQUEST_TRANSFER_EXPONENT: f64 = 0.7;
pub(crate) const PARTIAL_TERRITORY_DEFAULT: f64 = 0.15;
pub(crate) const FULL_CONQUEST_DEFAULT: f64 = 0.35;
pub(crate) const CONQUERED_INITIAL_MORALE: f64 = 0.2;
pub(crate) const ANNEXATION_MORALE_THRESHOLD: f64 = 0.5;
pub(crate) const AUTONOMY_MORALE_BONUS: f64 = 0.2;
pub(crate) const SUPPRESSION_MORALE_PENALTY: f64 = 0.1;
pub(crate) const REBELLION_RISK_MORALE_WEIGHT: f64 = 0.3;
pub(crate) const TERRITORY_MILESTONES: &[f64] = &[1.25, 1.5, 2.0];
