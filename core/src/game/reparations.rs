use serde::Serialize;

use super::country::{CountryState, index_of};
use super::events::ConflictEvent;

#[derive(Debug, Clone, Serialize)]
pub struct ReparationAgreement {
    pub payer: String,
    pub recipient: String,
    pub total_amount: f64,
    pub yearly_payment: f64,
    pub years_paid: u32,
    pub total_years: u32,
    pub conflict_id: u32,
}

#[derive(Debug, Default)]
pub struct ReparationBook {
    active: Vec<ReparationAgreement>,
    completed: Vec<ReparationAgreement>,
}

impl ReparationBook {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub fn active(&self) -> &[ReparationAgreement] {
        &self.active
    }

    pub fn completed(&self) -> &[ReparationAgreement] {
        &self.completed
    }

    pub(crate) fn schedule(
        &mut self,
        payer: String,
        recipient: String,
        total_amount: f64,
        total_years: u32,
        conflict_id: u32,
    ) {
        let total_years = total_years.max(1);
        let total_amount = total_amount.max(0.0);
        self.active.push(ReparationAgreement {
            payer,
            recipient,
            total_amount,
            yearly_payment: total_amount / total_years as f64,
            years_paid: 0,
            total_years,
            conflict_id,
        });
    }

    pub(crate) fn process_yearly(&mut self, countries: &mut [CountryState]) -> Vec<ConflictEvent> {
        let mut events = Vec::new();
        let mut idx = 0;
        while idx < self.active.len() {
            let (paid, payer_name, recipient_name) = {
                let agreement = &self.active[idx];
                let payer_idx = index_of(countries, &agreement.payer);
                let recipient_idx = index_of(countries, &agreement.recipient);
                let (Some(payer_idx), Some(recipient_idx)) = (payer_idx, recipient_idx) else {
                    idx += 1;
                    continue;
                };
                let paid = agreement.yearly_payment.min(countries[payer_idx].gdp);
                countries[payer_idx].gdp = (countries[payer_idx].gdp - paid).max(0.0);
                countries[recipient_idx].gdp += paid;
                (
                    paid,
                    countries[payer_idx].name.clone(),
                    countries[recipient_idx].name.clone(),
                )
            };

            let agreement = &mut self.active[idx];
            agreement.years_paid = (agreement.years_paid + 1).min(agreement.total_years);
            events.push(ConflictEvent::ReparationPaid {
                payer_name: payer_name.clone(),
                recipient_name: recipient_name.clone(),
                amount: paid,
                years_paid: agreement.years_paid,
                total_years: agreement.total_years,
            });

            if agreement.years_paid >= agreement.total_years {
                let finished = self.active.remove(idx);
                events.push(ConflictEvent::ReparationCompleted {
                    payer_name,
                    recipient_name,
                });
                self.completed.push(finished);
            } else {
                idx += 1;
            }
        }
        events
    }
}
