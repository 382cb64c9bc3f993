//! Display totals derived from the latest fetched lines.

use serde::Serialize;

use crate::models::SaleTemp;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct CartTotals {
    /// Σ unit price × qty.
    pub base: f64,
    /// Σ size surcharges across every detail slot.
    pub surcharges: f64,
}

impl CartTotals {
    pub fn total(&self) -> f64 {
        round_money(self.base + self.surcharges)
    }

    /// Checkout is allowed once the tendered amount covers the total.
    /// The tender is compared unrounded; non-finite amounts never cover.
    pub fn covered_by(&self, tendered: f64) -> bool {
        tendered.is_finite() && tendered >= self.total()
    }
}

/// Round to satang (two decimals).
pub fn round_money(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

pub fn compute_totals(lines: &[SaleTemp]) -> CartTotals {
    let mut totals = CartTotals::default();
    for line in lines {
        totals.base += line.unit_price() * line.qty as f64;
        totals.surcharges += line.details.iter().map(|d| d.surcharge()).sum::<f64>();
    }
    totals.base = round_money(totals.base);
    totals.surcharges = round_money(totals.surcharges);
    totals
}

pub fn change_due(total: f64, tendered: f64) -> f64 {
    round_money(tendered - total)
}
