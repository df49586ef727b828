//! Line-item and document totals.
//!
//! Tax is computed from the unrounded `quantity × unit_price`; every reported
//! amount is rounded half away from zero to two decimal places.

use rust_decimal::{Decimal, RoundingStrategy};

use crate::models::{DocumentTotals, LineItem};

/// Rounds to cents, half away from zero, always keeping a scale of two.
pub fn round_money(value: Decimal) -> Decimal {
    let mut rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(2);
    rounded
}

pub fn calc_line_total(quantity: Decimal, unit_price: Decimal, tax_rate: Decimal) -> DocumentTotals {
    let raw_net = quantity * unit_price;
    let tax = round_money(raw_net * tax_rate / Decimal::ONE_HUNDRED);
    let gross = round_money(raw_net + tax);

    DocumentTotals {
        net: round_money(raw_net),
        tax,
        gross,
    }
}

/// Sums the per-line totals of `items`. An empty slice yields zeros.
pub fn calc_document_totals(items: &[LineItem]) -> DocumentTotals {
    let (net, tax, gross) = items
        .iter()
        .map(|item| calc_line_total(item.quantity, item.unit_price, item.tax_rate))
        .fold(
            (Decimal::ZERO, Decimal::ZERO, Decimal::ZERO),
            |(net, tax, gross), line| (net + line.net, tax + line.tax, gross + line.gross),
        );

    DocumentTotals {
        net: round_money(net),
        tax: round_money(tax),
        gross: round_money(gross),
    }
}
