//! Turning selections into priced, immutable invoices.

mod service;

pub use service::BillingService;

use common::model::MAX_QUANTITY;
use common::{MenuItemId, Money};
use serde::{Deserialize, Serialize};

/// Consumption tax applied to every sale (ITBIS), in percent.
pub const TAX_PERCENT: u32 = 18;

/// Service charge applied to dine-in sales only, in percent.
pub const SERVICE_CHARGE_PERCENT: u32 = 10;

/// Description used for a selection whose menu item no longer exists.
pub const UNKNOWN_PRODUCT: &str = "Unknown Product";

/// Whether a sale was eaten at a table or taken away.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceKind {
    DineIn,
    Takeout,
}

impl ServiceKind {
    pub fn service_charge_percent(&self) -> u32 {
        match self {
            ServiceKind::DineIn => SERVICE_CHARGE_PERCENT,
            ServiceKind::Takeout => 0,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceKind::DineIn => "dine_in",
            ServiceKind::Takeout => "takeout",
        }
    }
}

/// One (menu item, raw quantity) pair as submitted by staff.
///
/// The quantity is kept as entered and only interpreted by
/// [`parse_quantity`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub menu_item_id: MenuItemId,
    pub quantity: String,
}

impl Selection {
    pub fn new(menu_item_id: MenuItemId, quantity: impl Into<String>) -> Self {
        Self {
            menu_item_id,
            quantity: quantity.into(),
        }
    }
}

/// Parses a raw quantity, treating anything that is not a plain run of ASCII
/// digits (blank, signed, decimal, padded) as zero. So is anything above
/// [`MAX_QUANTITY`].
pub fn parse_quantity(raw: &str) -> u32 {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return 0;
    }
    raw.parse::<u32>()
        .ok()
        .filter(|quantity| *quantity <= MAX_QUANTITY)
        .unwrap_or(0)
}

/// Derived amounts of a sale.
///
/// `total` is the sum of the already rounded parts, so it always equals
/// `subtotal + tax + service_charge` exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SaleTotals {
    pub subtotal: Money,
    pub tax: Money,
    pub service_charge: Money,
    pub total: Money,
}

impl SaleTotals {
    /// Returns `None` if any amount overflows.
    pub fn compute(subtotal: Money, kind: ServiceKind) -> Option<Self> {
        let tax = subtotal.checked_percent(TAX_PERCENT)?;
        let service_charge = subtotal.checked_percent(kind.service_charge_percent())?;
        let total = subtotal.checked_add(tax)?.checked_add(service_charge)?;
        Some(Self {
            subtotal,
            tax,
            service_charge,
            total,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_quantity_accepts_plain_digits() {
        assert_eq!(parse_quantity("2"), 2);
        assert_eq!(parse_quantity("007"), 7);
        assert_eq!(parse_quantity("0"), 0);
    }

    #[test]
    fn parse_quantity_zeroes_everything_else() {
        for raw in ["", " ", " 2", "2 ", "-1", "+1", "1.5", "abc", "١", "99999999999"] {
            assert_eq!(parse_quantity(raw), 0, "{raw:?}");
        }
    }

    #[test]
    fn parse_quantity_stops_at_storable_maximum() {
        assert_eq!(parse_quantity("2147483647"), MAX_QUANTITY);
        assert_eq!(parse_quantity("2147483648"), 0);
        assert_eq!(parse_quantity("4294967295"), 0);
    }

    #[test]
    fn totals_overflow_is_none() {
        let subtotal = Money::from_cents(i64::MAX / 10 * 9);
        assert_eq!(SaleTotals::compute(subtotal, ServiceKind::DineIn), None);
        assert_eq!(SaleTotals::compute(subtotal, ServiceKind::Takeout), None);
    }

    #[test]
    fn dine_in_totals() {
        let totals = SaleTotals::compute(Money::from_units(20), ServiceKind::DineIn).unwrap();
        assert_eq!(totals.tax, Money::from_cents(360));
        assert_eq!(totals.service_charge, Money::from_cents(200));
        assert_eq!(totals.total, Money::from_cents(2560));
    }

    #[test]
    fn takeout_has_no_service_charge() {
        let totals = SaleTotals::compute(Money::from_units(20), ServiceKind::Takeout).unwrap();
        assert_eq!(totals.service_charge, Money::zero());
        assert_eq!(totals.total, Money::from_cents(2360));
    }

    #[test]
    fn total_is_sum_of_rounded_parts() {
        let totals = SaleTotals::compute(Money::from_cents(1099), ServiceKind::DineIn).unwrap();
        assert_eq!(totals.tax, Money::from_cents(198));
        assert_eq!(totals.service_charge, Money::from_cents(110));
        assert_eq!(
            totals.total,
            totals.subtotal + totals.tax + totals.service_charge
        );
    }
}
