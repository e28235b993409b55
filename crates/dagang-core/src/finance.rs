//! # Financial Aggregator
//!
//! Computes a financial summary over the four transaction collections for a
//! closed date interval.
//!
//! ## Callers
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Dashboard ──► trailing 14-day window ──┐                               │
//! │                                         ├──► summarize() ──► summary    │
//! │  Report page ──► operator [from, to] ───┘            │                  │
//! │                                                      ▼                  │
//! │                                              CSV exporter (engine)      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Both callers use the identical code path. Nothing is cached; every call
//! recomputes from the records it is handed.
//!
//! ## Cost Basis
//! COGS is evaluated at the per-item `cost_price_at_sale` snapshot. The
//! current catalog cost is consulted only for legacy items written before
//! snapshots existed, and a product missing from the catalog counts as
//! zero cost. Summation is exact integer arithmetic; rounding happens only
//! at display/export time.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::matcher::CatalogSnapshot;
use crate::money::Money;
use crate::types::{Expense, OtherIncome, ReturnItem, Sale, SaleItem, SaleReturn};

// =============================================================================
// Date Interval
// =============================================================================

/// A closed date interval `[start, end]`. Both endpoints are inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateInterval {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl DateInterval {
    /// Creates an interval, rejecting `start > end`.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> CoreResult<Self> {
        if start > end {
            return Err(CoreError::InvalidInterval {
                start: start.to_rfc3339(),
                end: end.to_rfc3339(),
            });
        }
        Ok(DateInterval { start, end })
    }

    /// The trailing window ending now: `[now - days, now]`.
    ///
    /// The dashboard uses `trailing_days(14)`.
    pub fn trailing_days(days: i64) -> Self {
        let end = Utc::now();
        DateInterval {
            start: end - Duration::days(days),
            end,
        }
    }

    /// Whether a timestamp falls inside the interval (inclusive).
    #[inline]
    pub fn contains(&self, date: DateTime<Utc>) -> bool {
        date >= self.start && date <= self.end
    }
}

// =============================================================================
// Financial Summary
// =============================================================================

/// Derived financial summary for one interval. Never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct FinancialSummary {
    /// `Σ sale.final_total − Σ return.total_refund`
    pub net_revenue: Money,
    /// Cost of goods sold net of returned goods, at sale-time cost.
    pub total_cogs: Money,
    /// `Σ expense.amount`
    pub total_expenses: Money,
    /// `Σ other_income.amount`
    pub total_other_income: Money,
    /// `net_revenue − total_cogs`
    pub gross_profit: Money,
    /// `gross_profit − total_expenses + total_other_income`
    pub net_profit: Money,
}

/// Cost basis for one sale item: the frozen snapshot, else the current
/// catalog cost, else zero.
pub fn item_cost_basis(
    snapshot_cost: Option<Money>,
    product_id: &str,
    catalog: &CatalogSnapshot,
) -> Money {
    snapshot_cost
        .or_else(|| catalog.by_id(product_id).map(|p| p.cost_price))
        .unwrap_or_else(Money::zero)
}

/// COGS for one sale (sum over items of cost basis × quantity).
pub fn sale_cogs(sale: &Sale, catalog: &CatalogSnapshot) -> Money {
    sale.items
        .iter()
        .map(|item: &SaleItem| {
            item_cost_basis(item.cost_price_at_sale, &item.product_id, catalog)
                .multiply_quantity(item.quantity)
        })
        .sum()
}

/// Cost value of the goods on one return.
fn return_cogs(ret: &SaleReturn, catalog: &CatalogSnapshot) -> Money {
    ret.items
        .iter()
        .map(|item: &ReturnItem| {
            item_cost_basis(item.cost_price_at_sale, &item.product_id, catalog)
                .multiply_quantity(item.quantity)
        })
        .sum()
}

/// Computes the financial summary for `interval` over the given records.
///
/// Each collection is filtered to entries whose date falls inside the
/// interval; out-of-range records are ignored, not an error.
///
/// ## Example
/// ```rust
/// use chrono::Utc;
/// use dagang_core::finance::{summarize, DateInterval};
/// use dagang_core::matcher::CatalogSnapshot;
///
/// let interval = DateInterval::trailing_days(14);
/// let summary = summarize(&[], &[], &[], &[], interval, &CatalogSnapshot::default());
/// assert!(summary.net_profit.is_zero());
/// ```
pub fn summarize(
    sales: &[Sale],
    returns: &[SaleReturn],
    expenses: &[Expense],
    other_incomes: &[OtherIncome],
    interval: DateInterval,
    catalog: &CatalogSnapshot,
) -> FinancialSummary {
    let sales_in_range = sales.iter().filter(|s| interval.contains(s.date));
    let returns_in_range: Vec<&SaleReturn> = returns
        .iter()
        .filter(|r| interval.contains(r.date))
        .collect();

    let mut gross_revenue = Money::zero();
    let mut sold_cogs = Money::zero();
    for sale in sales_in_range {
        gross_revenue += sale.final_total;
        sold_cogs += sale_cogs(sale, catalog);
    }

    let total_refunds: Money = returns_in_range.iter().map(|r| r.total_refund).sum();
    let returned_cogs: Money = returns_in_range.iter().map(|r| return_cogs(r, catalog)).sum();

    let total_expenses: Money = expenses
        .iter()
        .filter(|e| interval.contains(e.date))
        .map(|e| e.amount)
        .sum();

    let total_other_income: Money = other_incomes
        .iter()
        .filter(|i| interval.contains(i.date))
        .map(|i| i.amount)
        .sum();

    let net_revenue = gross_revenue - total_refunds;
    let total_cogs = sold_cogs - returned_cogs;
    let gross_profit = net_revenue - total_cogs;
    let net_profit = gross_profit - total_expenses + total_other_income;

    FinancialSummary {
        net_revenue,
        total_cogs,
        total_expenses,
        total_other_income,
        gross_profit,
        net_profit,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Product;
    use chrono::TimeZone;

    fn date(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 7, day, 12, 0, 0).unwrap()
    }

    fn interval(from: u32, to: u32) -> DateInterval {
        DateInterval::new(
            Utc.with_ymd_and_hms(2026, 7, from, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2026, 7, to, 23, 59, 59).unwrap(),
        )
        .unwrap()
    }

    fn sale_with_items(final_total: i64, items: Vec<SaleItem>, day: u32) -> Sale {
        Sale {
            id: "s1".to_string(),
            subtotal: Money::from_units(final_total),
            discount_bps: 0,
            final_total: Money::from_units(final_total),
            items,
            date: date(day),
        }
    }

    fn item(qty: i64, cost: i64) -> SaleItem {
        SaleItem {
            product_id: "p1".to_string(),
            name: "Item".to_string(),
            quantity: qty,
            unit_price: Money::from_units(0),
            cost_price_at_sale: Some(Money::from_units(cost)),
        }
    }

    /// Property 6: the worked example from the report page.
    #[test]
    fn test_summary_worked_example() {
        let sales = vec![sale_with_items(
            52200,
            vec![item(2, 12000), item(1, 15000)],
            10,
        )];

        let summary = summarize(
            &sales,
            &[],
            &[],
            &[],
            interval(1, 31),
            &CatalogSnapshot::default(),
        );

        assert_eq!(summary.net_revenue.units(), 52200);
        assert_eq!(summary.total_cogs.units(), 39000);
        assert_eq!(summary.gross_profit.units(), 13200);
        assert_eq!(summary.net_profit.units(), 13200);
    }

    /// Property 5: catalog price edits never move historical profit.
    #[test]
    fn test_cost_snapshot_stability() {
        let sales = vec![sale_with_items(52200, vec![item(2, 12000), item(1, 15000)], 10)];

        let before = summarize(&sales, &[], &[], &[], interval(1, 31), &CatalogSnapshot::default());

        // Catalog now claims a wildly different cost for p1.
        let edited_catalog = CatalogSnapshot::new(vec![Product {
            id: "p1".to_string(),
            name: "Item".to_string(),
            cost_price: Money::from_units(999_999),
            selling_price: Money::from_units(0),
            stock: 0,
            category: "X".to_string(),
            subcategory: None,
        }]);
        let after = summarize(&sales, &[], &[], &[], interval(1, 31), &edited_catalog);

        assert_eq!(before, after);
    }

    /// Legacy items without a snapshot fall back to current catalog cost.
    #[test]
    fn test_legacy_fallback_uses_catalog_cost() {
        let legacy_item = SaleItem {
            cost_price_at_sale: None,
            ..item(2, 0)
        };
        let sales = vec![sale_with_items(10000, vec![legacy_item], 10)];

        let catalog = CatalogSnapshot::new(vec![Product {
            id: "p1".to_string(),
            name: "Item".to_string(),
            cost_price: Money::from_units(3000),
            selling_price: Money::from_units(5000),
            stock: 0,
            category: "X".to_string(),
            subcategory: None,
        }]);

        let summary = summarize(&sales, &[], &[], &[], interval(1, 31), &catalog);
        assert_eq!(summary.total_cogs.units(), 6000);
    }

    #[test]
    fn test_returns_reduce_revenue_and_cogs() {
        let sales = vec![sale_with_items(50000, vec![item(5, 4000)], 10)];
        let returns = vec![SaleReturn {
            id: "r1".to_string(),
            sale_id: Some("s1".to_string()),
            items: vec![ReturnItem {
                product_id: "p1".to_string(),
                name: "Item".to_string(),
                quantity: 2,
                cost_price_at_sale: Some(Money::from_units(4000)),
            }],
            total_refund: Money::from_units(20000),
            date: date(12),
        }];

        let summary = summarize(
            &sales,
            &returns,
            &[],
            &[],
            interval(1, 31),
            &CatalogSnapshot::default(),
        );

        assert_eq!(summary.net_revenue.units(), 30000);
        assert_eq!(summary.total_cogs.units(), 12000); // 20000 − 8000
        assert_eq!(summary.gross_profit.units(), 18000);
    }

    #[test]
    fn test_expenses_and_other_income() {
        let sales = vec![sale_with_items(10000, vec![item(1, 4000)], 10)];
        let expenses = vec![Expense {
            id: "e1".to_string(),
            name: "Biaya Marketplace".to_string(),
            amount: Money::from_units(2500),
            category: "Operasional".to_string(),
            subcategory: None,
            date: date(11),
        }];
        let incomes = vec![OtherIncome {
            id: "i1".to_string(),
            name: "Cashback".to_string(),
            amount: Money::from_units(500),
            date: date(12),
        }];

        let summary = summarize(
            &sales,
            &[],
            &expenses,
            &incomes,
            interval(1, 31),
            &CatalogSnapshot::default(),
        );

        assert_eq!(summary.gross_profit.units(), 6000);
        assert_eq!(summary.net_profit.units(), 4000); // 6000 − 2500 + 500
    }

    #[test]
    fn test_interval_bounds_are_inclusive() {
        let iv = interval(10, 20);
        assert!(iv.contains(iv.start));
        assert!(iv.contains(iv.end));
        assert!(!iv.contains(date(21)));

        let out_of_range = vec![sale_with_items(9999, vec![], 25)];
        let summary = summarize(
            &out_of_range,
            &[],
            &[],
            &[],
            iv,
            &CatalogSnapshot::default(),
        );
        assert!(summary.net_revenue.is_zero());
    }

    #[test]
    fn test_invalid_interval_rejected() {
        assert!(DateInterval::new(date(20), date(10)).is_err());
    }
}
