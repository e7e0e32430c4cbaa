//! # Sales Aggregator
//!
//! Monthly sales report over the order ledger.
//!
//! ## Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      report_for_month                                   │
//! │                                                                         │
//! │  &[Order] ──► filter: local (year, month) == period                    │
//! │                   │                                                     │
//! │                   ├──► totals: revenue, count, average                 │
//! │                   │                                                     │
//! │                   ├──► daily: BTreeMap<NaiveDate, DailyStat>           │
//! │                   │          (ascending, only days with orders)        │
//! │                   │                                                     │
//! │                   └──► items: name → ItemStat, first-seen order        │
//! │                              stable sort by quantity desc, top 10      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Everything here is a read-only projection: the same orders and period
//! always produce the same report.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate, TimeZone};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::Money;
use crate::types::Order;
use crate::validation::{validate_month, ValidationResult};

/// Number of entries kept in [`SalesReport::top_items`].
pub const TOP_ITEMS_LIMIT: usize = 10;

// =============================================================================
// Report Period
// =============================================================================

/// The (year, month) pair selecting which orders feed a report.
///
/// ## Example
/// ```rust
/// use bistro_core::report::ReportPeriod;
///
/// let period: ReportPeriod = "2026-03".parse().unwrap();
/// assert_eq!(period.year(), 2026);
/// assert_eq!(period.month(), 3);
/// assert!("2026-13".parse::<ReportPeriod>().is_err());
/// ```
///
/// Deserializing goes through [`ReportPeriod::new`], so a stored period
/// with month 13 is rejected too.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(try_from = "PeriodFields")]
#[ts(export)]
pub struct ReportPeriod {
    year: i32,
    month: u32,
}

/// Unchecked wire shape of [`ReportPeriod`].
#[derive(Deserialize)]
struct PeriodFields {
    year: i32,
    month: u32,
}

impl TryFrom<PeriodFields> for ReportPeriod {
    type Error = ValidationError;

    fn try_from(fields: PeriodFields) -> Result<Self, Self::Error> {
        ReportPeriod::new(fields.year, fields.month)
    }
}

impl ReportPeriod {
    /// Creates a period; `month` is 1-indexed.
    pub fn new(year: i32, month: u32) -> ValidationResult<Self> {
        validate_month(month)?;
        Ok(ReportPeriod { year, month })
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    /// Whether a local calendar date falls in this period.
    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }
}

impl fmt::Display for ReportPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// Parses the `YYYY-MM` value produced by a month picker.
impl FromStr for ReportPeriod {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ValidationError::InvalidFormat {
            field: "month".to_string(),
            reason: format!("expected YYYY-MM, got '{}'", s),
        };

        let (year, month) = s.trim().split_once('-').ok_or_else(invalid)?;
        if year.len() != 4 || month.is_empty() || month.len() > 2 {
            return Err(invalid());
        }
        let year: i32 = year.parse().map_err(|_| invalid())?;
        let month: u32 = month.parse().map_err(|_| invalid())?;

        ReportPeriod::new(year, month)
    }
}

// =============================================================================
// Report Types
// =============================================================================

/// Revenue and order count for one calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct DailyStat {
    #[ts(as = "String")]
    pub date: NaiveDate,
    pub revenue: Money,
    pub order_count: usize,
}

/// Units sold and revenue for one item name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ItemStat {
    pub name: String,
    #[ts(type = "number")]
    pub total_quantity: u64,
    pub total_revenue: Money,
}

/// The monthly sales report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct SalesReport {
    pub period: ReportPeriod,
    pub total_revenue: Money,
    pub total_orders: usize,
    /// `total_revenue / total_orders`, zero for a month without orders.
    pub avg_order_value: Money,
    /// Ascending by date; days without orders are absent.
    pub daily_breakdown: Vec<DailyStat>,
    /// Descending by quantity, ties in first-seen order, at most
    /// [`TOP_ITEMS_LIMIT`] entries.
    pub top_items: Vec<ItemStat>,
}

impl SalesReport {
    /// Whether the period had no orders at all.
    pub fn is_empty(&self) -> bool {
        self.total_orders == 0
    }
}

// =============================================================================
// Aggregation
// =============================================================================

/// Builds the sales report for `period`.
///
/// ## Arguments
/// * `orders` - the ledger, in any order
/// * `period` - the (year, month) to report on
/// * `tz` - the time zone whose calendar decides which day and month an
///   order belongs to (the shop's local time)
///
/// ## Example
/// ```rust
/// use bistro_core::report::{report_for_month, ReportPeriod};
/// use chrono::Utc;
///
/// let report = report_for_month(&[], ReportPeriod::new(2026, 3).unwrap(), &Utc);
/// assert_eq!(report.total_orders, 0);
/// assert!(report.avg_order_value.is_zero());
/// ```
pub fn report_for_month<Tz: TimeZone>(
    orders: &[Order],
    period: ReportPeriod,
    tz: &Tz,
) -> SalesReport {
    let month_orders: Vec<(NaiveDate, &Order)> = orders
        .iter()
        .map(|order| (order.placed_at_in(tz).date_naive(), order))
        .filter(|(date, _)| period.contains(*date))
        .collect();

    let total_revenue: Money = month_orders.iter().map(|(_, order)| order.total).sum();
    let total_orders = month_orders.len();

    SalesReport {
        period,
        total_revenue,
        total_orders,
        avg_order_value: total_revenue.average_over(total_orders),
        daily_breakdown: daily_breakdown(&month_orders),
        top_items: top_items(month_orders.iter().map(|(_, order)| *order)),
    }
}

/// Groups orders by local calendar day.
fn daily_breakdown(orders: &[(NaiveDate, &Order)]) -> Vec<DailyStat> {
    let mut days: BTreeMap<NaiveDate, DailyStat> = BTreeMap::new();

    for (date, order) in orders {
        let day = days.entry(*date).or_insert_with(|| DailyStat {
            date: *date,
            revenue: Money::zero(),
            order_count: 0,
        });
        day.revenue += order.total;
        day.order_count += 1;
    }

    days.into_values().collect()
}

/// Ranks item names by units sold.
///
/// Items are keyed by name, so two menu entries sharing a name are merged.
/// The accumulator keeps first-seen order and the sort is stable, which
/// makes ties come out in the order the items first appeared.
fn top_items<'a>(orders: impl Iterator<Item = &'a Order>) -> Vec<ItemStat> {
    let mut ranked = ItemTally::default();
    for order in orders {
        for item in &order.items {
            ranked.record(&item.name, item.quantity, item.line_total());
        }
    }
    ranked.into_top(TOP_ITEMS_LIMIT)
}

/// Name-keyed accumulator with a defined iteration order.
#[derive(Debug, Default)]
struct ItemTally {
    index: HashMap<String, usize>,
    stats: Vec<ItemStat>,
}

impl ItemTally {
    fn record(&mut self, name: &str, quantity: u32, revenue: Money) {
        let slot = match self.index.get(name) {
            Some(&slot) => slot,
            None => {
                self.stats.push(ItemStat {
                    name: name.to_string(),
                    total_quantity: 0,
                    total_revenue: Money::zero(),
                });
                self.index.insert(name.to_string(), self.stats.len() - 1);
                self.stats.len() - 1
            }
        };

        let stat = &mut self.stats[slot];
        stat.total_quantity += u64::from(quantity);
        stat.total_revenue += revenue;
    }

    fn into_top(mut self, limit: usize) -> Vec<ItemStat> {
        // sort_by is stable
        self.stats
            .sort_by(|a, b| b.total_quantity.cmp(&a.total_quantity));
        self.stats.truncate(limit);
        self.stats
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::OrderItem;
    use chrono::{DateTime, FixedOffset, Utc};

    fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    fn item(name: &str, price: i64, quantity: u32) -> OrderItem {
        OrderItem {
            name: name.to_string(),
            price: Money::from_major(price),
            quantity,
        }
    }

    fn order(seq: u64, placed_at: DateTime<Utc>, items: Vec<OrderItem>) -> Order {
        let total = crate::order::items_total(&items);
        Order {
            order_number: crate::order::format_order_number(seq),
            date_time: placed_at,
            items,
            total,
        }
    }

    fn march() -> ReportPeriod {
        ReportPeriod::new(2026, 3).unwrap()
    }

    #[test]
    fn test_month_totals_exclude_other_months() {
        let orders = vec![
            order(1, at(2026, 3, 2, 10), vec![item("A", 100, 1)]),
            order(2, at(2026, 3, 20, 10), vec![item("B", 200, 1)]),
            order(3, at(2026, 4, 1, 10), vec![item("C", 50, 1)]),
        ];

        let report = report_for_month(&orders, march(), &Utc);

        assert_eq!(report.total_revenue, Money::from_major(300));
        assert_eq!(report.total_orders, 2);
        assert_eq!(report.avg_order_value, Money::from_major(150));
        assert!(report.top_items.iter().all(|i| i.name != "C"));
    }

    #[test]
    fn test_same_month_other_year_is_excluded() {
        let orders = vec![order(1, at(2025, 3, 2, 10), vec![item("A", 100, 1)])];
        let report = report_for_month(&orders, march(), &Utc);
        assert!(report.is_empty());
    }

    #[test]
    fn test_empty_month_has_zero_average() {
        let report = report_for_month(&[], march(), &Utc);

        assert_eq!(report.total_revenue, Money::zero());
        assert_eq!(report.total_orders, 0);
        assert_eq!(report.avg_order_value, Money::zero());
        assert!(report.daily_breakdown.is_empty());
        assert!(report.top_items.is_empty());
    }

    #[test]
    fn test_top_items_merge_by_name_and_sort_by_quantity() {
        let orders = vec![
            order(1, at(2026, 3, 1, 9), vec![item("Pasta", 320, 2)]),
            order(2, at(2026, 3, 2, 9), vec![item("Pasta", 320, 1)]),
            order(3, at(2026, 3, 3, 9), vec![item("Fries", 150, 5)]),
        ];

        let report = report_for_month(&orders, march(), &Utc);

        assert_eq!(
            report.top_items,
            vec![
                ItemStat {
                    name: "Fries".to_string(),
                    total_quantity: 5,
                    total_revenue: Money::from_major(750),
                },
                ItemStat {
                    name: "Pasta".to_string(),
                    total_quantity: 3,
                    total_revenue: Money::from_major(960),
                },
            ]
        );
    }

    #[test]
    fn test_top_items_ties_keep_first_seen_order() {
        let orders = vec![order(
            1,
            at(2026, 3, 1, 9),
            vec![item("Tea", 40, 2), item("Coffee", 80, 2), item("Juice", 90, 2)],
        )];

        let report = report_for_month(&orders, march(), &Utc);
        let names: Vec<&str> = report.top_items.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["Tea", "Coffee", "Juice"]);
    }

    #[test]
    fn test_same_name_different_prices_are_merged() {
        let orders = vec![
            order(1, at(2026, 3, 1, 9), vec![item("Tea", 40, 1)]),
            order(2, at(2026, 3, 1, 10), vec![item("Tea", 60, 1)]),
        ];

        let report = report_for_month(&orders, march(), &Utc);
        assert_eq!(report.top_items.len(), 1);
        assert_eq!(report.top_items[0].total_quantity, 2);
        assert_eq!(report.top_items[0].total_revenue, Money::from_major(100));
    }

    #[test]
    fn test_top_items_truncated_to_ten() {
        let items: Vec<OrderItem> = (1..=12).map(|n| item(&format!("Dish {}", n), 10, n)).collect();
        let orders = vec![order(1, at(2026, 3, 1, 9), items)];

        let report = report_for_month(&orders, march(), &Utc);

        assert_eq!(report.top_items.len(), TOP_ITEMS_LIMIT);
        assert_eq!(report.top_items[0].name, "Dish 12");
        assert_eq!(report.top_items[9].name, "Dish 3");
    }

    #[test]
    fn test_daily_breakdown_groups_and_sorts() {
        // Deliberately out of chronological order
        let orders = vec![
            order(1, at(2026, 3, 12, 9), vec![item("A", 70, 1)]),
            order(2, at(2026, 3, 5, 9), vec![item("A", 100, 1)]),
            order(3, at(2026, 3, 5, 18), vec![item("A", 30, 1)]),
        ];

        let report = report_for_month(&orders, march(), &Utc);

        assert_eq!(
            report.daily_breakdown,
            vec![
                DailyStat {
                    date: NaiveDate::from_ymd_opt(2026, 3, 5).unwrap(),
                    revenue: Money::from_major(130),
                    order_count: 2,
                },
                DailyStat {
                    date: NaiveDate::from_ymd_opt(2026, 3, 12).unwrap(),
                    revenue: Money::from_major(70),
                    order_count: 1,
                },
            ]
        );
    }

    #[test]
    fn test_local_time_zone_decides_day_and_month() {
        // 20:00 UTC on 31 March is 01:30 on 1 April in UTC+05:30
        let orders = vec![order(1, at(2026, 3, 31, 20), vec![item("A", 100, 1)])];
        let ist = FixedOffset::east_opt(5 * 3600 + 1800).unwrap();

        assert_eq!(report_for_month(&orders, march(), &Utc).total_orders, 1);
        assert_eq!(report_for_month(&orders, march(), &ist).total_orders, 0);

        let april = report_for_month(&orders, ReportPeriod::new(2026, 4).unwrap(), &ist);
        assert_eq!(april.total_orders, 1);
        assert_eq!(
            april.daily_breakdown[0].date,
            NaiveDate::from_ymd_opt(2026, 4, 1).unwrap()
        );
    }

    #[test]
    fn test_report_is_repeatable() {
        let orders = vec![
            order(1, at(2026, 3, 1, 9), vec![item("Tea", 40, 2), item("Cake", 120, 1)]),
            order(2, at(2026, 3, 9, 9), vec![item("Cake", 120, 3)]),
        ];

        let first = report_for_month(&orders, march(), &Utc);
        let second = report_for_month(&orders, march(), &Utc);
        assert_eq!(first, second);
    }

    #[test]
    fn test_period_parsing() {
        assert_eq!("2026-03".parse::<ReportPeriod>().unwrap(), march());
        assert_eq!("2026-3".parse::<ReportPeriod>().unwrap(), march());
        assert_eq!(march().to_string(), "2026-03");

        assert!("".parse::<ReportPeriod>().is_err());
        assert!("2026".parse::<ReportPeriod>().is_err());
        assert!("2026-00".parse::<ReportPeriod>().is_err());
        assert!("2026-13".parse::<ReportPeriod>().is_err());
        assert!("26-03".parse::<ReportPeriod>().is_err());
        assert!("2026-003".parse::<ReportPeriod>().is_err());
    }

    #[test]
    fn test_period_deserialize_validates_month() {
        let period: ReportPeriod = serde_json::from_str(r#"{"year":2026,"month":3}"#).unwrap();
        assert_eq!(period, march());
        assert_eq!(serde_json::to_string(&period).unwrap(), r#"{"year":2026,"month":3}"#);

        assert!(serde_json::from_str::<ReportPeriod>(r#"{"year":2026,"month":13}"#).is_err());
        assert!(serde_json::from_str::<ReportPeriod>(r#"{"year":2026,"month":0}"#).is_err());
    }
}
