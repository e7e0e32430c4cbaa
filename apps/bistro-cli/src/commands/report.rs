//! # Report Command
//!
//! `bistro report 2026-03` prints the monthly sales report: headline
//! totals, one row per day with orders, and the best sellers by quantity.
//! Days are calendar days in the terminal's configured zone.

use bistro_core::{ReportPeriod, SalesReport};
use bistro_db::{KeyValueStore, Session};

use super::{at_most, Terminal};
use crate::error::{AppError, AppResult};

pub(super) fn parse(rest: &[&str]) -> AppResult<ReportPeriod> {
    at_most("report", rest, 1)?;
    let raw = rest
        .first()
        .ok_or_else(|| AppError::usage("Select a month first (report YYYY-MM)"))?;

    raw.parse::<ReportPeriod>()
        .map_err(|e| AppError::usage(e.to_string()))
}

pub(super) async fn run<S>(
    session: &Session<S>,
    period: ReportPeriod,
    terminal: &Terminal,
) -> AppResult<String>
where
    S: KeyValueStore + Clone,
{
    let report = terminal.report(session, period).await?;
    Ok(render(&report, terminal))
}

pub fn render(report: &SalesReport, terminal: &Terminal) -> String {
    let mut out = vec![format!("Sales report for {}", report.period)];

    if report.is_empty() {
        out.push("No orders in this month".to_string());
        return out.join("\n");
    }

    out.push(format!("Total revenue:        {}", terminal.money(report.total_revenue)));
    out.push(format!("Total orders:         {}", report.total_orders));
    out.push(format!("Average order value:  {}", terminal.money(report.avg_order_value)));

    out.push(String::new());
    out.push("Daily breakdown".to_string());
    for day in &report.daily_breakdown {
        out.push(format!(
            "  {}  {:>4} order(s)  {:>9}",
            day.date.format("%Y-%m-%d"),
            day.order_count,
            terminal.money(day.revenue)
        ));
    }

    out.push(String::new());
    out.push("Top items".to_string());
    let name_width = report
        .top_items
        .iter()
        .map(|item| item.name.chars().count())
        .max()
        .unwrap_or(0);
    for (rank, item) in report.top_items.iter().enumerate() {
        out.push(format!(
            "  {:>2}. {:<width$}  x{:<5} {:>9}",
            rank + 1,
            item.name,
            item.total_quantity,
            terminal.money(item.total_revenue),
            width = name_width
        ));
    }

    out.join("\n")
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::{execute, parse as parse_args, Command};
    use crate::config::DisplayZone;
    use bistro_core::Money;
    use bistro_db::{MemoryStore, SessionOptions};
    use chrono::{FixedOffset, TimeZone, Utc};

    fn args(line: &str) -> Vec<String> {
        line.split_whitespace().map(String::from).collect()
    }

    fn ist_terminal() -> Terminal {
        Terminal::new("₹", DisplayZone::Fixed(FixedOffset::east_opt(330 * 60).unwrap()))
    }

    #[test]
    fn test_parse_report_month() {
        assert_eq!(
            parse_args(&args("report 2026-3")).unwrap().command,
            Command::Report(ReportPeriod::new(2026, 3).unwrap())
        );
        assert!(matches!(parse_args(&args("report")), Err(AppError::Usage(_))));
        assert!(matches!(
            parse_args(&args("report 2026-13")),
            Err(AppError::Usage(_))
        ));
        assert!(matches!(
            parse_args(&args("report March")),
            Err(AppError::Usage(_))
        ));
    }

    #[tokio::test]
    async fn test_report_uses_terminal_zone() {
        let options = SessionOptions {
            seed_default_menu: false,
        };
        let mut session = Session::open(MemoryStore::new(), options).await.unwrap();
        let tea = session
            .add_menu_item("Tea", Money::from_major(20), "tea.jpg")
            .await
            .unwrap();
        let samosa = session
            .add_menu_item("Samosa", Money::from_major(15), "samosa.jpg")
            .await
            .unwrap();

        // 20:00 UTC on 31 March is 1 April in India
        session.add_item(&tea.id).await.unwrap();
        session
            .checkout_at(Utc.with_ymd_and_hms(2026, 3, 31, 20, 0, 0).unwrap())
            .await
            .unwrap();

        session.add_item(&samosa.id).await.unwrap();
        session.change_quantity(&samosa.id, 1).await.unwrap();
        session
            .checkout_at(Utc.with_ymd_and_hms(2026, 4, 2, 6, 0, 0).unwrap())
            .await
            .unwrap();

        let command = Command::Report(ReportPeriod::new(2026, 4).unwrap());
        let out = execute(&mut session, &command, &ist_terminal(), &false)
            .await
            .unwrap();

        assert!(out.starts_with("Sales report for 2026-04"));
        assert!(out.contains("Total revenue:        ₹50"));
        assert!(out.contains("Total orders:         2"));
        assert!(out.contains("Average order value:  ₹25"));
        assert!(out.contains("2026-04-01"));
        assert!(out.contains("2026-04-02"));
        // Samosa sold two units, Tea one
        let samosa_at = out.find("1. Samosa").unwrap();
        let tea_at = out.find("2. Tea").unwrap();
        assert!(samosa_at < tea_at);

        let march = Command::Report(ReportPeriod::new(2026, 3).unwrap());
        let out = execute(&mut session, &march, &ist_terminal(), &false)
            .await
            .unwrap();
        assert!(out.contains("No orders in this month"));
    }
}
