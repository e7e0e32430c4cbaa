//! # Commands Module
//!
//! Every operation the counter terminal exposes, one command per run.
//!
//! ## Command Organization
//! ```text
//! commands/
//! ├── mod.rs      ◄─── You are here (parsing, dispatch, terminal settings)
//! ├── menu.rs     ◄─── Menu listing and editing
//! ├── cart.rs     ◄─── Cart manipulation, clear confirmation
//! ├── order.rs    ◄─── Checkout (pay now / print bill), order history
//! └── report.rs   ◄─── Monthly sales report
//! ```
//!
//! ## How Commands Work
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Command Flow                                         │
//! │                                                                         │
//! │  $ bistro cart add 3                                                   │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  parse(args) ──► Invocation { options, command: Cart(Add("3")) }       │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  execute(&mut session, &command, &terminal, &confirm)                  │
//! │         │   "3" resolves to the third menu item's id                   │
//! │         ▼                                                               │
//! │  Session::add_item(id) ──► cart persisted ──► CartUpdated              │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  String rendered for stdout                                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Items are addressed either by id or by their 1-based position in the
//! listing the operator was shown (`bistro menu`, `bistro cart`).

pub mod cart;
pub mod menu;
pub mod order;
pub mod report;

use std::path::PathBuf;

use bistro_core::display::{payment_summary, Receipt};
use bistro_core::{Confirm, Order, ReportPeriod, SalesReport};
use bistro_db::{KeyValueStore, Session};
use chrono::Local;
use tracing::debug;

use crate::config::DisplayZone;
use crate::error::{AppError, AppResult};

pub use cart::{CartCommand, StdinConfirm};
pub use menu::MenuCommand;

/// Printed by `bistro --help`.
pub const USAGE: &str = "\
Usage: bistro [OPTIONS] <COMMAND>

Commands:
  menu                               List the menu
  menu add <NAME> <PRICE> <IMAGE>    Add a menu item
  menu update <ITEM> <NAME> <PRICE> <IMAGE>
                                     Edit a menu item
  menu remove <ITEM>                 Remove a menu item
  cart                               Show the cart
  cart add <ITEM>                    Add one unit of a menu item
  cart remove <LINE>                 Remove a cart line
  cart qty <LINE> <DELTA>            Change a line's quantity (e.g. +1, -1)
  cart clear [--yes]                 Empty the cart
  checkout                           Pay now: record the order, show the payment summary
  bill                               Print bill: record the order, print the receipt
  orders                             List recorded orders
  report <YYYY-MM>                   Monthly sales report

Options:
  -c, --config <PATH>   Config file (default: platform config dir)
  -m, --memory          Keep everything in memory for this run
  -h, --help            Show this help

<ITEM> is a menu item id or its number in `bistro menu`.
<LINE> is an item id or its number in `bistro cart`.";

// =============================================================================
// Parsed Command Line
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Menu(MenuCommand),
    Cart(CartCommand),
    /// "Pay now"
    Checkout,
    /// "Print bill"
    Bill,
    Orders,
    Report(ReportPeriod),
    Help,
}

/// Options that apply to every command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GlobalOptions {
    pub config: Option<PathBuf>,
    pub in_memory: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub options: GlobalOptions,
    pub command: Command,
}

/// Parses the arguments after the program name.
///
/// Global options may appear anywhere; everything else is positional.
pub fn parse(args: &[String]) -> AppResult<Invocation> {
    let mut options = GlobalOptions::default();
    let mut words: Vec<&str> = Vec::new();
    let mut help = false;

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "-c" | "--config" => {
                let path = iter
                    .next()
                    .ok_or_else(|| AppError::usage("--config needs a path"))?;
                options.config = Some(PathBuf::from(path));
            }
            "-m" | "--memory" => options.in_memory = true,
            "-h" | "--help" => help = true,
            other => words.push(other),
        }
    }

    if help {
        return Ok(Invocation {
            options,
            command: Command::Help,
        });
    }

    let (name, rest) = match words.split_first() {
        Some((name, rest)) => (*name, rest),
        None => return Err(AppError::usage("No command given")),
    };

    let command = match name {
        "menu" => Command::Menu(menu::parse(rest)?),
        "cart" => Command::Cart(cart::parse(rest)?),
        "checkout" | "pay" => no_arguments(name, rest, Command::Checkout)?,
        "bill" => no_arguments(name, rest, Command::Bill)?,
        "orders" => no_arguments(name, rest, Command::Orders)?,
        "report" => Command::Report(report::parse(rest)?),
        "help" => Command::Help,
        other => return Err(AppError::usage(format!("Unknown command '{}'", other))),
    };

    Ok(Invocation { options, command })
}

fn no_arguments(name: &str, rest: &[&str], command: Command) -> AppResult<Command> {
    match rest.first() {
        None => Ok(command),
        Some(extra) => Err(AppError::usage(format!(
            "'{}' takes no arguments, got '{}'",
            name, extra
        ))),
    }
}

/// The `index`th positional argument, or a usage error naming `what`.
fn required<'a>(rest: &[&'a str], index: usize, what: &str) -> AppResult<&'a str> {
    rest.get(index)
        .copied()
        .ok_or_else(|| AppError::usage(format!("Missing {}", what)))
}

fn at_most(command: &str, rest: &[&str], count: usize) -> AppResult<()> {
    match rest.get(count) {
        None => Ok(()),
        Some(extra) => Err(AppError::usage(format!(
            "Unexpected argument '{}' for '{}'",
            extra, command
        ))),
    }
}

/// Resolves an operator token against a listing: an exact id, or a
/// 1-based position in `ids`. Unknown tokens are returned unchanged so
/// the session can treat them as a no-op.
fn resolve_id<'a, I>(ids: I, token: &str) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let ids: Vec<&str> = ids.into_iter().collect();
    if ids.contains(&token) {
        return token.to_string();
    }
    match token.parse::<usize>() {
        Ok(position) if position >= 1 && position <= ids.len() => {
            ids[position - 1].to_string()
        }
        _ => token.to_string(),
    }
}

// =============================================================================
// Terminal Settings
// =============================================================================

/// How amounts and times are shown on this terminal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Terminal {
    pub currency_symbol: String,
    pub zone: DisplayZone,
}

impl Terminal {
    pub fn new(currency_symbol: impl Into<String>, zone: DisplayZone) -> Self {
        Terminal {
            currency_symbol: currency_symbol.into(),
            zone,
        }
    }

    pub fn money(&self, amount: bistro_core::Money) -> String {
        bistro_core::display::format_currency(amount, &self.currency_symbol)
    }

    /// The payment QR text for an order.
    pub fn payment_summary(&self, order: &Order) -> String {
        match self.zone {
            DisplayZone::Local => payment_summary(order, &Local, &self.currency_symbol),
            DisplayZone::Fixed(offset) => payment_summary(order, &offset, &self.currency_symbol),
        }
    }

    pub fn receipt(&self, order: &Order) -> Receipt {
        match self.zone {
            DisplayZone::Local => Receipt::from_order(order, &Local),
            DisplayZone::Fixed(offset) => Receipt::from_order(order, &offset),
        }
    }

    /// The order's timestamp in the terminal's zone.
    pub fn placed_at(&self, order: &Order) -> String {
        use bistro_core::display::DATE_TIME_FORMAT;
        match self.zone {
            DisplayZone::Local => order.placed_at_in(&Local).format(DATE_TIME_FORMAT).to_string(),
            DisplayZone::Fixed(offset) => {
                order.placed_at_in(&offset).format(DATE_TIME_FORMAT).to_string()
            }
        }
    }

    /// Builds the report with days taken in the terminal's zone.
    pub async fn report<S>(
        &self,
        session: &Session<S>,
        period: ReportPeriod,
    ) -> AppResult<SalesReport>
    where
        S: KeyValueStore + Clone,
    {
        let report = match self.zone {
            DisplayZone::Local => session.report(period, &Local).await?,
            DisplayZone::Fixed(offset) => session.report(period, &offset).await?,
        };
        Ok(report)
    }
}

// =============================================================================
// Dispatch
// =============================================================================

/// Runs one command against the session and returns what to print.
///
/// `confirm` answers the clear-cart prompt unless `--yes` was given.
pub async fn execute<S>(
    session: &mut Session<S>,
    command: &Command,
    terminal: &Terminal,
    confirm: &dyn Confirm,
) -> AppResult<String>
where
    S: KeyValueStore + Clone,
{
    debug!(?command, "Executing command");

    match command {
        Command::Menu(cmd) => menu::run(session, cmd, terminal).await,
        Command::Cart(cmd) => cart::run(session, cmd, terminal, confirm).await,
        Command::Checkout => order::pay_now(session, terminal).await,
        Command::Bill => order::print_bill(session, terminal).await,
        Command::Orders => order::list(session, terminal).await,
        Command::Report(period) => report::run(session, *period, terminal).await,
        Command::Help => Ok(USAGE.to_string()),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn args(line: &str) -> Vec<String> {
        line.split_whitespace().map(String::from).collect()
    }

    #[test]
    fn test_parse_global_options_anywhere() {
        let invocation = parse(&args("cart --memory add 3 -c /tmp/b.toml")).unwrap();
        assert!(invocation.options.in_memory);
        assert_eq!(invocation.options.config, Some(PathBuf::from("/tmp/b.toml")));
        assert_eq!(
            invocation.command,
            Command::Cart(CartCommand::Add("3".to_string()))
        );
    }

    #[test]
    fn test_parse_help_wins() {
        let invocation = parse(&args("report nonsense --help")).unwrap();
        assert_eq!(invocation.command, Command::Help);
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(parse(&[]), Err(AppError::Usage(_))));
        assert!(matches!(parse(&args("dance")), Err(AppError::Usage(_))));
        assert!(matches!(parse(&args("checkout now")), Err(AppError::Usage(_))));
        assert!(matches!(parse(&args("--config")), Err(AppError::Usage(_))));
    }

    #[test]
    fn test_parse_simple_commands() {
        assert_eq!(parse(&args("checkout")).unwrap().command, Command::Checkout);
        assert_eq!(parse(&args("pay")).unwrap().command, Command::Checkout);
        assert_eq!(parse(&args("bill")).unwrap().command, Command::Bill);
        assert_eq!(parse(&args("orders")).unwrap().command, Command::Orders);
    }

    #[test]
    fn test_resolve_id() {
        let ids = ["a1", "b2", "c3"];
        assert_eq!(resolve_id(ids, "b2"), "b2");
        assert_eq!(resolve_id(ids, "1"), "a1");
        assert_eq!(resolve_id(ids, "3"), "c3");
        // Out of range or unknown tokens pass through
        assert_eq!(resolve_id(ids, "0"), "0");
        assert_eq!(resolve_id(ids, "4"), "4");
        assert_eq!(resolve_id(ids, "zz"), "zz");
    }
}
