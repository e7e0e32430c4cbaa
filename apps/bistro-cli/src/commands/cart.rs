//! # Cart Commands
//!
//! Cart manipulation from the counter.
//!
//! ## Cart Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Lifecycle                                       │
//! │                                                                         │
//! │  ┌──────────┐     ┌──────────┐     ┌──────────────────────┐            │
//! │  │  Empty   │────►│ In Cart  │────►│ checkout / bill      │            │
//! │  │  Cart    │     │          │     │ (order.rs)           │            │
//! │  └──────────┘     └──────────┘     └──────────────────────┘            │
//! │       ▲                │                      │                        │
//! │       │           cart add                    │                        │
//! │       │           cart qty                    │                        │
//! │       │           cart remove                 │                        │
//! │       │                │                      │                        │
//! │       │                ▼                      │                        │
//! │       └───────── cart clear ◄─────────────────┘                        │
//! │                  (asks first)          (cart emptied on success)       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The cart is kept between runs, so `bistro cart add` on Monday and
//! `bistro checkout` on Tuesday bill the same cart.

use std::io::{self, BufRead, Write};

use bistro_core::menu::Catalog;
use bistro_core::{Cart, Confirm};
use bistro_db::{KeyValueStore, Session};

use super::{at_most, required, resolve_id, Terminal};
use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CartCommand {
    Show,
    /// Menu item id or listing number.
    Add(String),
    /// Cart line id or listing number.
    Remove(String),
    Quantity { line: String, delta: i64 },
    Clear { yes: bool },
}

pub(super) fn parse(rest: &[&str]) -> AppResult<CartCommand> {
    let Some((sub, rest)) = rest.split_first() else {
        return Ok(CartCommand::Show);
    };

    match *sub {
        "show" => {
            at_most("cart show", rest, 0)?;
            Ok(CartCommand::Show)
        }
        "add" => {
            at_most("cart add", rest, 1)?;
            Ok(CartCommand::Add(required(rest, 0, "menu item")?.to_string()))
        }
        "remove" | "rm" => {
            at_most("cart remove", rest, 1)?;
            Ok(CartCommand::Remove(required(rest, 0, "cart line")?.to_string()))
        }
        "qty" | "quantity" => {
            at_most("cart qty", rest, 2)?;
            let line = required(rest, 0, "cart line")?.to_string();
            let raw = required(rest, 1, "quantity change")?;
            let delta = raw.parse::<i64>().map_err(|_| {
                AppError::usage(format!("Quantity change must be a whole number, got '{}'", raw))
            })?;
            Ok(CartCommand::Quantity { line, delta })
        }
        "clear" => {
            let yes = match rest {
                [] => false,
                ["--yes"] | ["-y"] => true,
                [extra, ..] => {
                    return Err(AppError::usage(format!(
                        "Unexpected argument '{}' for 'cart clear'",
                        extra
                    )))
                }
            };
            Ok(CartCommand::Clear { yes })
        }
        other => Err(AppError::usage(format!("Unknown cart command '{}'", other))),
    }
}

pub(super) async fn run<S>(
    session: &mut Session<S>,
    command: &CartCommand,
    terminal: &Terminal,
    confirm: &dyn Confirm,
) -> AppResult<String>
where
    S: KeyValueStore + Clone,
{
    match command {
        CartCommand::Show => {}
        CartCommand::Add(item) => {
            let id = resolve_id(session.menu().list().iter().map(|i| i.id.as_str()), item);
            if !session.add_item(&id).await? {
                return Ok(format!("No menu item '{}'", item));
            }
        }
        CartCommand::Remove(line) => {
            let id = cart_line_id(session.cart(), line);
            if !session.remove_item(&id).await? {
                return Ok(format!("No cart line '{}'", line));
            }
        }
        CartCommand::Quantity { line, delta } => {
            let id = cart_line_id(session.cart(), line);
            if !session.change_quantity(&id, *delta).await? {
                return Ok(format!("No cart line '{}'", line));
            }
        }
        CartCommand::Clear { yes } => {
            if session.cart().is_empty() {
                return Ok(render(session.cart(), terminal));
            }
            let cleared = if *yes {
                session.clear_cart(&true).await?
            } else {
                session.clear_cart(confirm).await?
            };
            if !cleared {
                return Ok("Cart kept.".to_string());
            }
        }
    }

    Ok(render(session.cart(), terminal))
}

fn cart_line_id(cart: &Cart, token: &str) -> String {
    resolve_id(cart.lines().iter().map(|line| line.item_id.as_str()), token)
}

/// The numbered cart listing with its header totals.
pub fn render(cart: &Cart, terminal: &Terminal) -> String {
    if cart.is_empty() {
        return "Your cart is empty".to_string();
    }

    let name_width = cart
        .lines()
        .iter()
        .map(|line| line.name.chars().count())
        .max()
        .unwrap_or(0);

    let mut out: Vec<String> = cart
        .lines()
        .iter()
        .enumerate()
        .map(|(index, line)| {
            format!(
                "{:>3}. {:<width$}  x{:<3} @ {:>7}  {:>8}",
                index + 1,
                line.name,
                line.quantity,
                terminal.money(line.price),
                terminal.money(line.line_total()),
                width = name_width
            )
        })
        .collect();

    out.push(format!(
        "{} item(s), {} unit(s). Total: {}",
        cart.item_count(),
        cart.total_quantity(),
        terminal.money(cart.total())
    ));
    out.join("\n")
}

// =============================================================================
// Interactive Confirmation
// =============================================================================

/// Asks the operator on the terminal. Anything but "y"/"yes" declines.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdinConfirm;

impl Confirm for StdinConfirm {
    fn confirm(&self, prompt: &str) -> bool {
        let mut stderr = io::stderr();
        if write!(stderr, "{} [y/N] ", prompt).and_then(|_| stderr.flush()).is_err() {
            return false;
        }

        let mut answer = String::new();
        match io::stdin().lock().read_line(&mut answer) {
            Ok(_) => matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"),
            Err(_) => false,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
