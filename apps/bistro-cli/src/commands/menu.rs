//! # Menu Commands
//!
//! Listing and editing the menu. Edits never touch carts or recorded
//! orders; those keep the values captured when the item was added.

use bistro_core::menu::Catalog;
use bistro_core::validation::parse_price;
use bistro_core::{Menu, Money};
use bistro_db::{KeyValueStore, Session};

use super::{at_most, required, resolve_id, Terminal};
use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuCommand {
    List,
    Add {
        name: String,
        price: Money,
        image: String,
    },
    Update {
        item: String,
        name: String,
        price: Money,
        image: String,
    },
    Remove(String),
}

pub(super) fn parse(rest: &[&str]) -> AppResult<MenuCommand> {
    let Some((sub, rest)) = rest.split_first() else {
        return Ok(MenuCommand::List);
    };

    match *sub {
        "list" => {
            at_most("menu list", rest, 0)?;
            Ok(MenuCommand::List)
        }
        "add" => {
            at_most("menu add", rest, 3)?;
            Ok(MenuCommand::Add {
                name: required(rest, 0, "item name")?.to_string(),
                price: parse_price(required(rest, 1, "price")?)?,
                image: required(rest, 2, "image")?.to_string(),
            })
        }
        "update" | "edit" => {
            at_most("menu update", rest, 4)?;
            Ok(MenuCommand::Update {
                item: required(rest, 0, "menu item")?.to_string(),
                name: required(rest, 1, "item name")?.to_string(),
                price: parse_price(required(rest, 2, "price")?)?,
                image: required(rest, 3, "image")?.to_string(),
            })
        }
        "remove" | "rm" => {
            at_most("menu remove", rest, 1)?;
            Ok(MenuCommand::Remove(required(rest, 0, "menu item")?.to_string()))
        }
        other => Err(AppError::usage(format!("Unknown menu command '{}'", other))),
    }
}

pub(super) async fn run<S>(
    session: &mut Session<S>,
    command: &MenuCommand,
    terminal: &Terminal,
) -> AppResult<String>
where
    S: KeyValueStore + Clone,
{
    match command {
        MenuCommand::List => Ok(render(session.menu(), terminal)),
        MenuCommand::Add { name, price, image } => {
            let item = session.add_menu_item(name, *price, image).await?;
            Ok(format!(
                "Added {} ({}) as {}",
                item.name,
                terminal.money(item.price),
                item.id
            ))
        }
        MenuCommand::Update {
            item,
            name,
            price,
            image,
        } => {
            let id = menu_item_id(session.menu(), item);
            let item = session.update_menu_item(&id, name, *price, image).await?;
            Ok(format!(
                "Updated {}: {} ({})",
                item.id,
                item.name,
                terminal.money(item.price)
            ))
        }
        MenuCommand::Remove(item) => {
            let id = menu_item_id(session.menu(), item);
            if session.remove_menu_item(&id).await? {
                Ok(format!("Removed {}", id))
            } else {
                Ok(format!("No menu item '{}'", item))
            }
        }
    }
}

fn menu_item_id(menu: &Menu, token: &str) -> String {
    resolve_id(menu.list().iter().map(|item| item.id.as_str()), token)
}

/// The numbered menu listing.
pub fn render(menu: &Menu, terminal: &Terminal) -> String {
    if menu.is_empty() {
        return "The menu is empty. Add items with 'bistro menu add'.".to_string();
    }

    let name_width = menu
        .list()
        .iter()
        .map(|item| item.name.chars().count())
        .max()
        .unwrap_or(0);

    menu.list()
        .iter()
        .enumerate()
        .map(|(index, item)| {
            format!(
                "{:>3}. {:<width$}  {:>8}  {}",
                index + 1,
                item.name,
                terminal.money(item.price),
                item.id,
                width = name_width
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::{execute, parse as parse_args, Command};
    use crate::config::DisplayZone;
    use bistro_core::CoreError;
    use bistro_db::{MemoryStore, SessionError, SessionOptions};

    fn terminal() -> Terminal {
        Terminal::new("₹", DisplayZone::Local)
    }

    fn args(line: &str) -> Vec<String> {
        line.split_whitespace().map(String::from).collect()
    }

    async fn empty_session() -> Session<MemoryStore> {
        let options = SessionOptions {
            seed_default_menu: false,
        };
        Session::open(MemoryStore::new(), options).await.unwrap()
    }

    async fn run_line(session: &mut Session<MemoryStore>, line: &str) -> AppResult<String> {
        let invocation = parse_args(&args(line))?;
        execute(session, &invocation.command, &terminal(), &false).await
    }

    #[test]
    fn test_parse_menu_commands() {
        assert_eq!(
            parse_args(&args("menu")).unwrap().command,
            Command::Menu(MenuCommand::List)
        );
        assert_eq!(
            parse_args(&args("menu add Tea 20.5 tea.jpg")).unwrap().command,
            Command::Menu(MenuCommand::Add {
                name: "Tea".to_string(),
                price: Money::from_minor(2050),
                image: "tea.jpg".to_string(),
            })
        );
        assert!(parse_args(&args("menu add Tea abc tea.jpg")).is_err());
        assert!(parse_args(&args("menu add Tea 20")).is_err());
        assert!(parse_args(&args("menu remove")).is_err());
    }

    #[tokio::test]
    async fn test_add_list_update_remove() {
        let mut session = empty_session().await;

        let out = run_line(&mut session, "menu").await.unwrap();
        assert!(out.contains("The menu is empty"));

        run_line(&mut session, "menu add Tea 20 tea.jpg").await.unwrap();
        run_line(&mut session, "menu add Coffee 45 coffee.jpg").await.unwrap();

        let listing = run_line(&mut session, "menu list").await.unwrap();
        let lines: Vec<&str> = listing.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("1. Tea"));
        assert!(lines[0].contains("₹20"));
        assert!(lines[1].contains("2. Coffee"));

        run_line(&mut session, "menu update 2 Espresso 60 espresso.jpg")
            .await
            .unwrap();
        assert_eq!(session.menu().list()[1].name, "Espresso");
        assert_eq!(session.menu().list()[1].price, Money::from_major(60));

        let out = run_line(&mut session, "menu remove 1").await.unwrap();
        assert!(out.starts_with("Removed"));
        assert_eq!(session.menu().len(), 1);

        let out = run_line(&mut session, "menu remove 9").await.unwrap();
        assert_eq!(out, "No menu item '9'");
    }

    #[tokio::test]
    async fn test_update_unknown_item_fails() {
        let mut session = empty_session().await;
        let err = run_line(&mut session, "menu update nope Tea 20 tea.jpg")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AppError::Session(SessionError::Core(CoreError::MenuItemNotFound(_)))
        ));
    }
}
