use std::collections::HashMap;

pub mod bills;
pub mod data;
pub mod ledger;
pub mod system;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::cli::context::{CliContext, CommandError, CommandResult};
use crate::currency::parse_amount;

pub(crate) fn all_definitions() -> Vec<CommandDefinition> {
    let mut commands = Vec::new();
    commands.extend(ledger::definitions());
    commands.extend(bills::definitions());
    commands.extend(data::definitions());
    commands.extend(system::definitions());
    commands
}

pub type CommandHandler = fn(&mut CliContext, &[&str]) -> CommandResult;

#[derive(Clone)]
pub struct CommandDefinition {
    pub name: &'static str,
    pub description: &'static str,
    pub usage: &'static str,
    pub handler: CommandHandler,
}

impl CommandDefinition {
    pub const fn new(
        name: &'static str,
        description: &'static str,
        usage: &'static str,
        handler: CommandHandler,
    ) -> Self {
        Self {
            name,
            description,
            usage,
            handler,
        }
    }
}

pub struct CommandRegistry {
    commands: HashMap<&'static str, CommandDefinition>,
    order: Vec<&'static str>,
}

impl CommandRegistry {
    pub fn new(definitions: Vec<CommandDefinition>) -> Self {
        let mut commands = HashMap::new();
        let mut order = Vec::new();
        for definition in definitions {
            order.push(definition.name);
            commands.insert(definition.name, definition);
        }
        Self { commands, order }
    }

    pub fn get(&self, name: &str) -> Option<&CommandDefinition> {
        self.commands.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &CommandDefinition> {
        self.order
            .iter()
            .filter_map(move |name| self.commands.get(name))
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.order.iter().copied()
    }
}

pub(crate) fn usage_error(usage: &str) -> CommandError {
    CommandError::InvalidArguments(format!("usage: {usage}"))
}

pub(crate) fn arg<'a>(args: &[&'a str], index: usize, usage: &str) -> Result<&'a str, CommandError> {
    args.get(index).copied().ok_or_else(|| usage_error(usage))
}

/// Joins the remaining arguments, so unquoted descriptions keep their spaces.
pub(crate) fn rest(args: &[&str], from: usize, usage: &str) -> Result<String, CommandError> {
    let text = args.get(from..).unwrap_or_default().join(" ");
    if text.trim().is_empty() {
        return Err(usage_error(usage));
    }
    Ok(text)
}

/// Removes `--name value` from `args`, returning the value and the remaining arguments.
pub(crate) fn take_option<'a>(args: &[&'a str], name: &str) -> (Option<&'a str>, Vec<&'a str>) {
    let mut value = None;
    let mut remaining = Vec::with_capacity(args.len());
    let mut iter = args.iter().copied();
    while let Some(item) = iter.next() {
        if item == name && value.is_none() {
            value = iter.next();
        } else {
            remaining.push(item);
        }
    }
    (value, remaining)
}

pub(crate) fn amount(context: &CliContext, raw: &str) -> Result<Decimal, CommandError> {
    Ok(parse_amount(raw, &context.locale)?)
}

pub(crate) fn date(raw: &str) -> Result<NaiveDate, CommandError> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| CommandError::InvalidArguments(format!("`{raw}` is not a date (YYYY-MM-DD)")))
}

pub(crate) fn number<T: std::str::FromStr>(raw: &str, what: &str) -> Result<T, CommandError> {
    raw.parse()
        .map_err(|_| CommandError::InvalidArguments(format!("`{raw}` is not a valid {what}")))
}
