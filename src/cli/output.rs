use colored::Colorize;
use rust_decimal::Decimal;
use std::fmt;

use crate::core::projection::{DueStatus, Urgency};
use crate::currency::{format_currency, LocaleConfig};

/// Message categories used by the CLI output helpers.
#[derive(Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Info,
    Success,
    Warning,
    Error,
    Section,
}

fn apply_style(kind: MessageKind, message: impl fmt::Display) -> String {
    let text = message.to_string();
    match kind {
        MessageKind::Section => format!("=== {} ===", text.trim()).bold().to_string(),
        MessageKind::Success => format!("[✓] {text}").bright_green().to_string(),
        MessageKind::Warning => format!("[!] {text}").bright_yellow().to_string(),
        MessageKind::Error => format!("[x] {text}").bright_red().to_string(),
        MessageKind::Info => text,
    }
}

pub fn print(kind: MessageKind, message: impl fmt::Display) {
    let formatted = apply_style(kind, message);
    match kind {
        MessageKind::Section => println!("\n{formatted}"),
        MessageKind::Error => eprintln!("{formatted}"),
        _ => println!("{formatted}"),
    }
}

pub fn info(message: impl fmt::Display) {
    print(MessageKind::Info, message);
}

pub fn success(message: impl fmt::Display) {
    print(MessageKind::Success, message);
}

pub fn warning(message: impl fmt::Display) {
    print(MessageKind::Warning, message);
}

pub fn error(message: impl fmt::Display) {
    print(MessageKind::Error, message);
}

pub fn section(title: impl fmt::Display) {
    print(MessageKind::Section, title);
}

/// Status label coloured by urgency: paid green, due today or overdue red,
/// urgent yellow, the rest dimmed.
pub fn status(status: &DueStatus) -> String {
    let label = status.label();
    match status.urgency() {
        Urgency::Settled => label.green().to_string(),
        Urgency::Critical => label.red().bold().to_string(),
        Urgency::Warning => label.yellow().to_string(),
        Urgency::Normal | Urgency::Neutral => label.dimmed().to_string(),
    }
}

/// Currency amount, red when negative.
pub fn money(amount: Decimal, locale: &LocaleConfig) -> String {
    let text = format_currency(amount, locale);
    if amount.is_sign_negative() && !amount.is_zero() {
        text.red().to_string()
    } else {
        text
    }
}
