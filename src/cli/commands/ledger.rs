use crate::cli::context::{CliContext, CommandResult, LoopControl};
use crate::cli::output;
use crate::domain::{TransactionFilter, TransactionKind};

use super::{amount, arg, rest, take_option, CommandDefinition};

const ADD_INCOME_USAGE: &str = "add-income <amount> <description> [--category <name>]";
const ADD_EXPENSE_USAGE: &str = "add-expense <amount> <description> [--category <name>]";

pub(crate) fn definitions() -> Vec<CommandDefinition> {
    vec![
        CommandDefinition::new(
            "balance",
            "Show income, expense and net totals",
            "balance",
            cmd_balance,
        ),
        CommandDefinition::new(
            "transactions",
            "List transactions, newest first",
            "transactions [all|income|expense]",
            cmd_transactions,
        ),
        CommandDefinition::new("add-income", "Record income", ADD_INCOME_USAGE, cmd_add_income),
        CommandDefinition::new(
            "add-expense",
            "Record an expense",
            ADD_EXPENSE_USAGE,
            cmd_add_expense,
        ),
    ]
}

fn cmd_balance(context: &mut CliContext, _args: &[&str]) -> CommandResult {
    let balance = context.tracker.balance()?;
    output::section("Balance");
    output::info(format!("  Income : {}", output::money(balance.total_income, &context.locale)));
    output::info(format!("  Expense: {}", output::money(balance.total_expense, &context.locale)));
    output::info(format!("  Net    : {}", output::money(balance.net, &context.locale)));
    Ok(LoopControl::Continue)
}

fn cmd_transactions(context: &mut CliContext, args: &[&str]) -> CommandResult {
    let filter: TransactionFilter = args.first().copied().unwrap_or("all").parse()?;
    let transactions = context.tracker.ledger().list_filtered(filter)?;
    output::section(format!("Transactions ({})", transactions.len()));
    if transactions.is_empty() {
        output::info("No transactions recorded.");
    }
    for txn in &transactions {
        let signed = output::money(txn.signed_amount(), &context.locale);
        let category = txn.category.as_deref().unwrap_or("-");
        output::info(format!(
            "  {}  {:<8} {:<28} {:>16}  {}",
            txn.occurred_at.format("%d/%m/%Y"),
            txn.kind,
            txn.description,
            signed,
            category
        ));
    }
    Ok(LoopControl::Continue)
}

fn cmd_add_income(context: &mut CliContext, args: &[&str]) -> CommandResult {
    record(context, args, TransactionKind::Income, ADD_INCOME_USAGE)
}

fn cmd_add_expense(context: &mut CliContext, args: &[&str]) -> CommandResult {
    record(context, args, TransactionKind::Expense, ADD_EXPENSE_USAGE)
}

fn record(
    context: &mut CliContext,
    args: &[&str],
    kind: TransactionKind,
    usage: &str,
) -> CommandResult {
    let (category, args) = take_option(args, "--category");
    let value = amount(context, arg(&args, 0, usage)?)?;
    let description = rest(&args, 1, usage)?;
    let txn = context
        .tracker
        .ledger()
        .record(&description, value, kind, category)?;
    output::success(format!(
        "Recorded {} `{}` of {} ({})",
        txn.kind,
        txn.description,
        output::money(txn.amount, &context.locale),
        txn.id
    ));
    Ok(LoopControl::Continue)
}
