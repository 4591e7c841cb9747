use chrono::Datelike;

use crate::cli::context::{CliContext, CommandError, CommandResult, LoopControl};
use crate::cli::output;
use crate::core::projection::ProjectedBill;
use crate::core::services::PaymentOutcome;
use crate::core::tracker::DASHBOARD_UPCOMING_LIMIT;
use crate::core::MonthTotals;
use crate::domain::{Bill, BillKind, MonthPeriod};

use super::{amount, arg, date, number, rest, CommandDefinition};

const ADD_BILL_USAGE: &str =
    "add-bill <fixed|one-time> <amount> <due-day|YYYY-MM-DD> <category> <description>";
const ADD_INSTALLMENTS_USAGE: &str =
    "add-installments <count> <amount> <due-day> <category> <description>";
const PAY_USAGE: &str = "pay <bill-id>";
const SEARCH_USAGE: &str = "search <query>";

pub(crate) fn definitions() -> Vec<CommandDefinition> {
    vec![
        CommandDefinition::new(
            "add-bill",
            "Create a fixed or one-time bill",
            ADD_BILL_USAGE,
            cmd_add_bill,
        ),
        CommandDefinition::new(
            "add-installments",
            "Create an installment plan, one bill per month",
            ADD_INSTALLMENTS_USAGE,
            cmd_add_installments,
        ),
        CommandDefinition::new(
            "bills",
            "Show the bills of a month with their status",
            "bills [YYYY-MM]",
            cmd_bills,
        ),
        CommandDefinition::new(
            "upcoming",
            "Show unpaid bills of the current month",
            "upcoming",
            cmd_upcoming,
        ),
        CommandDefinition::new("pay", "Pay a bill and record the expense", PAY_USAGE, cmd_pay),
        CommandDefinition::new("search", "Find bills by description", SEARCH_USAGE, cmd_search),
    ]
}

fn cmd_add_bill(context: &mut CliContext, args: &[&str]) -> CommandResult {
    let kind: BillKind = arg(args, 0, ADD_BILL_USAGE)?.parse()?;
    let value = amount(context, arg(args, 1, ADD_BILL_USAGE)?)?;
    let when = arg(args, 2, ADD_BILL_USAGE)?;
    let category = arg(args, 3, ADD_BILL_USAGE)?;
    let description = rest(args, 4, ADD_BILL_USAGE)?;

    let (due_day, due_date) = match kind {
        BillKind::OneTime => {
            let due = date(when)?;
            (due.day() as u8, Some(due))
        }
        _ => (number::<u8>(when, "due day")?, None),
    };
    let bill = context.tracker.bills().create_fixed_or_one_time(
        &description,
        value,
        due_day,
        category,
        kind,
        due_date,
    )?;
    output::success(format!("Created {} bill `{}` ({})", bill.kind(), bill.description, bill.id));
    Ok(LoopControl::Continue)
}

fn cmd_add_installments(context: &mut CliContext, args: &[&str]) -> CommandResult {
    let count: u32 = number(arg(args, 0, ADD_INSTALLMENTS_USAGE)?, "installment count")?;
    let value = amount(context, arg(args, 1, ADD_INSTALLMENTS_USAGE)?)?;
    let due_day: u8 = number(arg(args, 2, ADD_INSTALLMENTS_USAGE)?, "due day")?;
    let category = arg(args, 3, ADD_INSTALLMENTS_USAGE)?;
    let description = rest(args, 4, ADD_INSTALLMENTS_USAGE)?;

    let plan = context
        .tracker
        .bills()
        .create_installment_plan(&description, value, due_day, category, count)?;
    output::success(format!(
        "Created {} installments of {} for `{}`",
        plan.len(),
        output::money(value, &context.locale),
        description.trim()
    ));
    for bill in &plan {
        output::info(format!("  {}  {}", short_id(bill), bill.description));
    }
    Ok(LoopControl::Continue)
}

fn cmd_bills(context: &mut CliContext, args: &[&str]) -> CommandResult {
    let period = match args.first() {
        Some(raw) => raw.parse::<MonthPeriod>()?,
        None => context.tracker.current_period(),
    };
    let bills = context.tracker.bills().list()?;
    let projection = context.tracker.project(&bills, period);
    output::section(format!("Bills for {}", period.label()));
    if projection.is_empty() {
        output::info("No bills this month.");
        return Ok(LoopControl::Continue);
    }
    print_projection(context, &projection);

    let totals = MonthTotals::from_projection(&projection);
    output::info(format!(
        "  Total {}  |  Paid {}  |  Open {}",
        output::money(totals.total, &context.locale),
        output::money(totals.paid, &context.locale),
        output::money(totals.open, &context.locale)
    ));
    Ok(LoopControl::Continue)
}

fn cmd_upcoming(context: &mut CliContext, _args: &[&str]) -> CommandResult {
    let bills = context.tracker.bills().list()?;
    let upcoming = context.tracker.upcoming(&bills, DASHBOARD_UPCOMING_LIMIT);
    output::section("Upcoming bills");
    if upcoming.is_empty() {
        output::info("Nothing left to pay this month.");
    }
    print_projection(context, &upcoming);
    Ok(LoopControl::Continue)
}

fn cmd_pay(context: &mut CliContext, args: &[&str]) -> CommandResult {
    let bill = context.resolve_bill(arg(args, 0, PAY_USAGE)?)?;
    match context.tracker.pay(bill.id)? {
        PaymentOutcome::Paid { bill, transaction } => output::success(format!(
            "Paid `{}`: expense of {} recorded ({})",
            bill.description,
            output::money(transaction.amount, &context.locale),
            transaction.id
        )),
        PaymentOutcome::AlreadyPaid { bill } => {
            output::warning(format!("`{}` is already paid", bill.description))
        }
        PaymentOutcome::UnknownBill { id } => {
            return Err(CommandError::InvalidArguments(format!("no bill with id {id}")))
        }
    }
    Ok(LoopControl::Continue)
}

fn cmd_search(context: &mut CliContext, args: &[&str]) -> CommandResult {
    let query = rest(args, 0, SEARCH_USAGE)?;
    let found = context.tracker.bills().search(&query)?;
    output::section(format!("{} bill(s) matching `{}`", found.len(), query.trim()));
    for bill in &found {
        output::info(format!(
            "  {}  {:<28} {:>14}  day {:>2}  {}  {}",
            short_id(bill),
            bill.description,
            output::money(bill.amount, &context.locale),
            bill.due_day,
            bill.kind(),
            if bill.is_paid { "paid" } else { "open" }
        ));
    }
    Ok(LoopControl::Continue)
}

fn print_projection(context: &CliContext, items: &[ProjectedBill<'_>]) {
    for item in items {
        output::info(format!(
            "  {}  {:<28} {:>14}  {}  {}",
            short_id(item.bill),
            item.bill.description,
            output::money(item.bill.amount, &context.locale),
            item.due_date.format("%d/%m"),
            output::status(&item.status)
        ));
    }
}

fn short_id(bill: &Bill) -> String {
    bill.id.simple().to_string()[..8].to_string()
}
