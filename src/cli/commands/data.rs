use std::path::{Path, PathBuf};

use crate::backup::read_from_path;
use crate::cli::context::{CliContext, CommandError, CommandResult, LoopControl};
use crate::cli::output;
use crate::utils::paths::exports_dir_in;

use super::{arg, CommandDefinition};

const RESTORE_USAGE: &str = "restore <backup-name|path>";

pub(crate) fn definitions() -> Vec<CommandDefinition> {
    vec![
        CommandDefinition::new(
            "backup",
            "Write a snapshot of all data",
            "backup [note]",
            cmd_backup,
        ),
        CommandDefinition::new("backups", "List snapshots, newest first", "backups", cmd_backups),
        CommandDefinition::new(
            "restore",
            "Replace all data with a snapshot",
            RESTORE_USAGE,
            cmd_restore,
        ),
        CommandDefinition::new(
            "export-csv",
            "Export transactions and bills as CSV",
            "export-csv [dir]",
            cmd_export_csv,
        ),
        CommandDefinition::new(
            "clear",
            "Delete every transaction and bill",
            "clear --yes",
            cmd_clear,
        ),
    ]
}

fn cmd_backup(context: &mut CliContext, args: &[&str]) -> CommandResult {
    let note = (!args.is_empty()).then(|| args.join(" "));
    let document = context.tracker.export_backup()?;
    let name = context.backups.create(&document, note.as_deref())?;
    output::success(format!(
        "Backup `{}` written ({} transactions, {} bills)",
        name,
        document.transactions.len(),
        document.bills.len()
    ));
    Ok(LoopControl::Continue)
}

fn cmd_backups(context: &mut CliContext, _args: &[&str]) -> CommandResult {
    let names = context.backups.list()?;
    output::section(format!("Backups in {}", context.backups.dir().display()));
    if names.is_empty() {
        output::info("No backups found.");
    }
    for (index, name) in names.iter().enumerate() {
        output::info(format!("  {:>2}. {}", index + 1, name));
    }
    Ok(LoopControl::Continue)
}

fn cmd_restore(context: &mut CliContext, args: &[&str]) -> CommandResult {
    let target = arg(args, 0, RESTORE_USAGE)?;
    let path = Path::new(target);
    let document = if path.is_file() {
        read_from_path(path)?
    } else {
        context.backups.load(target)?
    };
    let report = context.tracker.import_backup(&document)?;
    output::success(format!(
        "Restored {} transactions and {} bills exported on {}",
        document.transactions.len(),
        document.bills.len(),
        document.export_date.format("%d/%m/%Y %H:%M")
    ));
    for warning in &report.warnings {
        output::warning(warning);
    }
    Ok(LoopControl::Continue)
}

fn cmd_export_csv(context: &mut CliContext, args: &[&str]) -> CommandResult {
    let dir = args
        .first()
        .map(PathBuf::from)
        .unwrap_or_else(|| exports_dir_in(context.config_manager.base_dir()));
    let files = context
        .tracker
        .export_csv()?
        .write_csv_files(&dir, context.tracker.today())?;
    output::success("CSV files exported");
    output::info(format!("  {}", files.transactions.display()));
    output::info(format!("  {}", files.bills.display()));
    Ok(LoopControl::Continue)
}

fn cmd_clear(context: &mut CliContext, args: &[&str]) -> CommandResult {
    if !args.contains(&"--yes") {
        return Err(CommandError::InvalidArguments(
            "refusing to delete all data without `--yes`".into(),
        ));
    }
    context.tracker.clear_all()?;
    output::success("All transactions and bills deleted");
    Ok(LoopControl::Continue)
}
