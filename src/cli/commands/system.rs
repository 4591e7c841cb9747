use crate::cli::context::{CliContext, CommandError, CommandResult, LoopControl};
use crate::cli::output;
use crate::core::Theme;
use crate::domain::category::{categories_of, CategoryKind};
use crate::storage::json_backend::STORE_SCHEMA_VERSION;
use crate::backup::BACKUP_VERSION;
use crate::utils::build_info;

use super::CommandDefinition;

pub(crate) fn definitions() -> Vec<CommandDefinition> {
    vec![
        CommandDefinition::new(
            "categories",
            "List the suggested categories",
            "categories",
            cmd_categories,
        ),
        CommandDefinition::new(
            "theme",
            "Show, set or toggle the theme",
            "theme [dark|light|toggle]",
            cmd_theme,
        ),
        CommandDefinition::new("version", "Show build metadata", "version", cmd_version),
        CommandDefinition::new("help", "Show available commands", "help [command]", cmd_help),
        CommandDefinition::new("exit", "Stop reading commands", "exit", cmd_exit),
    ]
}

fn cmd_categories(_context: &mut CliContext, _args: &[&str]) -> CommandResult {
    for (title, kind) in [
        ("Bill categories", CategoryKind::Bill),
        ("Income categories", CategoryKind::Income),
        ("Expense categories", CategoryKind::Expense),
    ] {
        output::section(title);
        for name in categories_of(kind) {
            output::info(format!("  {name}"));
        }
    }
    Ok(LoopControl::Continue)
}

fn cmd_theme(context: &mut CliContext, args: &[&str]) -> CommandResult {
    let theme = match args.first().copied() {
        None => context.tracker.theme()?,
        Some("toggle") => context.tracker.toggle_theme()?,
        Some(raw) => {
            let theme: Theme = raw.parse()?;
            context.tracker.set_theme(theme)?;
            theme
        }
    };
    output::info(format!("Theme: {theme}"));
    Ok(LoopControl::Continue)
}

fn cmd_version(context: &mut CliContext, _args: &[&str]) -> CommandResult {
    let meta = build_info::current();
    output::section(format!("Fina {}", meta.version));
    output::info(format!("  Store schema : v{STORE_SCHEMA_VERSION}"));
    output::info(format!("  Backup format: v{BACKUP_VERSION}"));
    output::info(format!("  Build hash   : {}", meta.git_hash));
    output::info(format!("  Built at     : {}", meta.timestamp));
    output::info(format!("  Target       : {}", meta.target));
    output::info(format!("  Profile      : {}", meta.profile));
    output::info(format!(
        "  Data file    : {}",
        context.config_manager.data_file(&context.config).display()
    ));
    Ok(LoopControl::Continue)
}

fn cmd_help(context: &mut CliContext, args: &[&str]) -> CommandResult {
    if let Some(name) = args.first() {
        let definition = context
            .command(&name.to_lowercase())
            .ok_or_else(|| CommandError::InvalidArguments(format!("unknown command `{name}`")))?;
        output::section(definition.name);
        output::info(format!("  {}", definition.description));
        output::info(format!("  usage: {}", definition.usage));
        return Ok(LoopControl::Continue);
    }

    output::section("Commands");
    for definition in context.registry.iter() {
        output::info(format!("  {:<18} {}", definition.name, definition.description));
    }
    Ok(LoopControl::Continue)
}

fn cmd_exit(_context: &mut CliContext, _args: &[&str]) -> CommandResult {
    Ok(LoopControl::Exit)
}
