use std::{io, sync::Arc};

use strsim::levenshtein;
use uuid::Uuid;

use crate::backup::BackupManager;
use crate::config::{Config, ConfigManager};
use crate::core::time::SystemClock;
use crate::core::FinanceTracker;
use crate::currency::LocaleConfig;
use crate::domain::{common::find_by_id, Bill};
use crate::errors::FinanceError;
use crate::notifications::NoopScheduler;
use crate::storage::JsonFileStore;
use crate::utils::paths::backups_dir_in;

use super::commands::{all_definitions, CommandDefinition, CommandRegistry};
use super::output;

const MIN_ID_PREFIX: usize = 4;

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] FinanceError),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error("one or more commands failed")]
    CommandsFailed,
}

#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("{0}")]
    InvalidArguments(String),
    #[error(transparent)]
    Core(#[from] FinanceError),
    #[error(transparent)]
    Io(#[from] io::Error),
}

pub type CommandResult = Result<LoopControl, CommandError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopControl {
    Continue,
    Exit,
}

pub struct CliContext {
    pub tracker: FinanceTracker,
    pub config: Config,
    pub config_manager: ConfigManager,
    pub backups: BackupManager,
    pub locale: LocaleConfig,
    pub registry: CommandRegistry,
    /// Set once any command failed, so the process can exit non-zero.
    pub had_errors: bool,
}

impl CliContext {
    /// Opens the data directory (`$FINA_HOME` or `~/.fina`).
    pub fn new() -> Result<Self, CliError> {
        let config_manager = ConfigManager::new()?;
        let config = config_manager.load()?;
        let store = JsonFileStore::new(config_manager.data_file(&config))?;
        let tracker = FinanceTracker::open(
            Arc::new(store),
            Arc::new(SystemClock),
            Arc::new(NoopScheduler),
            config.clone(),
        )?;
        let backups = BackupManager::new(
            backups_dir_in(config_manager.base_dir()),
            config.backup_retention,
        )?;
        for warning in &tracker.startup_report().warnings {
            output::warning(warning);
        }
        Ok(Self {
            tracker,
            locale: config.locale_config(),
            config,
            config_manager,
            backups,
            registry: CommandRegistry::new(all_definitions()),
            had_errors: false,
        })
    }

    pub fn command(&self, name: &str) -> Option<&CommandDefinition> {
        self.registry.get(name)
    }

    pub fn dispatch(&mut self, name: &str, args: &[&str]) -> CommandResult {
        match self.command(name).map(|definition| definition.handler) {
            Some(handler) => handler(self, args),
            None => {
                self.suggest_command(name);
                self.had_errors = true;
                Ok(LoopControl::Continue)
            }
        }
    }

    pub fn suggest_command(&self, input: &str) {
        output::warning(format!(
            "Unknown command `{input}`. Type `help` to see available commands."
        ));
        let best = self
            .registry
            .names()
            .map(|name| (levenshtein(name, input), name))
            .min_by_key(|(distance, _)| *distance);
        if let Some((distance, name)) = best {
            if distance <= 3 {
                output::info(format!("Suggestion: `{name}`?"));
            }
        }
    }

    pub fn report_error(&mut self, err: CommandError) {
        self.had_errors = true;
        match err {
            CommandError::InvalidArguments(message) => {
                output::error(message);
                output::info("Use `help <command>` for usage details.");
            }
            other => output::error(other),
        }
    }

    /// Resolves a bill from a full id or an unambiguous prefix of at least four characters.
    pub fn resolve_bill(&self, raw: &str) -> Result<Bill, CommandError> {
        let bills = self.tracker.bills().list()?;
        if let Ok(id) = raw.parse::<Uuid>() {
            return find_by_id(&bills, id)
                .cloned()
                .ok_or_else(|| FinanceError::NotFound(format!("bill {id}")).into());
        }
        let prefix = raw.trim().to_ascii_lowercase();
        if prefix.len() < MIN_ID_PREFIX {
            return Err(CommandError::InvalidArguments(format!(
                "bill id prefix must have at least {MIN_ID_PREFIX} characters"
            )));
        }
        let mut matches = bills
            .into_iter()
            .filter(|bill| bill.id.to_string().starts_with(&prefix));
        match (matches.next(), matches.next()) {
            (Some(bill), None) => Ok(bill),
            (None, _) => Err(FinanceError::NotFound(format!("bill `{raw}`")).into()),
            (Some(_), Some(_)) => Err(CommandError::InvalidArguments(format!(
                "bill id prefix `{raw}` is ambiguous"
            ))),
        }
    }
}
