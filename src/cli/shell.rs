use std::io::{self, BufRead};

use shell_words::split;

use super::context::{CliContext, CliError, LoopControl};
use super::output;

/// Runs the command given on the command line, or reads one command per line
/// from stdin when none is given.
pub fn run_cli() -> Result<(), CliError> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let mut context = CliContext::new()?;

    if args.is_empty() {
        run_script(&mut context)?;
    } else {
        let refs: Vec<&str> = args.iter().skip(1).map(String::as_str).collect();
        run_command(&mut context, &args[0], &refs);
    }

    if context.had_errors {
        Err(CliError::CommandsFailed)
    } else {
        Ok(())
    }
}

fn run_script(context: &mut CliContext) -> Result<(), CliError> {
    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = line?;
        let tokens = match split(&line) {
            Ok(tokens) => tokens,
            Err(err) => {
                output::warning(format!("could not parse `{}`: {err}", line.trim()));
                context.had_errors = true;
                continue;
            }
        };
        let Some((name, rest)) = tokens.split_first() else {
            continue;
        };
        if name.starts_with('#') {
            continue;
        }
        let args: Vec<&str> = rest.iter().map(String::as_str).collect();
        if run_command(context, name, &args) == LoopControl::Exit {
            break;
        }
    }
    Ok(())
}

fn run_command(context: &mut CliContext, name: &str, args: &[&str]) -> LoopControl {
    match context.dispatch(&name.to_lowercase(), args) {
        Ok(control) => control,
        Err(err) => {
            context.report_error(err);
            LoopControl::Continue
        }
    }
}
