//! Operator CLI over the local profile store.
//!
//! # Responsibility
//! - Create, inspect and patch profiles in the SQLite reference store.
//! - Drive edits through `ProfileController` so completion stays derived.
//! - Exercise the business profile form save flow headlessly.

use clap::{Parser, Subcommand};
use log::warn;
use profile_core::{
    calculate_completion, init_logging, BusinessProfileForm, CompletionSync, FieldValue,
    FormRegistry, LogNotifier, LoggingConfig, ProfileConfig, ProfileController, ProfileField,
    ProfilePatch, ProfileRecord, ProfileService, SqliteProfileService, UserId,
};
use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

type CliResult<T> = Result<T, Box<dyn Error>>;

#[derive(Debug, Parser)]
#[command(name = "profile", version, about = "Inspect and edit business profiles")]
struct Cli {
    /// SQLite database path. Defaults to PROFILE_DB_PATH or a temp file.
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Absolute directory for rolling log files. Defaults to PROFILE_LOG_DIR.
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,

    /// Log level (trace|debug|info|warn|error). Defaults to PROFILE_LOG_LEVEL.
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Create an empty profile for a user if none exists.
    Init {
        user_id: UserId,
        #[arg(long)]
        name: Option<String>,
    },
    /// Print a profile as JSON.
    Show { user_id: UserId },
    /// Apply `field=value` assignments and refresh completion.
    Set {
        user_id: UserId,
        #[arg(required = true)]
        assignments: Vec<String>,
    },
    /// Edit business fields through the business profile form and save.
    Business {
        user_id: UserId,
        #[arg(required = true)]
        assignments: Vec<String>,
    },
    /// Print computed and stored completion.
    Completion { user_id: UserId },
    /// List stored profile ids.
    List,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> CliResult<()> {
    let config = ProfileConfig::from_env()?;
    if let Some(logging) = resolve_logging(&cli, config.logging.as_ref()) {
        init_logging(&logging)?;
    }

    let db_path = cli.db.clone().unwrap_or(config.db_path);
    let service = Arc::new(SqliteProfileService::open(&db_path)?);

    match cli.command {
        Command::Init { user_id, name } => {
            let record = service.ensure_profile(user_id, name).await?;
            print_record(&record)
        }
        Command::Show { user_id } => {
            let record = service.fetch_complete_profile(user_id).await?;
            print_record(&record)
        }
        Command::Set {
            user_id,
            assignments,
        } => {
            let patch = parse_patch(&assignments)?;
            let controller = ProfileController::new(Arc::clone(&service));
            controller.load(Some(user_id)).await?;
            let mut record = controller.update(patch).await?;
            match controller.sync_completion().await {
                Ok(CompletionSync::Corrected(corrected)) => record = corrected,
                Ok(_) => {}
                Err(err) => warn!("event=completion_sync module=cli status=error error={err}"),
            }
            print_record(&record)
        }
        Command::Business {
            user_id,
            assignments,
        } => {
            let edits = assignments
                .iter()
                .map(|assignment| parse_assignment(assignment))
                .collect::<CliResult<Vec<_>>>()?;
            let controller = ProfileController::new(Arc::clone(&service));
            controller.load(Some(user_id)).await?;

            let mut registry = FormRegistry::new();
            BusinessProfileForm::register(&mut registry)?;
            let mut form = BusinessProfileForm::new();
            form.seed_from(controller.profile().as_ref());
            for (field, value) in edits {
                form.edit(&mut registry, field, value)?;
            }
            let record = form.save(&controller, &LogNotifier).await?;
            print_record(&record)
        }
        Command::Completion { user_id } => {
            let record = service.fetch_complete_profile(user_id).await?;
            println!(
                "computed={} stored={}",
                calculate_completion(&record),
                record.completion_percentage
            );
            Ok(())
        }
        Command::List => {
            for id in service.list_profile_ids().await? {
                println!("{id}");
            }
            Ok(())
        }
    }
}

fn resolve_logging(cli: &Cli, from_env: Option<&LoggingConfig>) -> Option<LoggingConfig> {
    let mut logging = match (&cli.log_dir, from_env) {
        (Some(dir), env) => LoggingConfig {
            level: env
                .map(|config| config.level.clone())
                .unwrap_or_else(|| profile_core::default_log_level().to_string()),
            log_dir: dir.clone(),
        },
        (None, Some(env)) => env.clone(),
        (None, None) => return None,
    };
    if let Some(level) = &cli.log_level {
        logging.level = level.clone();
    }
    Some(logging)
}

fn parse_assignment(assignment: &str) -> CliResult<(ProfileField, FieldValue)> {
    let (name, value) = assignment
        .split_once('=')
        .ok_or_else(|| format!("expected field=value, got `{assignment}`"))?;
    let field = ProfileField::parse(name.trim())
        .ok_or_else(|| format!("unknown profile field `{}`", name.trim()))?;

    match field {
        ProfileField::CompletionPercentage => {
            Err("completion_percentage is derived and cannot be set".into())
        }
        _ if field.is_flag() => {
            let flag = value
                .trim()
                .parse::<bool>()
                .map_err(|_| format!("`{field}` expects true or false, got `{value}`"))?;
            Ok((field, FieldValue::Flag(flag)))
        }
        _ => Ok((field, FieldValue::Text(value.to_string()))),
    }
}

fn parse_patch(assignments: &[String]) -> CliResult<ProfilePatch> {
    let mut patch = ProfilePatch::default();
    for assignment in assignments {
        match parse_assignment(assignment)? {
            (field, FieldValue::Flag(flag)) => {
                patch.set_flag(field, flag);
            }
            (field, FieldValue::Text(text)) => {
                patch.set_text(field, text);
            }
        }
    }
    Ok(patch)
}

fn print_record(record: &ProfileRecord) -> CliResult<()> {
    println!("{}", serde_json::to_string_pretty(record)?);
    Ok(())
}
