// SPDX-License-Identifier: Apache-2.0 OR MIT
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use nslog::{LogRegistry, LogSettings, Severity};
use serde_json::Value;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// JSON5 settings file; flags and environment override it
    #[arg(long)]
    config: Option<PathBuf>,

    /// Namespace filter, e.g. "app:*,app:db=none"
    #[arg(long, env = "LOGS")]
    namespaces: Option<String>,

    /// Severity floor (trace, debug, info, warn, error, none)
    #[arg(long, env = "LOG_LEVEL")]
    level: Option<String>,

    /// Outputs to write to (json, pretty)
    #[arg(long = "output", env = "LOG_OUTPUT", value_delimiter = ',')]
    outputs: Vec<String>,

    /// Global context entry as key=value; values are parsed as JSON when possible
    #[arg(long = "context", value_parser = parse_key_value)]
    context: Vec<(String, Value)>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, PartialEq)]
enum Command {
    /// Emit a single log record
    Log {
        /// Logger namespace
        #[arg(long, default_value = "")]
        namespace: String,
        /// Severity of the record
        #[arg(long, default_value = "info")]
        severity: String,
        /// Correlation id; generated when omitted
        #[arg(long)]
        context_id: Option<String>,
        /// JSON payload attached as `data`
        #[arg(long)]
        data: Option<String>,
        /// Write even if the namespace or severity is disabled
        #[arg(long)]
        force: bool,
        message: String,
    },
    /// Print the enabled severities of each namespace
    Check { namespaces: Vec<String> },
}

fn parse_key_value(s: &str) -> Result<(String, Value), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{}'", s))?;
    let value = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));
    Ok((key.to_string(), value))
}

fn settings(args: &Args) -> Result<LogSettings> {
    let mut settings = match &args.config {
        Some(path) => LogSettings::load_from_file(path)?,
        None => LogSettings::default(),
    };
    if let Some(namespaces) = &args.namespaces {
        settings.namespaces = namespaces.clone();
    }
    if let Some(level) = &args.level {
        settings.level = level.clone();
    }
    if !args.outputs.is_empty() {
        settings.outputs = args.outputs.clone();
    }
    settings.context.extend(args.context.iter().cloned());
    Ok(settings)
}

fn main() -> Result<()> {
    let args = Args::parse();
    let registry = LogRegistry::from_settings(&settings(&args)?)?;

    match args.command {
        Command::Log {
            namespace,
            severity,
            context_id,
            data,
            force,
            message,
        } => {
            let severity: Severity = severity.parse()?;
            let data = data
                .map(|raw| serde_json::from_str::<Value>(&raw))
                .transpose()
                .context("--data is not valid JSON")?;

            if force {
                let logger = registry.create_forced_logger(&namespace);
                logger.force(severity, context_id.as_deref(), &message, data);
            } else {
                let logger = registry.create_logger(&namespace);
                match context_id {
                    Some(id) => logger.log_with_context(severity, &id, &message, data),
                    None => logger.log(severity, &message, data),
                }
            }
        }
        Command::Check { namespaces } => {
            for namespace in namespaces {
                let logger = registry.create_logger(&namespace);
                let levels: Vec<&str> = logger
                    .enabled_levels()
                    .into_iter()
                    .map(Severity::as_str)
                    .collect();
                let levels = if levels.is_empty() {
                    "(disabled)".to_string()
                } else {
                    levels.join(" ")
                };
                println!("{}\t{}", namespace, levels);
            }
        }
    }

    Ok(())
}
