//! `tagrule` command-line tool for trying rule strings against single values.
//!
//! Exit codes: `0` success, `1` the value failed validation, `2` a rule-string
//! error or any other failure.

mod config;
mod logging;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use serde::Serialize;
use serde_json::Value;
use tagrule::{Registry, RuleDescriptor, RuleError, Validation, parse_tag, parse_tag_lenient};

use crate::config::{CliConfig, LogFormat};

#[derive(Debug, Parser)]
#[command(name = "tagrule", version, about = "Declarative rule-string validation")]
struct Cli {
    /// Explicit configuration file.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Log filter, e.g. `debug` or `tagrule=trace`.
    #[arg(long, global = true, value_name = "FILTER")]
    log_level: Option<String>,

    #[arg(long, global = true, value_enum)]
    log_format: Option<LogFormat>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List registered rules with their parameter kinds.
    Rules {
        /// Print signatures as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Parse a tag and print the descriptors as JSON.
    Parse {
        tag: String,

        /// Keep parsing past bad rules and report all of them.
        #[arg(long)]
        lenient: bool,
    },

    /// Validate one value against a tag.
    Check {
        tag: String,

        /// JSON value; with `--string` the literal text.
        value: String,

        /// Treat VALUE as a plain string instead of JSON.
        #[arg(long)]
        string: bool,

        /// Collect rule-string errors instead of stopping at the first.
        #[arg(long)]
        lenient: bool,

        /// Stop after the first failed rule.
        #[arg(long)]
        first_failure: bool,
    },
}

/// Outcome of a subcommand, mapped to the process exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Status {
    Ok,
    Invalid,
    RuleError,
}

impl From<Status> for ExitCode {
    fn from(status: Status) -> Self {
        match status {
            Status::Ok => Self::SUCCESS,
            Status::Invalid => Self::from(1_u8),
            Status::RuleError => Self::from(2_u8),
        }
    }
}

/// JSON form of a [`RuleError`].
#[derive(Debug, Serialize)]
struct ErrorReport {
    code: &'static str,
    rule: String,
    message: String,
}

impl From<&RuleError> for ErrorReport {
    fn from(err: &RuleError) -> Self {
        Self {
            code: err.code(),
            rule: err.rule().to_owned(),
            message: err.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
struct ParseReport<'a> {
    rules: &'a [RuleDescriptor],
    errors: Vec<ErrorReport>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(status) => status.into(),
        Err(err) => {
            eprintln!("error: {err:#}");
            Status::RuleError.into()
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<Status> {
    let mut config = config::load(cli.config.as_deref())?;
    apply_flags(&mut config, &cli);
    logging::init(&config.log)?;
    logging::install_panic_hook();

    tracing::debug!(?config, "configuration loaded");

    let registry = Registry::shared();
    match cli.command {
        Command::Rules { json } => list_rules(&registry, json),
        Command::Parse { tag, lenient } => parse(&registry, &tag, lenient),
        Command::Check {
            tag,
            value,
            string,
            lenient,
            first_failure,
        } => {
            if lenient {
                config.engine.fail_fast = false;
            }
            if first_failure {
                config.engine.stop_on_first_failure = true;
            }
            let value = if string {
                Value::String(value)
            } else {
                serde_json::from_str(&value)
                    .with_context(|| format!("VALUE is not valid JSON: {value}"))?
            };
            Ok(check(registry, &config, &tag, &value))
        }
    }
}

fn apply_flags(config: &mut CliConfig, cli: &Cli) {
    if let Some(level) = &cli.log_level {
        config.log.level.clone_from(level);
    }
    if let Some(format) = cli.log_format {
        config.log.format = format;
    }
}

fn list_rules(registry: &Registry, json: bool) -> anyhow::Result<Status> {
    if json {
        println!("{}", serde_json::to_string_pretty(&registry.signatures())?);
    } else {
        for signature in registry.signatures() {
            println!("{signature}");
        }
    }
    Ok(Status::Ok)
}

fn parse(registry: &Registry, tag: &str, lenient: bool) -> anyhow::Result<Status> {
    let (rules, errors) = if lenient {
        parse_tag_lenient(registry, tag)
    } else {
        match parse_tag(registry, tag) {
            Ok(rules) => (rules, Vec::new()),
            Err(err) => (Vec::new(), vec![err]),
        }
    };

    let report = ParseReport {
        rules: &rules,
        errors: errors.iter().map(ErrorReport::from).collect(),
    };
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(if errors.is_empty() {
        Status::Ok
    } else {
        Status::RuleError
    })
}

fn check(
    registry: Arc<Registry>,
    config: &CliConfig,
    tag: &str,
    value: &Value,
) -> Status {
    let mut valid = Validation::with_config(registry, config.engine);

    let passed = match valid.check(value, tag) {
        Ok(passed) => passed,
        Err(err) => {
            eprintln!("error: {err}");
            return Status::RuleError;
        }
    };

    for error in valid.errors() {
        println!("{error}");
    }
    for err in valid.rule_errors() {
        eprintln!("error: {err}");
    }

    if !valid.rule_errors().is_empty() {
        Status::RuleError
    } else if passed {
        println!("ok");
        Status::Ok
    } else {
        Status::Invalid
    }
}
