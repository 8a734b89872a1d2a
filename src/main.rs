//! augur - CLI entry point.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use serde_json::Value;
use tracing::info;
use tracing_subscriber::EnvFilter;

use augur::config;
use augur::{AiClient, Variables};

/// Environment variable controlling log verbosity.
const LOG_ENV_VAR: &str = "AUGUR_LOG";

/// Run AI-assisted PR and release tasks with deterministic fallbacks.
#[derive(Parser, Debug)]
#[command(name = "augur")]
#[command(about = "Run AI-assisted PR and release tasks with deterministic fallbacks")]
#[command(version)]
struct Cli {
    /// Directory holding ai_config.yml and prompts/ (defaults to the install location)
    #[arg(long, global = true, env = "AUGUR_HOME")]
    config_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run one task and print the generated text
    Call(CallArgs),

    /// Show the model and parameters a task would use
    Resolve {
        /// Task name (matches a file in prompts/)
        task: String,

        /// Provider to resolve for (defaults to the active provider)
        #[arg(long)]
        provider: Option<String>,
    },

    /// Show configured and available providers
    Status,
}

#[derive(Args, Debug)]
struct CallArgs {
    /// Task name (matches a file in prompts/)
    task: String,

    /// Template variable as KEY=VALUE (repeatable)
    #[arg(long = "var", value_name = "KEY=VALUE", value_parser = parse_var)]
    vars: Vec<(String, String)>,

    /// JSON object file with template variables (merged under --var)
    #[arg(long)]
    vars_file: Option<PathBuf>,

    /// Provider to call instead of the active one
    #[arg(long)]
    provider: Option<String>,

    /// Text to print when no AI content is available
    #[arg(long, default_value = "")]
    fallback_text: String,

    /// Print the full call result as JSON
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let asset_dir = cli.config_dir.unwrap_or_else(config::asset_dir);

    match cli.command {
        Command::Call(args) => run_call(&asset_dir, args).await,
        Command::Resolve { task, provider } => run_resolve(&asset_dir, &task, provider.as_deref()),
        Command::Status => run_status(&asset_dir),
    }
}

async fn run_call(asset_dir: &Path, args: CallArgs) -> Result<()> {
    let variables = collect_variables(args.vars_file.as_deref(), args.vars)?;
    let mut client = AiClient::from_asset_dir(asset_dir);

    let result = match args.provider.as_deref() {
        Some(provider) => client.call_with_provider(&args.task, &variables, provider).await,
        None => client.call_ai(&args.task, &variables).await,
    }
    .with_context(|| format!("Task '{}' could not be run", args.task))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!("{}", result.content_or(&args.fallback_text));
    }

    log_usage(&client);
    Ok(())
}

fn run_resolve(asset_dir: &Path, task: &str, provider: Option<&str>) -> Result<()> {
    let client = AiClient::from_asset_dir(asset_dir);

    match client
        .resolve(task, provider)
        .with_context(|| format!("Task '{}' could not be resolved", task))?
    {
        Some(choice) => println!("{}", serde_json::to_string_pretty(&choice)?),
        None => bail!("No provider available to resolve task '{}'", task),
    }
    Ok(())
}

fn run_status(asset_dir: &Path) -> Result<()> {
    let client = AiClient::from_asset_dir(asset_dir);
    println!("{}", serde_json::to_string_pretty(&client.usage_summary())?);
    Ok(())
}

/// Log the end-of-run usage line; cost only when cost estimation is on.
fn log_usage(client: &AiClient) {
    let summary = client.usage_summary();
    if client.config().debug.estimate_costs {
        info!(
            "AI usage: {} requests, {} tokens, ~${:.4}",
            summary.requests_made, summary.total_tokens, summary.estimated_cost_usd
        );
    } else {
        info!(
            "AI usage: {} requests, {} tokens",
            summary.requests_made, summary.total_tokens
        );
    }
}

/// Merge `--vars-file` with `--var` pairs; `--var` wins on conflict.
fn collect_variables(file: Option<&Path>, pairs: Vec<(String, String)>) -> Result<Variables> {
    let mut variables = Variables::new();

    if let Some(path) = file {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read variables file {}", path.display()))?;
        let value: Value = serde_json::from_str(&content)
            .with_context(|| format!("Variables file {} is not valid JSON", path.display()))?;
        let Value::Object(map) = value else {
            bail!("Variables file {} must contain a JSON object", path.display());
        };
        variables.extend(map);
    }

    for (key, value) in pairs {
        variables.insert(key, Value::String(value));
    }

    Ok(variables)
}

fn parse_var(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected KEY=VALUE, got '{}'", raw)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_var_splits_on_first_equals() {
        assert_eq!(
            parse_var("body=a=b").unwrap(),
            ("body".to_string(), "a=b".to_string())
        );
        assert!(parse_var("novalue").is_err());
        assert!(parse_var("=x").is_err());
    }

    #[test]
    fn var_flags_override_file_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vars.json");
        std::fs::write(&path, r#"{"title": "from file", "files": 3}"#).unwrap();

        let variables = collect_variables(
            Some(&path),
            vec![("title".to_string(), "from flag".to_string())],
        )
        .unwrap();

        assert_eq!(variables["title"], "from flag");
        assert_eq!(variables["files"], 3);
    }

    #[test]
    fn non_object_vars_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vars.json");
        std::fs::write(&path, "[1, 2]").unwrap();
        assert!(collect_variables(Some(&path), Vec::new()).is_err());
    }

    #[test]
    fn cli_parses_call_arguments() {
        let cli = Cli::try_parse_from([
            "augur",
            "--config-dir",
            "/tmp/assets",
            "call",
            "pr_analysis",
            "--var",
            "title=Fix handler",
            "--fallback-text",
            "No summary available.",
        ])
        .unwrap();

        assert_eq!(cli.config_dir, Some(PathBuf::from("/tmp/assets")));
        match cli.command {
            Command::Call(args) => {
                assert_eq!(args.task, "pr_analysis");
                assert_eq!(args.vars, vec![("title".to_string(), "Fix handler".to_string())]);
                assert_eq!(args.fallback_text, "No summary available.");
                assert!(!args.json);
            }
            other => panic!("Expected call command, got {other:?}"),
        }
    }
}
