//! `validate` command implementation.

use anyhow::{Context, Result};
use ingestion::{FileIssue, JsonProcessor, ProcessorConfig};
use serde::Serialize;
use tracing::info;

use crate::cli::ValidateArgs;
use crate::error::CliError;
use crate::settings::load_settings;

/// Validation result for JSON output
#[derive(Serialize)]
struct ValidationResult {
    valid: bool,
    config_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<InputSummary>,
}

#[derive(Serialize)]
struct InputSummary {
    input_dir: String,
    discovered: usize,
    ready: usize,
    age_keys: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    invalid: Vec<FileIssue>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    unreadable: Vec<FileIssue>,
}

/// Execute the `validate` command
pub async fn run_validate(args: &ValidateArgs) -> Result<()> {
    info!(config = %args.settings.config.display(), "Validating settings and inputs");

    let result = validate_all(args).await;

    if args.json {
        let json = serde_json::to_string_pretty(&result)
            .context("Failed to serialize validation result")?;
        println!("{}", json);
    } else {
        print_validation_result(&result);
    }

    if result.valid {
        Ok(())
    } else {
        anyhow::bail!("Validation failed")
    }
}

async fn validate_all(args: &ValidateArgs) -> ValidationResult {
    let config_path = args.settings.config.display().to_string();

    let settings = match load_settings(&args.settings) {
        Ok(settings) => settings,
        Err(e) => return invalid(config_path, e),
    };

    let processor = JsonProcessor::new(ProcessorConfig::from_settings(&settings.input));
    let scan = match processor.scan().await {
        Ok(scan) => scan,
        Err(e) => return invalid(config_path, CliError::from(e)),
    };

    let valid = scan.invalid.is_empty() && scan.skipped.is_empty();
    ValidationResult {
        valid,
        config_path,
        error: None,
        summary: Some(InputSummary {
            input_dir: settings.input.dir.display().to_string(),
            discovered: scan.discovered,
            ready: scan.ready.len(),
            age_keys: scan.age_keys().len(),
            invalid: scan.invalid,
            unreadable: scan.skipped,
        }),
    }
}

fn invalid(config_path: String, error: CliError) -> ValidationResult {
    ValidationResult {
        valid: false,
        config_path,
        error: Some(error.to_string()),
        summary: None,
    }
}

fn print_validation_result(result: &ValidationResult) {
    match (&result.error, &result.summary) {
        (Some(error), _) => {
            println!("✗ Settings are invalid: {}", result.config_path);
            println!("\n  Error: {}", error);
        }
        (None, Some(summary)) => {
            if result.valid {
                println!("✓ Settings and inputs are valid: {}", result.config_path);
            } else {
                println!("✗ Some input files are invalid: {}", result.config_path);
            }

            println!("\n  Input: {}", summary.input_dir);
            println!("  Files: {}", summary.discovered);
            println!("  Ready: {}", summary.ready);
            println!("  Distinct age keys: {}", summary.age_keys);

            for issue in summary.invalid.iter().chain(&summary.unreadable) {
                println!("  - {}: {}", issue.path.display(), issue.reason);
            }
        }
        (None, None) => println!("✗ Validation produced no result: {}", result.config_path),
    }
}
