//! Command dispatcher: resolves the input source and effective config,
//! calls the orchestrator, and renders the result.

use std::io::Read;

use anyhow::{bail, Context, Result};

use super::args::{Arguments, CliConfigName};
use super::{report, ExitStatus};
use crate::config::{self, presets, Config};
use crate::orchestrator;

pub fn run_cli(args: Arguments) -> Result<ExitStatus> {
    if args.input_source_count() > 1 {
        bail!("At most one of a file path, --stdin, or --clipboard may be given");
    }
    if args.input_source_count() == 0 {
        bail!("No input source given. Provide a file path, --stdin, or --clipboard");
    }

    let source = read_source(&args)?;
    let config = resolve_config(&args)?;
    let result = orchestrator::validate_schema(&source, &config);

    render(&args, &source, &result)?;

    Ok(if result.is_valid {
        ExitStatus::Success
    } else {
        ExitStatus::Failure
    })
}

fn read_source(args: &Arguments) -> Result<String> {
    if let Some(path) = &args.path {
        std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
    } else if args.stdin {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read schema source from stdin")?;
        Ok(buf)
    } else {
        let mut clipboard =
            arboard::Clipboard::new().context("Failed to access the system clipboard")?;
        clipboard
            .get_text()
            .context("Failed to read text from the system clipboard")
    }
}

fn resolve_config(args: &Arguments) -> Result<Config> {
    let preset = match args.config {
        CliConfigName::ExtremelySafe => presets::extremely_safe(),
        CliConfigName::Medium => presets::medium(),
        CliConfigName::Relaxed => presets::relaxed(),
    };

    let cwd = std::env::current_dir().context("Failed to resolve the current directory")?;
    let loaded = config::load_overrides(&cwd)?;
    let mut resolved = preset.with_overrides(&loaded.overrides);

    if args.unwrap_arrays {
        resolved.schema_unification.unwrap_array_root = true;
    }
    if args.get_unified_largest {
        resolved.schema_unification.enabled = true;
    }

    Ok(resolved)
}

fn render(args: &Arguments, source: &str, result: &orchestrator::ValidationResult) -> Result<()> {
    if args.json {
        println!("{}", serde_json::to_string_pretty(result)?);
        return Ok(());
    }

    if args.get_unified_largest {
        match result.schema_groups.as_ref().and_then(|groups| groups.first()) {
            Some(group) => println!("{}", group.code),
            None => eprintln!("No schema groups were produced for this input"),
        }
        return Ok(());
    }

    if args.clean_only {
        println!("{}", result.cleaned_code);
        return Ok(());
    }

    report::report(source, &result.issues);
    if !result.cleaned_code.is_empty() {
        println!("{}", result.cleaned_code);
    }
    Ok(())
}
