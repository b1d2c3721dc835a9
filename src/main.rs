// Stratgen: AI-assisted QuantConnect strategy generation
// Copyright (c) 2024 Stratgen Core Team

use clap::Parser;
use console::style;
use std::fs;
use std::path::Path;
use stratgen::{
    ai::StrategyValidator,
    config::Config,
    error::{Error, Result},
    pipeline::{BatchItem, BatchReport, Outcome, Pipeline, DEFAULT_PROMPTS},
    progress::BatchProgress,
    types::{Dialect, ValidationReport},
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod cli;
use cli::{Cli, Commands};

/// Exit status when some strategies were rejected or not saved
const EXIT_INCOMPLETE: i32 = 2;

#[tokio::main]
async fn main() {
    // A missing .env file is fine
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    if cli.no_color {
        console::set_colors_enabled(false);
        console::set_colors_enabled_stderr(false);
    }

    if !cli.quiet {
        if console::Term::stderr().is_term() {
            stratgen::banner::display_banner();
        } else {
            stratgen::banner::display_minimal_banner();
        }
    }

    init_logging(&cli);

    match run(cli).await {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            tracing::error!("Error: {}", e);
            eprintln!("{} {}", style("Error:").red().bold(), e);
            std::process::exit(1);
        }
    }
}

/// Initialize logging based on verbosity level
/// - 0: errors only (progress bar mode)
/// - 1 (-v): info
/// - 2 (-vv): debug
/// - 3+ (-vvv): trace
///
/// `RUST_LOG` overrides the level when set. Logs go to stderr.
fn init_logging(cli: &Cli) {
    let filter_str = match cli.verbose {
        0 => "error",
        1 => "stratgen=info",
        2 => "stratgen=debug",
        _ => "stratgen=trace",
    };

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter_str));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_ansi(!cli.no_color)
        .with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();
}

/// Run the CLI command, returning the process exit status
async fn run(cli: Cli) -> Result<i32> {
    let show_progress = cli.verbose == 0 && !cli.quiet;
    match cli.command {
        Commands::Run(args) => run_batch_command(args, cli.config.as_deref(), show_progress).await,
        Commands::Validate(args) => run_validate_command(args, cli.config.as_deref()).await,
        Commands::Config(cmd) => run_config_command(cmd, cli.config.as_deref()).map(|_| 0),
    }
}

fn apply_run_args_to_config(config: &mut Config, args: &cli::RunArgs) {
    if let Some(language) = args.language {
        config.output.dialect = language.into();
    }
    if let Some(output) = &args.output {
        config.output.directory = output.clone();
    }
    if args.offline {
        config.generator.enabled = false;
    }
    if args.no_lint {
        config.validation.lint.enabled = false;
    }
}

/// Collect prompts from arguments and the prompts file, in that order
fn collect_prompts(args: &cli::RunArgs) -> Result<Vec<String>> {
    let mut prompts: Vec<String> = args
        .prompts
        .iter()
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty())
        .collect();

    if let Some(path) = &args.prompts_file {
        prompts.extend(read_prompts_file(path)?);
    }

    if prompts.is_empty() {
        tracing::info!("No prompts given, using the built-in samples");
        prompts = DEFAULT_PROMPTS.iter().map(|p| p.to_string()).collect();
    }
    Ok(prompts)
}

fn read_prompts_file(path: &Path) -> Result<Vec<String>> {
    if !path.exists() {
        return Err(Error::FileNotFound(path.to_path_buf()));
    }
    let content = fs::read_to_string(path)?;
    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect())
}

async fn run_batch_command(
    args: cli::RunArgs,
    config_path: Option<&Path>,
    show_progress: bool,
) -> Result<i32> {
    let mut config = Config::load(config_path)?;
    apply_run_args_to_config(&mut config, &args);
    config.validate()?;

    let prompts = collect_prompts(&args)?;
    let pipeline = Pipeline::from_config(&config);

    if !args.json {
        eprintln!(
            "{} Generating {} {} strateg{} into {}",
            style("[1/2]").bold().dim(),
            prompts.len(),
            pipeline.dialect().display_name(),
            if prompts.len() == 1 { "y" } else { "ies" },
            style(pipeline.store().output_dir().display()).cyan()
        );
        if !pipeline.is_online() {
            eprintln!(
                "      {}",
                style("Generation service not configured, using built-in templates").yellow()
            );
        }
    }

    let progress = BatchProgress::new(prompts.len(), show_progress && !args.json);
    let report = pipeline
        .run_batch_with(&prompts, |item| {
            progress.item_done(item);
            if !args.json {
                progress.suspend(|| print_item(item));
            }
        })
        .await;
    progress.finish();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_summary(&report);
    }

    Ok(if report.all_saved() { 0 } else { EXIT_INCOMPLETE })
}

fn print_item(item: &BatchItem) {
    match &item.outcome {
        Outcome::Saved {
            path,
            score,
            warnings,
        } => {
            println!(
                "{} #{} saved {} (score {})",
                style("✓").green().bold(),
                item.index,
                path.display(),
                score
            );
            for warning in warnings {
                println!("    {} {}", style("warning:").yellow(), warning);
            }
        }
        Outcome::Rejected { errors } => {
            println!(
                "{} #{} rejected: {}",
                style("✗").red().bold(),
                item.index,
                errors.join("; ")
            );
        }
        Outcome::Failed { error } => {
            println!(
                "{} #{} not saved: {}",
                style("✗").red().bold(),
                item.index,
                error
            );
        }
    }
}

fn print_summary(report: &BatchReport) {
    eprintln!(
        "{} {} saved, {} rejected, {} failed",
        style("[2/2]").bold().dim(),
        style(report.saved()).green().bold(),
        style(report.rejected()).red(),
        style(report.failed()).red()
    );
}

async fn run_validate_command(args: cli::ValidateArgs, config_path: Option<&Path>) -> Result<i32> {
    let config = Config::load(config_path)?;

    if !args.file.exists() {
        return Err(Error::FileNotFound(args.file.clone()));
    }
    let dialect = match args.language {
        Some(language) => Dialect::from(language),
        None => Dialect::from_path(&args.file).ok_or_else(|| {
            Error::UnsupportedLanguage(format!(
                "cannot infer language of {}, pass --language",
                args.file.display()
            ))
        })?,
    };

    let source = fs::read_to_string(&args.file)?;
    let validator = if args.no_lint {
        StrategyValidator::new()
    } else {
        StrategyValidator::with_lint_config(&config.validation.lint)
    };
    let report = validator.validate(&source, dialect).await;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&args.file, &report);
    }

    Ok(if report.is_valid() { 0 } else { EXIT_INCOMPLETE })
}

fn print_report(path: &Path, report: &ValidationReport) {
    let verdict = if report.is_valid() {
        style("valid").green().bold()
    } else {
        style("invalid").red().bold()
    };
    println!("{}: {} (score {})", path.display(), verdict, report.score());
    for error in report.errors() {
        println!("    {} {}", style("error:").red(), error);
    }
    for warning in report.warnings() {
        println!("    {} {}", style("warning:").yellow(), warning);
    }
}

fn run_config_command(cmd: cli::ConfigCommand, config_path: Option<&Path>) -> Result<()> {
    use cli::ConfigAction;

    match cmd.action {
        ConfigAction::Generate { output } => {
            let config = Config::default();
            config.save(&output)?;
            println!("Configuration generated: {}", output.display());
            Ok(())
        }
        ConfigAction::Validate { config } => {
            let cfg = Config::from_file(&config)?;
            cfg.validate()?;
            println!("Configuration is valid");
            Ok(())
        }
        ConfigAction::Show => {
            let mut config = Config::load(config_path)?;
            if config.generator.credential().is_some() {
                config.generator.api_key = Some(mask_key(config.generator.api_key.as_deref()));
            }
            let yaml = serde_yaml::to_string(&config)?;
            println!("{}", yaml);
            Ok(())
        }
    }
}

fn mask_key(key: Option<&str>) -> String {
    let key = key.unwrap_or_default();
    let visible: String = key.chars().take(7).collect();
    format!("{}…", visible)
}
