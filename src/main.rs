//! Markdown Guardian CLI - command-line interface for Markdown style checks
//!
//! CDD Principle: Application Layer - CLI coordinates user interactions with domain services
//! - Translates user commands to library operations
//! - Handles external concerns like process exit codes, terminal output and file watching
//! - Reports go to stdout, logs to stderr

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use markdown_guardian::config::DEFAULT_CONFIG_FILES;
use markdown_guardian::rules::builtin_rule;
use markdown_guardian::{
    AnalysisOptions, FileCache, GuardianConfig, GuardianError, MarkdownGuardian, OutputFormat,
    ReportFormatter, ReportOptions, RuleId, Severity, ValidationOptions, DEFAULT_CACHE_PATH,
};
use std::path::{Path, PathBuf};
use std::process;
use tracing_subscriber::EnvFilter;

/// Markdown Guardian - blank-line and frontmatter checks for Markdown
#[derive(Parser)]
#[command(name = "markdown-guardian")]
#[command(version)]
#[command(about = "Reports frontmatter and blank-line style problems in Markdown documents")]
#[command(
    long_about = "Markdown Guardian checks that documents open with closed YAML frontmatter and that fenced code blocks and lists are separated from surrounding text by blank lines. It only reports; documents are never modified."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Check Markdown files for style violations
    Check(CheckArgs),

    /// Watch for file changes and run checks automatically
    Watch {
        /// Path to watch (defaults to current directory)
        path: Option<PathBuf>,

        /// Debounce delay in milliseconds
        #[arg(long, default_value = "500")]
        delay: u64,
    },

    /// Validate configuration file
    ValidateConfig {
        /// Configuration file to validate
        config_file: Option<PathBuf>,
    },

    /// Explain what a specific rule checks
    Explain {
        /// Rule ID to explain
        rule_id: String,
    },

    /// Manage the check cache
    Cache {
        #[command(subcommand)]
        action: CacheCommands,
    },

    /// List available rules
    Rules {
        /// Show only enabled rules
        #[arg(long)]
        enabled_only: bool,
    },
}

#[derive(Args, Default)]
struct CheckArgs {
    /// Files or directories to check (defaults to the current directory)
    paths: Vec<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "human")]
    format: OutputFormatArg,

    /// Minimum severity level to report
    #[arg(short, long, value_enum)]
    severity: Option<SeverityArg>,

    /// Maximum number of violations to report
    #[arg(long)]
    max_violations: Option<usize>,

    /// Additional exclude patterns
    #[arg(long, action = clap::ArgAction::Append)]
    exclude: Vec<String>,

    /// Ignore .mdguardignore files
    #[arg(long)]
    no_ignore: bool,

    /// Disable parallel processing
    #[arg(long)]
    no_parallel: bool,

    /// Stop at the first unreadable file
    #[arg(long)]
    fail_fast: bool,

    /// Reuse reports of unchanged files
    #[arg(long)]
    cache: bool,

    /// Custom cache file path
    #[arg(long)]
    cache_file: Option<PathBuf>,
}

#[derive(Subcommand)]
enum CacheCommands {
    /// Show cache statistics
    Stats {
        #[arg(long)]
        cache_file: Option<PathBuf>,
    },

    /// Clear the cache
    Clear {
        #[arg(long)]
        cache_file: Option<PathBuf>,
    },

    /// Drop entries for files that no longer exist
    Cleanup {
        #[arg(long)]
        cache_file: Option<PathBuf>,
    },
}

#[derive(Copy, Clone, Default, ValueEnum, PartialEq, Eq, Debug)]
enum OutputFormatArg {
    #[default]
    Human,
    Json,
    Github,
    Junit,
}

impl From<OutputFormatArg> for OutputFormat {
    fn from(arg: OutputFormatArg) -> Self {
        match arg {
            OutputFormatArg::Human => OutputFormat::Human,
            OutputFormatArg::Json => OutputFormat::Json,
            OutputFormatArg::Github => OutputFormat::GitHub,
            OutputFormatArg::Junit => OutputFormat::Junit,
        }
    }
}

#[derive(Copy, Clone, ValueEnum, Debug)]
enum SeverityArg {
    Info,
    Warning,
    Error,
}

impl From<SeverityArg> for Severity {
    fn from(arg: SeverityArg) -> Self {
        match arg {
            SeverityArg::Info => Severity::Info,
            SeverityArg::Warning => Severity::Warning,
            SeverityArg::Error => Severity::Error,
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    match run_command(cli).await {
        Ok(exit_code) => process::exit(exit_code),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            process::exit(1);
        }
    }
}

async fn run_command(cli: Cli) -> Result<i32> {
    let use_colors = !cli.no_color;

    match cli.command {
        Commands::Check(args) => run_check(cli.config.as_deref(), args, use_colors).await,
        Commands::Watch { path, delay } => {
            run_watch(cli.config.as_deref(), path, delay, use_colors).await
        }
        Commands::ValidateConfig { config_file } => run_validate_config(config_file.or(cli.config)),
        Commands::Explain { rule_id } => run_explain(cli.config.as_deref(), &rule_id),
        Commands::Cache { action } => run_cache_command(action),
        Commands::Rules { enabled_only } => run_list_rules(cli.config.as_deref(), enabled_only),
    }
}

/// `--config` if given, else a default config file in the working directory, else defaults
fn load_config(config_path: Option<&Path>) -> Result<GuardianConfig> {
    GuardianConfig::resolve(config_path, ".").context("Failed to load configuration")
}

async fn run_check(config_path: Option<&Path>, args: CheckArgs, use_colors: bool) -> Result<i32> {
    let config = load_config(config_path)?;

    let report_options = ReportOptions {
        use_colors,
        max_violations: args.max_violations,
        min_severity: args.severity.map(Severity::from),
    };

    let mut validator = MarkdownGuardian::new_with_config(config)?
        .with_report_formatter(ReportFormatter::new(report_options.clone()));

    if args.cache {
        let cache_path = args.cache_file.unwrap_or_else(|| PathBuf::from(DEFAULT_CACHE_PATH));
        validator = validator
            .with_cache(&cache_path)
            .with_context(|| format!("Failed to open cache {}", cache_path.display()))?;
    }

    let paths = if args.paths.is_empty() { vec![PathBuf::from(".")] } else { args.paths };

    let options = ValidationOptions {
        use_cache: args.cache,
        output_format: args.format.into(),
        report_options,
        analysis_options: AnalysisOptions {
            parallel: !args.no_parallel,
            fail_fast: args.fail_fast,
            exclude_patterns: args.exclude,
            ignore_ignore_files: args.no_ignore,
            ..Default::default()
        },
    };

    let report = validator.validate_with_options(paths, &options).await?;

    let formatted = validator.format_report(&report, options.output_format)?;
    print!("{}", formatted);

    if args.cache {
        if let Some(stats) = validator.cache_statistics() {
            if args.format == OutputFormatArg::Human {
                eprintln!("{}", stats.format_display());
            }
        }
        validator.save_cache()?;
    }

    Ok(if report.has_errors() { 1 } else { 0 })
}

async fn run_watch(
    config_path: Option<&Path>,
    path: Option<PathBuf>,
    delay_ms: u64,
    use_colors: bool,
) -> Result<i32> {
    use notify::{Event, RecursiveMode, Watcher};
    use std::time::Duration;

    let watch_path = path.unwrap_or_else(|| PathBuf::from("."));
    let mut config = load_config(config_path)?;

    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel::<Event>();
    let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| match res {
        Ok(event) => {
            // The receiver only goes away when the loop below ends
            let _ = tx.send(event);
        }
        Err(e) => tracing::warn!("Watch error: {}", e),
    })
    .map_err(|e| GuardianError::watch(format!("Failed to create file watcher: {}", e)))?;

    watcher.watch(&watch_path, RecursiveMode::Recursive).map_err(|e| {
        GuardianError::watch(format!("Failed to watch '{}': {}", watch_path.display(), e))
    })?;

    println!("Watching {} (debounce {}ms), press Ctrl+C to stop", watch_path.display(), delay_ms);
    run_watch_pass(&watch_path, &config, use_colors).await;

    let debounce = Duration::from_millis(delay_ms);
    while let Some(event) = rx.recv().await {
        let mut reload = is_config_change(&event);
        if !reload && !should_trigger_analysis(&event, &config) {
            continue;
        }

        // Let a burst of saves settle, then fold it into one run
        tokio::time::sleep(debounce).await;
        while let Ok(event) = rx.try_recv() {
            reload |= is_config_change(&event);
        }

        if reload {
            match load_config(config_path) {
                Ok(reloaded) => {
                    tracing::info!("Configuration reloaded");
                    config = reloaded;
                }
                Err(e) => eprintln!("Failed to reload configuration, keeping the previous one: {:#}", e),
            }
        }

        clear_screen();
        run_watch_pass(&watch_path, &config, use_colors).await;
    }

    Ok(0)
}

/// Whether an event touches a document the configuration would check
fn should_trigger_analysis(event: &notify::Event, config: &GuardianConfig) -> bool {
    use notify::EventKind;

    match event.kind {
        EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_) => {}
        _ => return false,
    }

    event.paths.iter().any(|path| config.is_markdown_path(path))
}

/// Whether an event touches one of the default configuration files
fn is_config_change(event: &notify::Event) -> bool {
    event.paths.iter().any(|path| {
        path.file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| DEFAULT_CONFIG_FILES.contains(&name))
    })
}

async fn run_watch_pass(watch_path: &Path, config: &GuardianConfig, use_colors: bool) {
    let formatter = ReportFormatter::new(ReportOptions { use_colors, ..Default::default() });

    let mut validator = match MarkdownGuardian::new_with_config(config.clone()) {
        Ok(validator) => validator.with_report_formatter(formatter),
        Err(e) => {
            eprintln!("Invalid configuration: {}", e);
            return;
        }
    };

    match validator.validate(vec![watch_path]).await {
        Ok(report) => match validator.format_report(&report, OutputFormat::Human) {
            Ok(formatted) => print!("{}", formatted),
            Err(e) => eprintln!("Failed to format report: {}", e),
        },
        Err(e) => eprintln!("Analysis failed: {}", e),
    }
    println!("Watching for changes...");
}

#[cfg(feature = "cli")]
fn clear_screen() {
    use crossterm::cursor::MoveTo;
    use crossterm::terminal::{Clear, ClearType};

    if let Err(e) = crossterm::execute!(std::io::stdout(), Clear(ClearType::All), MoveTo(0, 0)) {
        tracing::debug!("Could not clear the screen: {}", e);
    }
}

#[cfg(not(feature = "cli"))]
fn clear_screen() {
    println!();
}

fn run_validate_config(config_path: Option<PathBuf>) -> Result<i32> {
    let config_path = config_path
        .or_else(|| GuardianConfig::find_in("."))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILES[0]));

    println!("Validating configuration: {}", config_path.display());

    match GuardianConfig::load_from_file(&config_path) {
        Ok(config) => {
            let enabled = config.enabled_rules().count();

            println!("Configuration is valid");
            println!("  Rules: {} total, {} enabled", RuleId::ALL.len(), enabled);
            println!("  Extensions: {}", config.paths.extensions.join(", "));
            println!("  Path patterns: {}", config.paths.patterns.len());
            println!("  Fingerprint: {}", config.fingerprint());

            Ok(0)
        }
        Err(e) => {
            eprintln!("Configuration validation failed: {}", e);
            Ok(1)
        }
    }
}

fn run_explain(config_path: Option<&Path>, rule_id: &str) -> Result<i32> {
    let Some(id) = RuleId::parse(rule_id) else {
        eprintln!("Rule '{}' not found", rule_id);
        println!();
        println!("Available rules:");
        for id in RuleId::ALL {
            println!("  - {}", id);
        }
        return Ok(1);
    };

    let config = load_config(config_path)?;
    let settings = config.rule_settings(id);
    let rule = builtin_rule(id);

    println!("Rule: {}", id);
    println!("Severity: {}", settings.severity.as_str());
    println!("Enabled: {}", settings.enabled);
    println!();
    println!("{}", rule.description());
    println!();
    println!("{}", rule.explanation());

    Ok(0)
}

fn run_cache_command(action: CacheCommands) -> Result<i32> {
    let cache_path = |file: Option<PathBuf>| file.unwrap_or_else(|| PathBuf::from(DEFAULT_CACHE_PATH));

    match action {
        CacheCommands::Stats { cache_file } => {
            let cache_path = cache_path(cache_file);
            if !cache_path.exists() {
                println!("No cache file found at {}", cache_path.display());
                return Ok(1);
            }

            let mut cache = FileCache::new(&cache_path);
            cache.load()?;

            let stats = cache.statistics();
            println!("Cache Statistics");
            println!("   File: {}", cache_path.display());
            println!("   {}", stats.format_display());
            println!("   Created: {}", format_timestamp(stats.created_at));
            println!("   Updated: {}", format_timestamp(stats.updated_at));

            Ok(0)
        }
        CacheCommands::Clear { cache_file } => {
            let cache_path = cache_path(cache_file);
            let mut cache = FileCache::new(&cache_path);
            cache.load()?;
            cache.clear()?;

            println!("Cache cleared: {}", cache_path.display());
            Ok(0)
        }
        CacheCommands::Cleanup { cache_file } => {
            let cache_path = cache_path(cache_file);
            if !cache_path.exists() {
                println!("No cache file found at {}", cache_path.display());
                return Ok(1);
            }

            let mut cache = FileCache::new(&cache_path);
            cache.load()?;
            let removed = cache.cleanup()?;
            cache.save()?;

            println!("Cleaned up {} stale cache entries", removed);
            Ok(0)
        }
    }
}

fn run_list_rules(config_path: Option<&Path>, enabled_only: bool) -> Result<i32> {
    let config = load_config(config_path)?;

    println!("Available Rules\n");
    for id in RuleId::ALL {
        let settings = config.rule_settings(id);
        if enabled_only && !settings.enabled {
            continue;
        }

        let status = if settings.enabled { "on " } else { "off" };
        println!(
            "  [{}] {} ({}) - {}",
            status,
            id,
            settings.severity.as_str(),
            builtin_rule(id).description()
        );
    }

    Ok(0)
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn format_timestamp(timestamp: u64) -> String {
    use chrono::{TimeZone, Utc};

    let dt = Utc.timestamp_opt(timestamp as i64, 0).single().unwrap_or_else(Utc::now);
    dt.format("%Y-%m-%d %H:%M:%S UTC").to_string()
}
