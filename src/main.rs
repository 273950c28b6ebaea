// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Result, Context};
use log::{warn, LevelFilter, Log, Metadata, Record, Level, SetLoggerError};
use std::io::Write;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use clap::{Parser, ValueEnum, CommandFactory, Subcommand, Args};
use clap_complete::{generate, Shell};

use crate::app_config::Config;
use app_controller::{Controller, SubsetOptions};

mod app_config;
mod app_controller;
mod ass_usage;
mod embed_codec;
mod errors;
mod file_utils;
mod font_index;
mod font_matcher;
mod subset_orchestrator;

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Analyze an ASS file and show which fonts and characters it uses
    Analyze {
        /// Input subtitle file
        #[arg(value_name = "ASS_FILE")]
        ass_file: PathBuf,
    },

    /// Subset fonts based on an ASS file's character usage
    Subset(SubsetArgs),

    /// Show name-table information about a font file
    Info {
        /// Font file to inspect
        #[arg(value_name = "FONT_FILE")]
        font_file: PathBuf,
    },

    /// Generate shell completions for fontsub
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Args, Debug)]
struct SubsetArgs {
    /// Input subtitle file
    #[arg(value_name = "ASS_FILE")]
    ass_file: PathBuf,

    /// Directory containing font files (TTF, OTF, collections)
    #[arg(short = 'd', long)]
    fonts_dir: PathBuf,

    /// Output directory for subsetted fonts (default: same as ASS file)
    #[arg(short = 'o', long)]
    output_dir: Option<PathBuf>,

    /// Embed subsetted fonts directly into the ASS file
    #[arg(long)]
    embed: bool,

    /// Output ASS file path when using --embed (default: <name>.embedded.ass)
    #[arg(long, requires = "embed")]
    output_ass: Option<PathBuf>,

    /// Show what would be done without creating files
    #[arg(long)]
    dry_run: bool,
}

/// fontsub - Font subsetting tool for ASS subtitle files
///
/// Extracts the fonts and characters an ASS file actually uses, creates
/// subsetted font files containing only those characters, and optionally
/// embeds the fonts directly into the subtitle file.
#[derive(Parser, Debug)]
#[command(name = "fontsub")]
#[command(version = "0.1.0")]
#[command(about = "Font subsetting tool for ASS subtitle files")]
#[command(long_about = "fontsub analyzes ASS subtitles for font usage, subsets the matching \
font files down to the characters actually rendered, and can embed the result into the \
subtitle's [Fonts] section.

EXAMPLES:
    fontsub analyze sub.ass                      # Show which fonts sub.ass needs
    fontsub subset sub.ass -d ./fonts/           # Create .subset.ttf files
    fontsub subset sub.ass -d ./fonts/ --embed   # Embed fonts into the ASS file
    fontsub info ./NotoSansCJK.ttf               # Inspect a font's names
    fontsub completions bash > fontsub.bash      # Generate bash completions

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config-path. If the config file doesn't exist, a default
    one will be created automatically.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json", global = true)]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum, global = true)]
    log_level: Option<CliLogLevel>,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        let logger = Box::new(CustomLogger::new(level));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: ANSI color for log level
    fn get_color_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "\x1B[1;31m",
            Level::Warn => "\x1B[1;33m",
            Level::Info => "\x1B[1;32m",
            Level::Debug => "\x1B[1;36m",
            Level::Trace => "\x1B[1;35m",
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let color = Self::get_color_for_level(record.level());

            let mut stderr = std::io::stderr();
            let _ = writeln!(stderr, "{}{} {}\x1B[0m", color, now, record.args());
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize the logger once with info level by default
    // We'll update the level after loading the config if needed
    CustomLogger::init(LevelFilter::Info)?;

    // Parse command line arguments using clap
    let cli = CommandLineOptions::parse();

    // If log level is set via command line, apply it immediately
    if let Some(cmd_log_level) = &cli.log_level {
        log::set_max_level(to_level_filter(&cmd_log_level.clone().into()));
    }

    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = CommandLineOptions::command();
        generate(*shell, &mut cmd, "fontsub", &mut std::io::stdout());
        return Ok(());
    }

    let config = load_config(&cli.config_path, cli.log_level.as_ref())?;

    // If log level was not set via command line, update it from config now
    if cli.log_level.is_none() {
        log::set_max_level(to_level_filter(&config.log_level));
    }

    let controller = Controller::with_config(config)?;

    match cli.command {
        Commands::Analyze { ass_file } => controller.run_analyze(&ass_file),
        Commands::Subset(args) => {
            controller
                .run_subset(SubsetOptions {
                    ass_file: args.ass_file,
                    fonts_dir: args.fonts_dir,
                    output_dir: args.output_dir,
                    embed: args.embed,
                    output_ass: args.output_ass,
                    dry_run: args.dry_run,
                })
                .await
        }
        Commands::Info { font_file } => controller.run_info(&font_file),
        Commands::Completions { .. } => unreachable!("handled above"),
    }
}

// @loads: Config from disk, creating a default one when missing
fn load_config(config_path: &str, log_level: Option<&CliLogLevel>) -> Result<Config> {
    let config = if Path::new(config_path).exists() {
        // Load existing configuration
        let file = File::open(config_path)
            .context(format!("Failed to open config file: {}", config_path))?;

        let reader = BufReader::new(file);
        let mut config: Config = serde_json::from_reader(reader)
            .context(format!("Failed to parse config file: {}", config_path))?;

        if let Some(level) = log_level {
            config.log_level = level.clone().into();
        }

        config
    } else {
        // Create default configuration if not exists
        warn!("Config file not found at '{}', creating default config.", config_path);

        let mut config = Config::default();

        if let Some(level) = log_level {
            config.log_level = level.clone().into();
        }

        let config_json = serde_json::to_string_pretty(&config)
            .context("Failed to serialize default config to JSON")?;

        std::fs::write(config_path, config_json)
            .context(format!("Failed to write default config to file: {}", config_path))?;

        config
    };

    config.validate().context("Configuration validation failed")?;

    Ok(config)
}

// @converts: Config log level to the log crate's filter
fn to_level_filter(level: &app_config::LogLevel) -> LevelFilter {
    match level {
        app_config::LogLevel::Error => LevelFilter::Error,
        app_config::LogLevel::Warn => LevelFilter::Warn,
        app_config::LogLevel::Info => LevelFilter::Info,
        app_config::LogLevel::Debug => LevelFilter::Debug,
        app_config::LogLevel::Trace => LevelFilter::Trace,
    }
}
