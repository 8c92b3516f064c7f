// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Result, anyhow, Context};
use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use log::{error, LevelFilter, Log, Metadata, Record, Level, SetLoggerError};
use std::io::Write;
use std::path::PathBuf;

use subcorrect::app_config::{self, Config, ProviderKind};
use subcorrect::app_controller::Controller;

/// CLI Wrapper for ProviderKind to implement ValueEnum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliProvider {
    Gemini,
    Ollama,
    Anthropic,
}

impl From<CliProvider> for ProviderKind {
    fn from(cli_provider: CliProvider) -> Self {
        match cli_provider {
            CliProvider::Gemini => ProviderKind::Gemini,
            CliProvider::Ollama => ProviderKind::Ollama,
            CliProvider::Anthropic => ProviderKind::Anthropic,
        }
    }
}

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, Copy, ValueEnum)]
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
    /// Correct a subtitle file against its source transcript
    Correct {
        /// Reference transcript (UTF-8 text, markup allowed)
        #[arg(value_name = "TRANSCRIPT")]
        transcript: PathBuf,

        /// Subtitle file produced by speech recognition
        #[arg(value_name = "SUBTITLES")]
        subtitles: PathBuf,

        /// Directory for the corrected file and report (defaults to the subtitle's directory)
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// Target entries per batch (must exceed 2); two context entries come on top
        #[arg(short, long)]
        batch_size: Option<usize>,

        /// Force overwrite of existing output files
        #[arg(short, long)]
        force_overwrite: bool,
    },

    /// Stretch subtitle timestamps to the measured audio duration
    Rescale {
        /// Subtitle file to rescale
        subtitles: PathBuf,

        /// True audio duration in seconds
        #[arg(short, long)]
        duration: f64,

        /// Output file (defaults to <name>.rescaled.srt)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Merge per-segment subtitle files into one track
    Merge {
        /// Subtitle files or directories, ordered by numeric file-name prefix
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Merged output file
        #[arg(short, long)]
        output: PathBuf,

        /// Language of the subtitles (overrides config)
        #[arg(short, long)]
        language: Option<String>,
    },

    /// Replace homophones in a text file using the configured dictionary
    Homophones {
        /// Text file to process
        input: PathBuf,

        /// Output file (defaults to <name>.replaced.txt)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// JSON dictionary (overrides config)
        #[arg(short, long)]
        dictionary: Option<PathBuf>,
    },

    /// Test the connection to the configured provider
    CheckProvider,

    /// Generate shell completions for subcorrect
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Options shared by every subcommand
#[derive(Args, Debug)]
struct GlobalOptions {
    /// Configuration file path
    #[arg(short, long, global = true, default_value = "conf.json")]
    config_path: String,

    /// AI provider to use
    #[arg(short, long, global = true, value_enum)]
    provider: Option<CliProvider>,

    /// Model name for the provider
    #[arg(short, long, global = true)]
    model: Option<String>,

    /// API key for the provider
    #[arg(long, global = true, env = "SUBCORRECT_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Set logging level
    #[arg(long, global = true, value_enum)]
    log_level: Option<CliLogLevel>,
}

#[derive(Parser, Debug)]
#[command(
    name = "subcorrect",
    author,
    version,
    about = "Correct speech-recognition subtitles against a source transcript with AI",
    after_help = "EXAMPLES:
    subcorrect correct script.txt talk.srt               # Writes talk.corrected.srt and talk.corrections.txt
    subcorrect correct -b 10 -p ollama script.txt talk.srt
    subcorrect rescale -d 93.4 talk.srt                  # Fit timestamps to the real audio length
    subcorrect merge -o full.srt segments/               # Join 1_*.srt, 2_*.srt, ... in order
    subcorrect homophones script.txt                     # Dictionary replacement for speech synthesis
    subcorrect completions bash > subcorrect.bash

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config-path. If the config file doesn't exist, a default one
    will be created automatically.

SUPPORTED PROVIDERS:
    gemini    - Google Gemini API (requires API key)
    ollama    - Local Ollama server
    anthropic - Anthropic API (requires API key)")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    global: GlobalOptions,
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
        // Filtering is left to log::max_level so it can change after init
        let logger = Box::new(CustomLogger::new(LevelFilter::Trace));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: Emoji for log level
    fn get_emoji_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "❌",
            Level::Warn => "🚧",
            Level::Info => "",
            Level::Debug => "🔍",
            Level::Trace => "📋",
        }
    }

    // @returns: ANSI colour for log level
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
            let level = record.level();
            let _ = writeln!(
                std::io::stderr(),
                "{}{} {} {}\x1B[0m",
                Self::get_color_for_level(level),
                now,
                Self::get_emoji_for_level(level),
                record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    CustomLogger::init(LevelFilter::Info)?;

    let cli = CommandLineOptions::parse();

    if let Commands::Completions { shell } = cli.command {
        let mut cmd = CommandLineOptions::command();
        generate(shell, &mut cmd, "subcorrect", &mut std::io::stdout());
        return Ok(());
    }

    // Command line log level applies before the config is read
    if let Some(level) = cli.global.log_level {
        log::set_max_level(app_config::LogLevel::from(level).to_level_filter());
    }

    let mut config = load_config(&cli.global)?;

    match cli.command {
        Commands::Correct { transcript, subtitles, output_dir, batch_size, force_overwrite } => {
            if let Some(batch_size) = batch_size {
                config.correction.batch_size = batch_size;
            }
            config.validate().context("Configuration validation failed")?;

            let controller = Controller::with_config(config)?;
            let files = controller
                .correct_file(&transcript, &subtitles, output_dir.as_deref(), force_overwrite)
                .await?;
            if !files.skipped {
                println!("{}", files.subtitles.display());
                println!("{}", files.report.display());
            }
        }
        Commands::Rescale { subtitles, duration, output } => {
            if !duration.is_finite() || duration < 0.0 {
                return Err(anyhow!("Duration must be a non-negative number of seconds"));
            }
            let controller = Controller::with_config(config)?;
            let path = controller.rescale_file(&subtitles, duration, output.as_deref())?;
            println!("{}", path.display());
        }
        Commands::Merge { inputs, output, language } => {
            if let Some(language) = language {
                config.language = language;
            }
            let controller = Controller::with_config(config)?;
            controller.merge_files(&inputs, &output)?;
            println!("{}", output.display());
        }
        Commands::Homophones { input, output, dictionary } => {
            if dictionary.is_some() {
                config.homophone_dictionary = dictionary;
            }
            let controller = Controller::with_config(config)?;
            let files = controller.replace_homophones_file(&input, output.as_deref())?;
            println!("{}", files.text.display());
            println!("{}", files.report.display());
        }
        Commands::CheckProvider => {
            config.validate().context("Configuration validation failed")?;
            Controller::with_config(config)?.check_provider().await?;
        }
        Commands::Completions { .. } => {}
    }

    Ok(())
}

/// Read the config file and apply command line overrides
fn load_config(options: &GlobalOptions) -> Result<Config> {
    let mut config = Config::load_or_create(&options.config_path)?;

    if let Some(provider) = options.provider {
        config.providers.provider = provider.into();
    }

    let kind = config.providers.provider;
    if let Some(model) = &options.model {
        config.providers.get_or_insert_mut(kind).model = model.clone();
    }
    if let Some(api_key) = &options.api_key {
        config.providers.get_or_insert_mut(kind).api_key = api_key.clone();
    }

    match options.log_level {
        Some(level) => config.log_level = level.into(),
        None => log::set_max_level(config.log_level.to_level_filter()),
    }

    Ok(config)
}
