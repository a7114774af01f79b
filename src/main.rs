//! keymouse - keyboard-driven pointer control
//!
//! Entry point for the command line tool.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use keymouse::config::{Config, ConfigOverrides};
use keymouse::input::StaticKeyResolver;
use keymouse::session::{run_replay, Trace};

/// Command-line arguments for keymouse
#[derive(Parser, Debug)]
#[command(name = "keymouse")]
#[command(version, about = "Drive the mouse pointer from the keyboard", long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Verbose logging (can be specified multiple times)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Log format (json|pretty|compact)
    #[arg(long, default_value = "pretty", global = true)]
    pub log_format: String,

    /// Write logs to file (in addition to stderr)
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    #[command(flatten)]
    pub tuning: TuningArgs,
}

/// Settings that override the defaults
#[derive(clap::Args, Debug, Default)]
pub struct TuningArgs {
    /// Hold time before a direction key starts moving (ms)
    #[arg(long, env = "KEYMOUSE_INITIAL_DELAY_MS", global = true)]
    pub initial_delay_ms: Option<u64>,

    /// Auto-repeat debounce window (ms)
    #[arg(long, env = "KEYMOUSE_DEBOUNCE_MS", global = true)]
    pub debounce_ms: Option<u64>,

    /// Tick interval while moving (ms)
    #[arg(long, env = "KEYMOUSE_TICK_MS", global = true)]
    pub tick_ms: Option<u64>,

    /// Maximum pointer speed (pixels per tick)
    #[arg(long, env = "KEYMOUSE_MAX_SPEED", global = true)]
    pub max_speed: Option<u32>,

    /// Keyboard layout (us|de|fr)
    #[arg(long, env = "KEYMOUSE_LAYOUT", global = true)]
    pub layout: Option<String>,

    /// Key moving the pointer up
    #[arg(long, env = "KEYMOUSE_KEY_UP", global = true)]
    pub key_up: Option<String>,

    /// Key moving the pointer down
    #[arg(long, env = "KEYMOUSE_KEY_DOWN", global = true)]
    pub key_down: Option<String>,

    /// Key moving the pointer left
    #[arg(long, env = "KEYMOUSE_KEY_LEFT", global = true)]
    pub key_left: Option<String>,

    /// Key moving the pointer right
    #[arg(long, env = "KEYMOUSE_KEY_RIGHT", global = true)]
    pub key_right: Option<String>,

    /// Key holding the left button
    #[arg(long, env = "KEYMOUSE_KEY_LEFT_CLICK", global = true)]
    pub key_left_click: Option<String>,

    /// Key holding the middle button
    #[arg(long, env = "KEYMOUSE_KEY_MIDDLE_CLICK", global = true)]
    pub key_middle_click: Option<String>,

    /// Key holding the right button
    #[arg(long, env = "KEYMOUSE_KEY_RIGHT_CLICK", global = true)]
    pub key_right_click: Option<String>,

    /// Key completing the trigger combination
    #[arg(long, env = "KEYMOUSE_TRIGGER_KEY", global = true)]
    pub trigger_key: Option<String>,

    /// Key leaving mouse mode
    #[arg(long, env = "KEYMOUSE_LEAVE_KEY", global = true)]
    pub leave_key: Option<String>,

    /// Leave mouse mode after this many idle seconds (0 = never)
    #[arg(long, env = "KEYMOUSE_IDLE_TIMEOUT", global = true)]
    pub idle_timeout: Option<u64>,
}

impl From<TuningArgs> for ConfigOverrides {
    fn from(args: TuningArgs) -> Self {
        ConfigOverrides {
            initial_delay_ms: args.initial_delay_ms,
            debounce_ms: args.debounce_ms,
            tick_interval_ms: args.tick_ms,
            max_speed: args.max_speed,
            keyboard_layout: args.layout,
            up: args.key_up,
            down: args.key_down,
            left: args.key_left,
            right: args.key_right,
            left_click: args.key_left_click,
            middle_click: args.key_middle_click,
            right_click: args.key_right_click,
            trigger_key: args.trigger_key,
            leave_key: args.leave_key,
            idle_timeout_secs: args.idle_timeout,
        }
    }
}

/// Subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the mode loop over a recorded key trace and print the pointer output
    Replay {
        /// JSON trace file
        trace: PathBuf,

        /// Print the full report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the acceleration curve
    Curve {
        /// Last hold time to print (ms)
        #[arg(long, default_value = "2000")]
        until_ms: u64,

        /// Hold time step (ms)
        #[arg(long, default_value = "100")]
        step_ms: u64,
    },

    /// Print the effective configuration as JSON
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let _log_guard = init_logging(&args)?;

    info!("════════════════════════════════════════════════════════");
    info!("  keymouse v{}", env!("CARGO_PKG_VERSION"));
    info!("  Built: {}", env!("BUILD_DATE"));
    info!("  Commit: {}", env!("GIT_HASH"));
    info!("  Profile: {}", if cfg!(debug_assertions) { "debug" } else { "release" });
    info!("════════════════════════════════════════════════════════");

    if let Err(e) = run(args).await {
        tracing::error!("{:#}", e);
        eprintln!("{}", keymouse::utils::format_user_error(&e));
        return Err(e);
    }

    Ok(())
}

async fn run(args: Args) -> Result<()> {
    let config = Config::default_config().with_overrides(args.tuning.into());
    config.validate().context("Invalid configuration")?;
    tracing::debug!("Config: {:?}", config);

    match args.command {
        Command::Config => {
            println!("{}", config.to_json()?);
        }
        Command::Curve { until_ms, step_ms } => {
            print_curve(&config, until_ms, step_ms)?;
        }
        Command::Replay { trace, json } => {
            let trace = Trace::load(&trace)
                .with_context(|| format!("Failed to load trace {}", trace.display()))?;
            let resolver = StaticKeyResolver::with_layout(&config.input.keyboard_layout);

            let report = run_replay(&config, &resolver, &trace).await?;

            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                for action in &report.actions {
                    println!("{:>8} ms  {:?}", action.at_ms, action.kind);
                }
                for (index, session) in report.sessions.iter().enumerate() {
                    println!(
                        "session {}: {:?} after {} ms, {} moves, {} button events",
                        index + 1,
                        session.exit,
                        session.duration_ms,
                        session.pointer_moves,
                        session.button_events
                    );
                }
            }
        }
    }

    Ok(())
}

fn print_curve(config: &Config, until_ms: u64, step_ms: u64) -> Result<()> {
    if step_ms == 0 {
        anyhow::bail!("Invalid step: step_ms must be greater than 0");
    }

    let curve = config.motion.curve();
    let ticks_per_second = 1000 / config.motion.tick_interval_ms.max(1);

    println!("{:>8}  {:>5}  {:>8}", "held_ms", "speed", "px/s");
    for held in (curve.initial_delay_ms..=until_ms).step_by(step_ms as usize) {
        let speed = curve.speed(held);
        println!(
            "{:>8}  {:>5}  {:>8}",
            held,
            speed,
            u64::from(speed) * ticks_per_second
        );
    }

    Ok(())
}

fn init_logging(args: &Args) -> Result<Option<WorkerGuard>> {
    let log_level = match args.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new(format!("keymouse={level},warn", level = log_level))
    });

    // If log file is specified, write to both stderr and file
    if let Some(log_file_path) = &args.log_file {
        let directory = log_file_path
            .parent()
            .filter(|dir| !dir.as_os_str().is_empty())
            .unwrap_or_else(|| std::path::Path::new("."));
        let file_name = log_file_path
            .file_name()
            .context("Log file path has no file name")?;

        let appender = tracing_appender::rolling::never(directory, file_name);
        let (file, guard) = tracing_appender::non_blocking(appender);

        match args.log_format.as_str() {
            "json" => {
                tracing_subscriber::registry()
                    .with(env_filter)
                    .with(
                        tracing_subscriber::fmt::layer()
                            .json()
                            .with_writer(std::io::stderr),
                    )
                    .with(
                        tracing_subscriber::fmt::layer()
                            .json()
                            .with_writer(file)
                            .with_ansi(false),
                    )
                    .init();
            }
            "compact" => {
                tracing_subscriber::registry()
                    .with(env_filter)
                    .with(
                        tracing_subscriber::fmt::layer()
                            .compact()
                            .with_writer(std::io::stderr),
                    )
                    .with(
                        tracing_subscriber::fmt::layer()
                            .compact()
                            .with_writer(file)
                            .with_ansi(false),
                    )
                    .init();
            }
            _ => {
                tracing_subscriber::registry()
                    .with(env_filter)
                    .with(
                        tracing_subscriber::fmt::layer()
                            .pretty()
                            .with_writer(std::io::stderr),
                    )
                    .with(
                        tracing_subscriber::fmt::layer()
                            .with_writer(file)
                            .with_ansi(false),
                    )
                    .init();
            }
        }
        info!("Logging to file: {}", log_file_path.display());
        Ok(Some(guard))
    } else {
        match args.log_format.as_str() {
            "json" => {
                tracing_subscriber::registry()
                    .with(env_filter)
                    .with(
                        tracing_subscriber::fmt::layer()
                            .json()
                            .with_writer(std::io::stderr),
                    )
                    .init();
            }
            "compact" => {
                tracing_subscriber::registry()
                    .with(env_filter)
                    .with(
                        tracing_subscriber::fmt::layer()
                            .compact()
                            .with_writer(std::io::stderr),
                    )
                    .init();
            }
            _ => {
                tracing_subscriber::registry()
                    .with(env_filter)
                    .with(
                        tracing_subscriber::fmt::layer()
                            .pretty()
                            .with_writer(std::io::stderr),
                    )
                    .init();
            }
        }
        Ok(None)
    }
}
