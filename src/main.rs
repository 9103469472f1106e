//! lconf - inspect relaxed-JSON configuration files
//!
//! Usage:
//!     lconf get <FILE> <KEY>
//!     lconf dump <FILE> [--format json|yaml] [--section KEY]
//!     lconf watch <FILE> [--interval 2s]
//!
//! See --help for more options.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{error, info};

use lconf::util::{init_logging, LogFormat, StopSignal, LOG_ENV};
use lconf::{load_file, Conf, ConfWatcher, LoadOptions, Value};

/// Inspect hierarchical relaxed-JSON configuration.
#[derive(Parser, Debug)]
#[command(name = "lconf")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, value_name = "LEVEL", default_value = "warn", env = LOG_ENV)]
    log_level: String,

    /// Log output format
    #[arg(long, value_enum, default_value_t = LogFormat::Pretty)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the value at a key path
    Get {
        /// Configuration file
        file: PathBuf,
        /// Key path such as `http.ports[0]`
        key: String,
    },

    /// Print the fully resolved configuration
    Dump {
        /// Configuration file
        file: PathBuf,
        /// Only print this section
        #[arg(short, long, value_name = "KEY")]
        section: Option<String>,
        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,
    },

    /// Print the configuration every time it changes
    Watch {
        /// Configuration file
        file: PathBuf,
        /// Polling interval
        #[arg(short, long, default_value = "2s", value_parser = humantime::parse_duration)]
        interval: Duration,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum OutputFormat {
    Json,
    Yaml,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level, cli.log_format);

    match cli.command {
        Command::Get { file, key } => get(&file, &key),
        Command::Dump {
            file,
            section,
            format,
        } => dump(&file, section.as_deref(), format),
        Command::Watch { file, interval } => watch(&file, interval),
    }
}

fn load_conf(file: &Path) -> Result<Conf> {
    load_file(file)
        .with_context(|| format!("failed to load configuration from '{}'", file.display()))
}

fn get(file: &Path, key: &str) -> Result<()> {
    let conf = load_conf(file)?;
    match conf.get(key) {
        Some(Value::String(s)) => println!("{}", s),
        Some(value) => println!("{}", serde_json::to_string_pretty(value)?),
        None => bail!("key '{}' not found in '{}'", key, conf.path().display()),
    }
    Ok(())
}

fn dump(file: &Path, section: Option<&str>, format: OutputFormat) -> Result<()> {
    let mut conf = load_conf(file)?;
    if let Some(key) = section {
        conf = conf.section(key)?;
    }
    print_conf(&conf, format)
}

fn print_conf(conf: &Conf, format: OutputFormat) -> Result<()> {
    let text = match format {
        OutputFormat::Json => serde_json::to_string_pretty(conf.root())?,
        OutputFormat::Yaml => serde_yaml::to_string(conf.root())?,
    };
    println!("{}", text.trim_end());
    Ok(())
}

fn watch(file: &Path, interval: Duration) -> Result<()> {
    let conf = load_conf(file)?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to create tokio runtime")?;

    runtime.block_on(async move {
        print_conf(&conf, OutputFormat::Json)?;

        let watcher = ConfWatcher::new(conf, LoadOptions::default(), interval);
        let mut updates = watcher.subscribe();
        let stop = StopSignal::new();
        let mut task = tokio::spawn(watcher.run(stop.subscribe()));

        info!(path = %file.display(), "watching for changes, press Ctrl+C to stop");

        loop {
            tokio::select! {
                changed = updates.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let conf = updates.borrow_and_update().clone();
                    print_conf(&conf, OutputFormat::Json)?;
                }

                result = &mut task => {
                    return match result.context("watcher task panicked")? {
                        Ok(()) => Ok(()),
                        Err(e) => {
                            error!(error = %e, "watcher stopped");
                            Err(e.into())
                        }
                    };
                }

                _ = tokio::signal::ctrl_c() => {
                    info!("received shutdown signal");
                    break;
                }
            }
        }

        stop.stop();
        task.await.context("watcher task panicked")??;
        Ok::<(), anyhow::Error>(())
    })
}
