use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use ips::Patcher;
use tracing::Level;

#[derive(Parser)]
#[command(
    name = "ips",
    about = "Apply an IPS binary patch to a file",
    version,
    long_about = "Applies a patch in the IPS (International Patching System) format \
                  to a target file, writing the patched result to a new output file."
)]
struct Cli {
    /// Set the logging level
    #[arg(short, long, value_enum, default_value = "info")]
    log_level: LogLevel,

    /// IPS patch file
    patch: PathBuf,

    /// Original file to patch
    input: PathBuf,

    /// Where to write the patched output (overwritten if present)
    output: PathBuf,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl From<LogLevel> for Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => Level::TRACE,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Info => Level::INFO,
            LogLevel::Warn => Level::WARN,
            LogLevel::Error => Level::ERROR,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(Level::from(cli.log_level))
        .with_target(false)
        .init();

    let patch = BufReader::new(
        File::open(&cli.patch)
            .with_context(|| format!("failed to open patch {}", cli.patch.display()))?,
    );
    let input = BufReader::new(
        File::open(&cli.input)
            .with_context(|| format!("failed to open input {}", cli.input.display()))?,
    );
    let mut output = File::create(&cli.output)
        .with_context(|| format!("failed to create output {}", cli.output.display()))?;

    let written = Patcher::new(patch, input)
        .apply(&mut output)
        .with_context(|| format!("failed to apply {}", cli.patch.display()))?;

    tracing::info!("Patched {}: {written} bytes written", cli.output.display());
    Ok(())
}
