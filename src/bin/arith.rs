use std::path::PathBuf;

use anyhow::{Context, Result};
use arith::file::{decode_file, default_output, encode_file, FileStats, Mode};
use arith::CoderConfig;
use clap::{Parser, Subcommand};
use tracing::{info, Level};

#[derive(Parser)]
#[command(name = "arith")]
#[command(about = "Adaptive arithmetic coder")]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compress a file
    Encode {
        /// Input file path
        input: PathBuf,
        /// Output file path (default: <INPUT>.arith)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Print input size, output size and compression ratio
        #[arg(long)]
        ratio: bool,
    },
    /// Decompress a file
    Decode {
        /// Input file path
        input: PathBuf,
        /// Output file path (default: <INPUT>.decoded)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Print input size, output size and compression ratio
        #[arg(long)]
        ratio: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    let config = CoderConfig::default();
    let (mode, input, output, ratio) = match cli.command {
        Commands::Encode {
            input,
            output,
            ratio,
        } => (Mode::Encode, input, output, ratio),
        Commands::Decode {
            input,
            output,
            ratio,
        } => (Mode::Decode, input, output, ratio),
    };
    let output = output.unwrap_or_else(|| default_output(&input, mode));

    let stats = match mode {
        Mode::Encode => encode_file(&input, &output, config)
            .with_context(|| format!("failed to encode {}", input.display()))?,
        Mode::Decode => decode_file(&input, &output, config)
            .with_context(|| format!("failed to decode {}", input.display()))?,
    };

    info!(path = %output.display(), "finished");
    info!(
        input_bytes = stats.input_bytes,
        output_bytes = stats.output_bytes,
        elapsed = ?stats.elapsed,
        "time taken"
    );
    if ratio {
        print_ratio(&stats);
    }
    Ok(())
}

fn print_ratio(stats: &FileStats) {
    println!("input size: {}", stats.input_bytes);
    println!("output size: {}", stats.output_bytes);
    println!("ratio: {:.4}", stats.ratio());
}
