//! prproj-titles CLI
//!
//! Save the titles embedded in a Premiere Pro project as XML files.

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use prproj_titles::{TitleExtractor, TitleWriter};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "prproj-titles")]
#[command(version)]
#[command(about = "Extract embedded titles from a Premiere Pro project file")]
struct Cli {
    /// A Premiere Pro .prproj file
    file: PathBuf,

    /// Directory to write titles to (default: next to the project file)
    #[arg(short = 'o', long)]
    output_dir: Option<PathBuf>,

    /// List the files that would be written, write nothing
    #[arg(short = 'n', long)]
    dry_run: bool,

    /// Verbose output (repeat for more)
    #[arg(short, long, action = ArgAction::Count, conflicts_with = "quiet")]
    verbose: u8,

    /// Only print errors
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(&cli);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_logging(cli: &Cli) {
    let level = if cli.quiet {
        "error"
    } else {
        match cli.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(level))
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();
}

fn run(cli: &Cli) -> Result<()> {
    let result = TitleExtractor::new().extract_file(&cli.file)?;

    let mut writer = TitleWriter::new(&cli.file);
    if let Some(dir) = &cli.output_dir {
        writer = writer.with_output_dir(dir);
    }

    if cli.dry_run {
        for path in writer.planned_paths(result.len()) {
            println!("Would write: {}", path.display());
        }
        println!("{} titles found, nothing written", result.len());
        return Ok(());
    }

    if let Some(dir) = &cli.output_dir {
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create output directory: {}", dir.display()))?;
    }

    let written = writer.write_all(&result.titles)?;

    if cli.verbose > 0 {
        for path in &written {
            println!("Wrote: {}", path.display());
        }
    }

    println!(
        "Done! {} titles saved as XML files in {}",
        written.len(),
        output_location(cli).display()
    );

    Ok(())
}

fn output_location(cli: &Cli) -> PathBuf {
    cli.output_dir
        .clone()
        .or_else(|| cli.file.parent().map(Path::to_path_buf))
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from("."))
}
