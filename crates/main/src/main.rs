use std::io;
use std::path::PathBuf;

use clap::Parser;
use log::debug;

/// Generates a PDF invoice from JSON read on standard input.
#[derive(Parser)]
#[command(author, version, about)]
struct Cli {
    /// Path to the PDF file to create; an existing file is overwritten.
    #[arg(long, value_name = "PATH")]
    output: PathBuf,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    debug!("Rendering invoice to {}", cli.output.display());
    if let Err(err) = invoice_pdf::convert(io::stdin().lock(), &cli.output) {
        eprintln!("{}", err);
        std::process::exit(1);
    }
}
