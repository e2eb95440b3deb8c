// Copyright (c) 2024-2025, Decisym, LLC
//! # rdf2hdt Converter
//!
//! Converts RDF data into HDT format. Parses RDF input with `oxrdfio`, merging it into a
//! temporary N-Triples file if it isn't one already, then builds and writes the HDT output.
//!
//! ## Usage
//! ```text
//! rdf2hdt convert --input data.ttl --output result.hdt
//! ```

use clap::{Parser, Subcommand};
use color_eyre::config::HookBuilder;
use color_eyre::eyre::{Report, WrapErr};
use hdt::rdf2hdt::builder::{Options, build_hdt};

/// Command-line interface for the rdf2hdt converter.
#[derive(Parser)]
#[command(version, about = "Converts RDF data into HDT format.")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    #[command(flatten)]
    verbose: clap_verbosity_flag::Verbosity,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert RDF to HDT.
    Convert {
        /// Path to input RDF file(s). Supported formats: <https://crates.io/crates/oxrdfio>.
        #[arg(short, long, num_args = 1..)]
        input: Vec<String>,

        /// Path to the HDT file to create.
        #[arg(short, long)]
        output: String,

        /// Block size used during term compression: every Nth term is stored in full,
        /// the others only store what remains after stripping the shared prefix with
        /// the previous term in the block.
        #[arg(short, long, default_value_t = 16)]
        block_size: usize,
    },
}

fn main() -> Result<(), Report> {
    HookBuilder::default().display_env_section(false).install()?;
    let cli = Cli::parse();
    env_logger::Builder::new().filter_level(cli.verbose.log_level_filter()).init();

    match cli.command {
        Commands::Convert { input, output, block_size } => {
            build_hdt(input.clone(), &output, Options { block_size, order: "SPO".to_string() })
                .map_err(|e| Report::msg(e.to_string()))
                .wrap_err_with(|| format!("error converting {input:?} to {output}"))?;
        }
    }
    Ok(())
}
