//! # hdtinfo
//!
//! Prints the header section of an HDT file as N-Triples, without ever loading the
//! dictionary or triples sections: memory use is bounded by the header size alone.
//!
//! ## Usage
//! ```text
//! hdtinfo dataset.hdt [--output header.nt]
//! ```

use clap::Parser;
use color_eyre::config::HookBuilder;
use color_eyre::eyre::{Report, WrapErr};
use hdt::containers::ControlInfo;
use hdt::header::Header;
use std::fs::File;
use std::io::{BufReader, Write};

#[derive(Parser)]
#[command(version, about = "Prints the header section of an HDT file as N-Triples.")]
struct Args {
    /// The HDT file to inspect.
    hdt_file: String,

    /// Write the header to this file instead of stdout.
    #[arg(short, long)]
    output: Option<String>,
}

fn main() -> Result<(), Report> {
    HookBuilder::default().display_env_section(false).install()?;
    env_logger::init();
    let args = Args::parse();

    let file = File::open(&args.hdt_file).wrap_err_with(|| format!("error opening {}", args.hdt_file))?;
    let mut reader = BufReader::new(file);
    ControlInfo::read(&mut reader).wrap_err("error reading global control info")?;
    let header = Header::read(&mut reader).wrap_err("error reading header section")?;

    let mut out: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(File::create(path).wrap_err_with(|| format!("error creating {path}"))?),
        None => Box::new(std::io::stdout()),
    };
    for triple in &header.body {
        writeln!(out, "{triple}")?;
    }
    Ok(())
}
