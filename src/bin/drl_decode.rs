//! Decode a serialized deltarun artifact back to quantized codes.

use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use anyhow::{anyhow, bail, Context, Result};
use clap::Parser;
use deltarun::artifacts::{self, Artifact};
use deltarun::quantize::dequantize;
use log::info;

#[derive(Parser, Debug)]
#[command(name = "deltarun-decode")]
#[command(about = "Decode a serialized deltarun artifact and print the codes it carries")]
struct Args {
    /// Serialized artifact (e.g. station.drle.bin)
    input: PathBuf,

    /// Artifact kind (default: inferred from the file name)
    #[arg(short, long, value_enum)]
    kind: Option<Artifact>,

    /// Print approximate temperatures next to the codes
    #[arg(long)]
    celsius: bool,

    /// Compare against this text artifact (one code per line, e.g. station.data)
    #[arg(long)]
    expect: Option<PathBuf>,
}

pub fn main() -> Result<()> {
    let args = Args::parse();

    stderrlog::new()
        .verbosity(2)
        .timestamp(stderrlog::Timestamp::Second)
        .init()
        .context("cannot initialize logging")?;

    let kind = match args.kind.or_else(|| Artifact::from_path(&args.input)) {
        Some(kind) => kind,
        None => bail!("cannot tell the artifact kind of {}; pass --kind", args.input.display()),
    };

    let bytes = fs::read(&args.input).with_context(|| format!("cannot read {}", args.input.display()))?;
    let codes = artifacts::reconstruct(kind, &bytes)
        .with_context(|| format!("decoding {}", args.input.display()))?
        .ok_or_else(|| anyhow!("{kind:?} streams have no serialized form"))?;
    info!("{}: {} bytes -> {} codes", args.input.display(), bytes.len(), codes.len());

    if let Some(expect) = &args.expect {
        let text = fs::read_to_string(expect).with_context(|| format!("cannot read {}", expect.display()))?;
        let expected = text
            .lines()
            .map(|l| l.trim().parse::<u16>())
            .collect::<Result<Vec<_>, _>>()
            .with_context(|| format!("{} is not a code stream", expect.display()))?;
        if expected != codes {
            bail!("{} does not match {}", args.input.display(), expect.display());
        }
        info!("matches {}", expect.display());
    }

    let mut out = BufWriter::new(io::stdout().lock());
    for q in &codes {
        if args.celsius {
            writeln!(out, "{q}\t{:.2}", dequantize(*q))?;
        } else {
            writeln!(out, "{q}")?;
        }
    }
    out.flush()?;
    Ok(())
}
