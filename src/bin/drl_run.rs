//! Compress a station file three ways and report the savings of each.

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use deltarun::input::DEFAULT_COLUMN;
use deltarun::pipeline::{self, Config};

#[derive(Parser, Debug)]
#[command(name = "deltarun")]
#[command(about = "Quantize a sensor stream and compare RLE, delta RLE and double delta RLE")]
#[command(after_help = "INPUT FORMAT:\n  \
    Whitespace-separated text, one reading per line. The measurement is read\n  \
    from --column (zero-based, default 2). Lines without a number there are\n  \
    skipped; readings outside [-100, 100] are treated as fault sentinels.\n\n\
ARTIFACTS:\n  \
    With --artifacts DIR the quantized stream, both delta streams and the three\n  \
    run-length streams are written as <stem>.{data,d,dd,rle,drle,ddrle}, plus\n  \
    serialized <stem>.{data,rle,drle,ddrle}.bin files.")]
struct Args {
    /// Station file to read
    input: PathBuf,

    /// Report file (default: stdout)
    #[arg(short, long)]
    report: Option<PathBuf>,

    /// Append to the report file instead of replacing it
    #[arg(long, requires = "report")]
    append: bool,

    /// Zero-based column holding the measurement
    #[arg(short, long, default_value_t = DEFAULT_COLUMN)]
    column: usize,

    /// Directory for intermediate artifacts
    #[arg(short, long)]
    artifacts: Option<PathBuf>,

    /// Skip the plain-text artifacts
    #[arg(long)]
    no_text: bool,

    /// Skip the serialized artifacts
    #[arg(long)]
    no_binary: bool,

    /// Emit the report as JSON
    #[arg(long)]
    json: bool,

    /// Run the encoding branches one after another
    #[arg(long)]
    sequential: bool,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Args {
    fn config(&self) -> Config {
        let mut config = Config::new(&self.input);
        config.column = self.column;
        config.artifacts_dir.clone_from(&self.artifacts);
        config.text_artifacts = !self.no_text;
        config.binary_artifacts = !self.no_binary;
        config.parallel = !self.sequential;
        config
    }
}

pub fn main() -> Result<()> {
    let args = Args::parse();

    stderrlog::new()
        .verbosity(1 + usize::from(args.verbose))
        .timestamp(stderrlog::Timestamp::Second)
        .init()
        .context("cannot initialize logging")?;

    let config = args.config();
    let outcome = pipeline::run(&config).with_context(|| format!("processing {}", config.input.display()))?;

    let rendered = if args.json {
        let mut json = serde_json::to_string_pretty(&serde_json::json!({
            "input": outcome.stats,
            "report": outcome.report,
        }))?;
        json.push('\n');
        json
    } else {
        format!("{}\n", outcome.report)
    };

    match &args.report {
        Some(path) => {
            let mut file = OpenOptions::new()
                .create(true)
                .write(true)
                .append(args.append)
                .truncate(!args.append)
                .open(path)
                .with_context(|| format!("cannot open report {}", path.display()))?;
            file.write_all(rendered.as_bytes())
                .with_context(|| format!("cannot write report {}", path.display()))?;
        }
        None => io::stdout().write_all(rendered.as_bytes())?,
    }

    Ok(())
}
