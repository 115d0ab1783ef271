//! Generate a synthetic station file for trying deltarun.

use std::f64::consts::PI;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use rand::Rng;

#[derive(Parser, Debug)]
#[command(name = "deltarun-gen")]
#[command(about = "Generate a synthetic NOAA-style station file")]
#[command(after_help = "OUTPUT FORMAT:\n  \
    <station> <yyyymmddhhmm> <temperature>\n  \
    Temperatures are in degrees Celsius with one decimal. Fault readings are\n  \
    written as 999.9 or -999.9, the way station exports mark missing data.")]
struct Args {
    /// Output file path
    output: PathBuf,

    /// Number of readings (default: 288 = 24h at 5-min intervals)
    #[arg(short, long, default_value_t = 288)]
    readings: usize,

    /// Base temperature in Celsius
    #[arg(long, default_value_t = 12.0, allow_hyphen_values = true)]
    base_temp: f64,

    /// Half the day/night swing in Celsius
    #[arg(long, default_value_t = 4.0)]
    amplitude: f64,

    /// Minutes between readings
    #[arg(long, default_value_t = 5)]
    interval: u32,

    /// Percent chance that a reading is a fault sentinel
    #[arg(long, default_value_t = 1)]
    faults: u32,

    /// Station identifier written in the first column
    #[arg(long, default_value = "725030")]
    station: String,
}

pub fn main() -> Result<()> {
    let args = Args::parse();

    stderrlog::new()
        .verbosity(2)
        .timestamp(stderrlog::Timestamp::Second)
        .init()
        .context("cannot initialize logging")?;

    let file = File::create(&args.output).with_context(|| format!("cannot create {}", args.output.display()))?;
    let mut out = BufWriter::new(file);
    let mut rng = rand::rng();
    let mut faults = 0usize;

    for i in 0..args.readings {
        let minutes = i as u64 * u64::from(args.interval);
        let (day, minute_of_day) = (minutes / 1440, minutes % 1440);
        let stamp = format!("202401{:02}{:02}{:02}", 1 + day % 28, minute_of_day / 60, minute_of_day % 60);

        // Coldest at 5am, warmest at 3pm
        let hour = minute_of_day as f64 / 60.0;
        let swing = args.amplitude * ((hour - 5.0) * PI / 12.0 - PI / 2.0).sin();
        let jitter: f64 = rng.random_range(-0.3..=0.3);
        let temp = ((args.base_temp + swing + jitter) * 10.0).round() / 10.0;

        if rng.random_range(0..100) < args.faults {
            faults += 1;
            let sentinel = if rng.random_bool(0.5) { 999.9 } else { -999.9 };
            writeln!(out, "{} {stamp} {sentinel:.1}", args.station)?;
        } else {
            writeln!(out, "{} {stamp} {temp:.1}", args.station)?;
        }
    }
    out.flush()?;

    info!(
        "wrote {} readings ({faults} fault sentinels) to {}",
        args.readings,
        args.output.display()
    );
    Ok(())
}
