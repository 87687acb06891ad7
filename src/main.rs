//! prime-polarity CLI: score generator features against primality.
//!
//! Usage:
//!   prime-polarity --mode=score   [--start=N] [--end=N] [--windows=N] [--window-size=N]
//!                                 [--use-zo] [--no-golden] [--mods=4,5,8,12] [--dps=N]
//!                                 [--auc=tie|ordinal] [--format=txt|md|json|csv] [--out=path]
//!   prime-polarity --mode=dataset --start=N --end=N --out=path [--dps=N]
//!   prime-polarity --mode=eval    --data=path [--features=a,b,...] [--format=...] [--out=path]
//!
//! Modes:
//!   score    : windowed AUC/PI table with stability flags (default)
//!   dataset  : one CSV row of features per integer in the range
//!   eval     : score columns of a dataset CSV
//!
//! `--window-size=0` derives the size from the range. Set RUST_LOG=info for
//! per-window progress.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;
use std::process;

use prime_polarity::characters::parse_moduli;
use prime_polarity::precision::DEFAULT_DIGITS;
use prime_polarity::report::{self, Dataset, OutputFormat, ReportError, DATASET_FEATURES};
use prime_polarity::{run_windowed, AucMethod, FeatureConfig, Generator, WindowedConfig};

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let opts = parse_args(&args);
    let mode = opts.get("mode").map(|s| s.as_str()).unwrap_or("score");

    let outcome = match mode {
        "score" => run_score(&opts),
        "dataset" => run_dataset(&opts),
        "eval" => run_eval(&opts),
        other => {
            eprintln!("Unknown mode: {other}. Use --mode=score|dataset|eval");
            process::exit(1);
        }
    };

    if let Err(e) = outcome {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run_score(opts: &HashMap<String, String>) -> Result<(), ReportError> {
    let defaults = WindowedConfig::default();
    let moduli = match opts.get("mods") {
        Some(list) => parse_moduli(list)?,
        None => defaults.features.moduli.clone(),
    };
    let auc_method = match opts.get("auc").map(|s| s.as_str()) {
        Some("ordinal") => AucMethod::Ordinal,
        _ => AucMethod::TieAware,
    };

    let config = WindowedConfig {
        start: parse_u64(opts, "start", defaults.start),
        end: parse_u64(opts, "end", defaults.end),
        windows: parse_u64(opts, "windows", defaults.windows as u64) as usize,
        window_size: match parse_u64(opts, "window-size", 0) {
            0 => None,
            size => Some(size),
        },
        features: FeatureConfig {
            moduli,
            include_zo: opts.contains_key("use-zo"),
            golden_bands: !opts.contains_key("no-golden"),
        },
        precision_digits: parse_u64(opts, "dps", defaults.precision_digits as u64) as u32,
        auc_method,
        ..defaults
    };

    let format = parse_format(opts)?;
    let result = run_windowed(&config)?;
    let rendered = report::render_windowed(&result, format)?;
    report::emit(&rendered, opts.get("out").map(Path::new))
}

fn run_dataset(opts: &HashMap<String, String>) -> Result<(), ReportError> {
    let (Some(start), Some(end), Some(out)) = (
        opts.get("start").and_then(|v| v.parse::<u64>().ok()),
        opts.get("end").and_then(|v| v.parse::<u64>().ok()),
        opts.get("out"),
    ) else {
        eprintln!("dataset mode needs --start=N --end=N --out=path");
        process::exit(1);
    };

    let generator = Generator::with_digits(parse_u64(opts, "dps", DEFAULT_DIGITS as u64) as u32);
    let dataset = Dataset::build(start, end, &generator)?;

    let path = Path::new(out);
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    dataset.write_csv(BufWriter::new(File::create(path)?))?;
    println!("Wrote dataset: {}  rows={}", path.display(), dataset.len());
    Ok(())
}

fn run_eval(opts: &HashMap<String, String>) -> Result<(), ReportError> {
    let Some(data) = opts.get("data") else {
        eprintln!("eval mode needs --data=path");
        process::exit(1);
    };

    let dataset = Dataset::read_csv(BufReader::new(File::open(data)?))?;
    let features: Vec<&str> = match opts.get("features") {
        Some(list) => list.split(',').map(str::trim).filter(|f| !f.is_empty()).collect(),
        None => DATASET_FEATURES.to_vec(),
    };

    let rows = report::score_dataset(&dataset, &features)?;
    let format = match opts.get("format") {
        Some(_) => parse_format(opts)?,
        None => OutputFormat::Markdown,
    };
    let rendered = report::render_scores(&rows, format)?;
    report::emit(&rendered, opts.get("out").map(Path::new))
}

// ---------------------------------------------------------------------------
// Argument parsing helpers
// ---------------------------------------------------------------------------

fn parse_args(args: &[String]) -> HashMap<String, String> {
    let mut map = HashMap::new();
    for arg in args {
        if let Some(kv) = arg.strip_prefix("--") {
            if let Some((k, v)) = kv.split_once('=') {
                map.insert(k.to_string(), v.to_string());
            } else {
                map.insert(kv.to_string(), "true".to_string());
            }
        }
    }
    map
}

fn parse_u64(opts: &HashMap<String, String>, key: &str, default: u64) -> u64 {
    opts.get(key)
        .and_then(|v| v.replace('_', "").parse().ok())
        .unwrap_or(default)
}

fn parse_format(opts: &HashMap<String, String>) -> Result<OutputFormat, ReportError> {
    opts.get("format")
        .map(|f| f.parse())
        .unwrap_or(Ok(OutputFormat::Text))
}
