//! Report rendering and the per-integer feature dataset.
//!
//! Renders a [`WindowedReport`] or a list of [`FeatureScore`]s as a text
//! table, Markdown, JSON or CSV, and writes/reads the flat dataset CSV
//! (one row per integer, one column per feature) that `eval` mode scores.

use std::fmt::Write as _;
use std::io::{BufRead, Write};
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::characters::RealCharacter;
use crate::generator::Generator;
use crate::pipeline::WindowedReport;
use crate::scoring;
use crate::sieve::labels_for_range;
use crate::transforms;
use crate::PolarityError;

/// Errors from the reporting and dataset layer.
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Polarity(#[from] PolarityError),

    #[error("dataset line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("unknown output format '{0}'; expected txt, md, json or csv")]
    UnknownFormat(String),
}

/// Output format for tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Markdown,
    Json,
    Csv,
}

impl FromStr for OutputFormat {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self, ReportError> {
        match s {
            "txt" | "text" => Ok(OutputFormat::Text),
            "md" | "markdown" => Ok(OutputFormat::Markdown),
            "json" => Ok(OutputFormat::Json),
            "csv" => Ok(OutputFormat::Csv),
            other => Err(ReportError::UnknownFormat(other.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Windowed report
// ---------------------------------------------------------------------------

/// Render a windowed run in the requested format.
pub fn render_windowed(report: &WindowedReport, format: OutputFormat) -> Result<String, ReportError> {
    let mut out = String::new();
    match format {
        OutputFormat::Text => {
            out.push_str("Windows:\n");
            for (s, e) in &report.windows {
                let _ = writeln!(out, "  [{}, {}]", s, e);
            }
            out.push_str("\nResults (sorted by avg PI):\n");
            let _ = writeln!(
                out,
                "{:30} {:>8} {:>8}  {:>8}  PIs-by-window",
                "Feature", "AUC", "PI", "Stable"
            );
            for row in &report.table {
                let _ = writeln!(
                    out,
                    "{:30} {:8.3} {:8.3}  {:>8}  [{}]",
                    row.name,
                    row.mean_auc,
                    row.mean_pi,
                    if row.stable { "yes" } else { "" },
                    join_pis(&row.per_window_pi, ", ")
                );
            }
        }
        OutputFormat::Markdown => {
            out.push_str("| feature | auc | pi | stable | pi by window |\n");
            out.push_str("|---|---:|---:|:---:|---|\n");
            for row in &report.table {
                let _ = writeln!(
                    out,
                    "| {} | {:.3} | {:.3} | {} | {} |",
                    row.name,
                    row.mean_auc,
                    row.mean_pi,
                    if row.stable { "yes" } else { "" },
                    join_pis(&row.per_window_pi, ", ")
                );
            }
        }
        OutputFormat::Json => {
            out = serde_json::to_string_pretty(report)?;
            out.push('\n');
        }
        OutputFormat::Csv => {
            out.push_str("feature,mean_auc,mean_pi,stable,per_window_pi\n");
            for row in &report.table {
                let _ = writeln!(
                    out,
                    "{},{},{},{},{}",
                    row.name,
                    row.mean_auc,
                    row.mean_pi,
                    row.stable,
                    join_pis(&row.per_window_pi, ";")
                );
            }
        }
    }
    Ok(out)
}

fn join_pis(pis: &[f64], sep: &str) -> String {
    pis.iter()
        .map(|p| format!("{:.3}", p))
        .collect::<Vec<_>>()
        .join(sep)
}

// ---------------------------------------------------------------------------
// Dataset
// ---------------------------------------------------------------------------

/// Feature columns of the dataset, in file order.
pub const DATASET_FEATURES: &[&str] = &[
    "Z_raw",
    "FracPartMin",
    "ForwardDiff",
    "LogMellinSlope",
    "MobiusFast",
    "Dirichlet_q4",
    "Dirichlet_q5",
    "Dirichlet_q8",
    "Dirichlet_q12",
    "K3",
];

/// Per-integer labels and feature columns over one range.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    pub n: Vec<u64>,
    pub is_prime: Vec<bool>,
    pub columns: Vec<(String, Vec<f64>)>,
}

impl Dataset {
    /// Compute every dataset column over `[start, end]`.
    pub fn build(start: u64, end: u64, generator: &Generator) -> Result<Self, ReportError> {
        let is_prime = labels_for_range(start, end)?;
        let z = generator.sequence(start, end)?.z;

        let mut columns = vec![
            ("FracPartMin".to_string(), transforms::fold_min(&z)),
            ("ForwardDiff".to_string(), transforms::forward_diff(&z)?),
            ("LogMellinSlope".to_string(), transforms::log_mellin_slope(&z, start)?),
            ("MobiusFast".to_string(), transforms::mobius_twist_fast(&z, start)),
        ];
        for chi in RealCharacter::ALL {
            columns.push((
                format!("Dirichlet_q{}", chi.modulus()),
                transforms::dirichlet_projection(&z, start, chi),
            ));
        }
        columns.push(("K3".to_string(), transforms::golden_log_bands(start, z.len())));
        columns.insert(0, ("Z_raw".to_string(), z));

        Ok(Self {
            n: (start..=end).collect(),
            is_prime,
            columns,
        })
    }

    pub fn len(&self) -> usize {
        self.n.len()
    }

    pub fn is_empty(&self) -> bool {
        self.n.is_empty()
    }

    pub fn column(&self, name: &str) -> Option<&[f64]> {
        self.columns
            .iter()
            .find(|(col, _)| col == name)
            .map(|(_, values)| values.as_slice())
    }

    /// Write as CSV with header `n,is_prime,<features...>`.
    pub fn write_csv<W: Write>(&self, mut writer: W) -> Result<(), ReportError> {
        let header: Vec<&str> = ["n", "is_prime"]
            .into_iter()
            .chain(self.columns.iter().map(|(name, _)| name.as_str()))
            .collect();
        writeln!(writer, "{}", header.join(","))?;

        for (i, n) in self.n.iter().enumerate() {
            let mut line = format!("{},{}", n, self.is_prime[i]);
            for (_, values) in &self.columns {
                let _ = write!(line, ",{}", values[i]);
            }
            writeln!(writer, "{}", line)?;
        }
        Ok(())
    }

    /// Read a CSV produced by [`Dataset::write_csv`]. Booleans may be
    /// `true`/`false`, `True`/`False` or `1`/`0`.
    pub fn read_csv<R: BufRead>(reader: R) -> Result<Self, ReportError> {
        let mut lines = reader.lines();
        let header = lines.next().ok_or(ReportError::Parse {
            line: 1,
            message: "empty dataset".to_string(),
        })??;
        let names: Vec<String> = header.split(',').map(|s| s.trim().to_string()).collect();

        let n_idx = column_index(&names, "n")?;
        let prime_idx = column_index(&names, "is_prime")?;
        let feature_idx: Vec<usize> = (0..names.len())
            .filter(|&i| i != n_idx && i != prime_idx)
            .collect();

        let mut dataset = Dataset {
            n: Vec::new(),
            is_prime: Vec::new(),
            columns: feature_idx.iter().map(|&i| (names[i].clone(), Vec::new())).collect(),
        };

        for (offset, line) in lines.enumerate() {
            let line = line?;
            let line_no = offset + 2;
            if line.trim().is_empty() {
                continue;
            }
            let fields: Vec<&str> = line.split(',').map(str::trim).collect();
            if fields.len() != names.len() {
                return Err(ReportError::Parse {
                    line: line_no,
                    message: format!("expected {} fields, found {}", names.len(), fields.len()),
                });
            }

            let n = fields[n_idx].parse::<u64>().map_err(|e| ReportError::Parse {
                line: line_no,
                message: format!("n: {}", e),
            })?;
            let is_prime = parse_bool(fields[prime_idx]).ok_or_else(|| ReportError::Parse {
                line: line_no,
                message: format!("is_prime: '{}'", fields[prime_idx]),
            })?;
            dataset.n.push(n);
            dataset.is_prime.push(is_prime);

            for (col, &i) in feature_idx.iter().enumerate() {
                let value = fields[i].parse::<f64>().map_err(|e| ReportError::Parse {
                    line: line_no,
                    message: format!("{}: {}", names[i], e),
                })?;
                dataset.columns[col].1.push(value);
            }
        }

        Ok(dataset)
    }
}

fn column_index(names: &[String], wanted: &str) -> Result<usize, ReportError> {
    names
        .iter()
        .position(|name| name == wanted)
        .ok_or_else(|| ReportError::Parse {
            line: 1,
            message: format!("missing column '{}'", wanted),
        })
}

fn parse_bool(field: &str) -> Option<bool> {
    match field {
        "true" | "True" | "1" => Some(true),
        "false" | "False" | "0" => Some(false),
        _ => None,
    }
}

/// One scored dataset column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureScore {
    pub feature: String,
    pub auc: f64,
    pub pi: f64,
}

/// Tie-aware scores of the requested columns, highest PI first. Columns
/// absent from the dataset are skipped.
pub fn score_dataset(dataset: &Dataset, features: &[&str]) -> Result<Vec<FeatureScore>, ReportError> {
    let mut rows = Vec::new();
    for &feature in features {
        let Some(values) = dataset.column(feature) else {
            log::warn!("dataset has no column '{}', skipping", feature);
            continue;
        };
        let auc = scoring::auc(values, &dataset.is_prime)?;
        rows.push(FeatureScore {
            feature: feature.to_string(),
            auc,
            pi: scoring::polarity_index(auc),
        });
    }
    rows.sort_by(|a, b| b.pi.total_cmp(&a.pi));
    Ok(rows)
}

#[derive(Serialize)]
struct ScoresPayload<'a> {
    results: &'a [FeatureScore],
}

/// Render dataset scores in the requested format.
pub fn render_scores(rows: &[FeatureScore], format: OutputFormat) -> Result<String, ReportError> {
    let mut out = String::new();
    match format {
        OutputFormat::Text => {
            let _ = writeln!(out, "{:30} {:>8} {:>8}", "feature", "auc", "pi");
            for r in rows {
                let _ = writeln!(out, "{:30} {:8.3} {:8.3}", r.feature, r.auc, r.pi);
            }
        }
        OutputFormat::Markdown => {
            out.push_str("| feature | auc | pi |\n|---|---:|---:|\n");
            for r in rows {
                let _ = writeln!(out, "| {} | {:.3} | {:.3} |", r.feature, r.auc, r.pi);
            }
        }
        OutputFormat::Json => {
            out = serde_json::to_string_pretty(&ScoresPayload { results: rows })?;
            out.push('\n');
        }
        OutputFormat::Csv => {
            out.push_str("feature,auc,pi\n");
            for r in rows {
                let _ = writeln!(out, "{},{:.6},{:.6}", r.feature, r.auc, r.pi);
            }
        }
    }
    Ok(out)
}

/// Write `content` to `path`, creating parent directories, or print it to
/// stdout when no path is given.
pub fn emit(content: &str, path: Option<&Path>) -> Result<(), ReportError> {
    match path {
        Some(path) => {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)?;
                }
            }
            std::fs::write(path, content)?;
            log::info!("wrote {}", path.display());
        }
        None => print!("{}", content),
    }
    Ok(())
}
