//! Feature stack evaluation and windowed scoring.
//!
//! For every window: prime labels from the sieve, Z from the generator, the
//! full transform stack, and one (AUC, PI) pair per feature. Windows share
//! nothing but the generator's precision context; only the per-feature
//! summaries outlive the loop.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::characters::RealCharacter;
use crate::generator::Generator;
use crate::scoring::{self, AucMethod, ScorePair};
use crate::sieve::labels_for_range;
use crate::transforms;
use crate::windows::{self, DEFAULT_MAX_REL_VAR, DEFAULT_MIN_PI};
use crate::Result;

pub const FEATURE_Z_RAW: &str = "Z_raw";
pub const FEATURE_FRAC_MIN: &str = "Frac_part_min";
pub const FEATURE_FORWARD_DIFF: &str = "Forward_diff";
pub const FEATURE_LOG_MELLIN: &str = "LogMellin_slope";
pub const FEATURE_MOBIUS: &str = "Mobius_twist";
pub const FEATURE_Z_O: &str = "Z_o_placeholder";
pub const FEATURE_GOLDEN: &str = "K3_golden_bands";

/// Feature name of the projection onto `chi`.
pub fn dirichlet_feature_name(chi: RealCharacter) -> String {
    format!("Dirichlet_proj_q={}", chi.modulus())
}

/// Which optional features the stack includes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureConfig {
    /// One Dirichlet projection per character.
    pub moduli: Vec<RealCharacter>,
    /// Add the χ₄-twisted generator Z_o.
    pub include_zo: bool,
    /// Add the golden-ratio log bands.
    pub golden_bands: bool,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            moduli: RealCharacter::ALL.to_vec(),
            include_zo: false,
            golden_bands: true,
        }
    }
}

/// Labels and named features for one inclusive range.
#[derive(Debug, Clone)]
pub struct RangeEvaluation {
    pub start: u64,
    pub end: u64,
    pub labels: Vec<bool>,
    pub features: BTreeMap<String, Vec<f64>>,
}

impl RangeEvaluation {
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Score every feature against the labels.
    pub fn score_all(&self, method: AucMethod) -> Result<BTreeMap<String, ScorePair>> {
        self.features
            .iter()
            .map(|(name, values)| {
                scoring::score(values, &self.labels, method).map(|pair| (name.clone(), pair))
            })
            .collect()
    }
}

/// Evaluate the default feature stack over `[start, end]` at the given
/// precision.
pub fn evaluate_range(start: u64, end: u64, precision_digits: u32) -> Result<RangeEvaluation> {
    let generator = Generator::with_digits(precision_digits);
    evaluate_range_with(start, end, &generator, &FeatureConfig::default())
}

/// Evaluate a configured feature stack over `[start, end]`.
pub fn evaluate_range_with(
    start: u64,
    end: u64,
    generator: &Generator,
    config: &FeatureConfig,
) -> Result<RangeEvaluation> {
    let labels = labels_for_range(start, end)?;
    let sequence = generator.sequence(start, end)?;
    let z = sequence.z;

    let mut features = BTreeMap::new();
    features.insert(FEATURE_FRAC_MIN.to_string(), transforms::fold_min(&z));
    features.insert(FEATURE_FORWARD_DIFF.to_string(), transforms::forward_diff(&z)?);
    features.insert(FEATURE_LOG_MELLIN.to_string(), transforms::log_mellin_slope(&z, start)?);
    features.insert(FEATURE_MOBIUS.to_string(), transforms::mobius_twist(&z, start));
    for &chi in &config.moduli {
        features.insert(
            dirichlet_feature_name(chi),
            transforms::dirichlet_projection(&z, start, chi),
        );
    }
    if config.golden_bands {
        features.insert(FEATURE_GOLDEN.to_string(), transforms::golden_log_bands(start, z.len()));
    }
    if config.include_zo {
        features.insert(FEATURE_Z_O.to_string(), sequence.z_o);
    }
    features.insert(FEATURE_Z_RAW.to_string(), z);

    Ok(RangeEvaluation {
        start,
        end,
        labels,
        features,
    })
}

/// Tie-aware (AUC, PI) of one feature sequence.
pub fn score_feature(sequence: &[f64], labels: &[bool]) -> Result<ScorePair> {
    scoring::score(sequence, labels, AucMethod::TieAware)
}

/// Parameters of a windowed run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowedConfig {
    pub start: u64,
    pub end: u64,
    pub windows: usize,
    /// Explicit window size; derived from the range when `None`.
    pub window_size: Option<u64>,
    pub features: FeatureConfig,
    pub precision_digits: u32,
    pub min_pi: f64,
    pub max_rel_var: f64,
    pub auc_method: AucMethod,
}

impl Default for WindowedConfig {
    fn default() -> Self {
        Self {
            start: 100_000,
            end: 120_000,
            windows: 3,
            window_size: None,
            features: FeatureConfig::default(),
            precision_digits: crate::precision::DEFAULT_DIGITS,
            min_pi: DEFAULT_MIN_PI,
            max_rel_var: DEFAULT_MAX_REL_VAR,
            auc_method: AucMethod::TieAware,
        }
    }
}

/// Cross-window summary of one feature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureSummary {
    pub name: String,
    pub mean_auc: f64,
    pub mean_pi: f64,
    pub stable: bool,
    pub per_window_pi: Vec<f64>,
}

/// Window plan plus the feature table sorted by mean PI, highest first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowedReport {
    pub windows: Vec<(u64, u64)>,
    pub precision_digits: u32,
    pub table: Vec<FeatureSummary>,
}

/// Run the feature stack over every window and aggregate per feature.
pub fn run_windowed(config: &WindowedConfig) -> Result<WindowedReport> {
    let ranges = windows::split_windows(config.start, config.end, config.windows, config.window_size)?;
    if let Some(&(_, last_end)) = ranges.last() {
        if last_end < config.end {
            log::warn!(
                "window plan leaves [{}, {}] unscored",
                last_end + 1,
                config.end
            );
        }
    }
    if ranges.len() < config.windows {
        log::warn!(
            "requested {} windows, range only fills {}",
            config.windows,
            ranges.len()
        );
    }

    let generator = Generator::with_digits(config.precision_digits);
    let mut per_window: Vec<BTreeMap<String, ScorePair>> = Vec::with_capacity(ranges.len());

    for (idx, &(s, e)) in ranges.iter().enumerate() {
        log::info!("window {}/{}: [{}, {}]", idx + 1, ranges.len(), s, e);
        let evaluation = evaluate_range_with(s, e, &generator, &config.features)?;
        log::debug!(
            "window [{}, {}]: {} integers, {} primes, {} features",
            s,
            e,
            evaluation.len(),
            evaluation.labels.iter().filter(|&&l| l).count(),
            evaluation.features.len()
        );
        per_window.push(evaluation.score_all(config.auc_method)?);
    }

    let table = aggregate(&per_window, config.min_pi, config.max_rel_var);

    Ok(WindowedReport {
        windows: ranges,
        precision_digits: generator.precision().digits(),
        table,
    })
}

/// Per-feature means over the windows a feature appears in, sorted by mean
/// PI descending (ties keep name order).
pub fn aggregate(
    per_window: &[BTreeMap<String, ScorePair>],
    min_pi: f64,
    max_rel_var: f64,
) -> Vec<FeatureSummary> {
    let names: BTreeSet<&String> = per_window.iter().flat_map(|w| w.keys()).collect();

    let mut table: Vec<FeatureSummary> = names
        .into_iter()
        .filter_map(|name| {
            let pairs: Vec<&ScorePair> = per_window.iter().filter_map(|w| w.get(name)).collect();
            if pairs.is_empty() {
                return None;
            }
            let aucs: Vec<f64> = pairs.iter().map(|p| p.auc).collect();
            let pis: Vec<f64> = pairs.iter().map(|p| p.pi).collect();
            Some(FeatureSummary {
                name: name.clone(),
                mean_auc: windows::mean(&aucs),
                mean_pi: windows::mean(&pis),
                stable: windows::stability(&pis, min_pi, max_rel_var),
                per_window_pi: pis,
            })
        })
        .collect();

    table.sort_by(|a, b| b.mean_pi.total_cmp(&a.mean_pi));
    table
}
