//! # Prime Polarity
//!
//! Exploratory scoring of whether scalar transforms of the generator
//!
//!   Z(n) = exp(π · ζ(n − 1) / n) + 1
//!
//! separate primes from composites. Each feature sequence is ranked against
//! the prime labels of its window and summarised by a Mann–Whitney AUC and
//! the polarity index PI = 2·AUC − 1.
//!
//! Pipeline: sieves → labels, generator → Z, transforms → named features,
//! scoring → (AUC, PI) per feature and window, windows → aggregated table.

pub mod characters;
pub mod generator;
pub mod pipeline;
pub mod precision;
pub mod report;
pub mod scoring;
pub mod sieve;
pub mod transforms;
pub mod windows;

pub use characters::RealCharacter;
pub use generator::Generator;
pub use pipeline::{
    evaluate_range, run_windowed, score_feature, FeatureConfig, FeatureSummary, RangeEvaluation,
    WindowedConfig, WindowedReport,
};
pub use precision::Precision;
pub use scoring::{AucMethod, ScorePair};

/// Errors raised by the sieve, transform, scoring and windowing layers.
///
/// These all indicate malformed input; none of them is retried.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PolarityError {
    #[error("invalid range [{start}, {end}]")]
    InvalidRange { start: u64, end: u64 },

    #[error("{transform} requires at least one element")]
    EmptySequence { transform: &'static str },

    #[error("unsupported modulus {0}; expected one of 4, 5, 8, 12")]
    UnsupportedModulus(u64),

    #[error("could not parse modulus list entry '{0}'")]
    InvalidModulusList(String),

    #[error("length mismatch: {scores} scores vs {labels} labels")]
    LengthMismatch { scores: usize, labels: usize },

    #[error("window count must be at least 1")]
    InvalidWindowCount,
}

pub type Result<T> = std::result::Result<T, PolarityError>;
