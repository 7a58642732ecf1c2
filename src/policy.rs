//! Cache rebuild policy
//!
//! Maps measured drift to a verdict. Rules are evaluated in order and the
//! first match wins:
//!
//! | # | Condition | Verdict |
//! |---|-----------|---------|
//! | 1 | cache TTL elapsed | force |
//! | 2 | a critical file changed | force |
//! | 3 | percent >= `force_percent` | force |
//! | 4 | tokens >= `force_tokens` | force |
//! | 5 | percent >= `recommend_percent` | recommend |
//! | 6 | tokens >= `recommend_tokens` | recommend |
//! | 7 | otherwise | keep |

use crate::config::schema::CacheConfig;
use crate::workspace::{Diff, Magnitude};
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::fmt;

/// Standard input price, USD per million tokens
pub const STANDARD_INPUT_PER_M: f64 = 0.50;
/// Cached input price, USD per million tokens
pub const CACHE_HIT_PER_M: f64 = 0.05;
/// Cache storage price, USD per million tokens per hour
pub const CACHE_STORAGE_PER_M_PER_HR: f64 = 1.00;

/// Severity of a staleness finding
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    /// Cache still represents the workspace
    Keep,
    /// Drift is noticeable; rebuilding is advisable
    Recommend,
    /// Cache must not be used as-is
    Force,
}

impl Verdict {
    /// Whether a rebuild should be offered
    pub fn wants_rebuild(&self) -> bool {
        !matches!(self, Self::Keep)
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Keep => "keep",
            Self::Recommend => "recommend",
            Self::Force => "force",
        };
        write!(f, "{}", name)
    }
}

/// Verdict plus a human-readable reason (absent for `Keep`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Decision {
    pub verdict: Verdict,
    pub reason: Option<String>,
}

impl Decision {
    fn new(verdict: Verdict, reason: impl Into<String>) -> Self {
        Self {
            verdict,
            reason: Some(reason.into()),
        }
    }

    fn keep() -> Self {
        Self {
            verdict: Verdict::Keep,
            reason: None,
        }
    }
}

/// Decide whether the cache should be kept, rebuilt on recommendation, or rebuilt
pub fn decide(
    magnitude: &Magnitude,
    diff: &Diff,
    thresholds: &CacheConfig,
    expired: bool,
) -> Decision {
    if expired {
        return Decision::new(Verdict::Force, "cache expired");
    }

    if thresholds.critical_files.iter().any(|path| diff.touches(path)) {
        return Decision::new(Verdict::Force, "critical file changed");
    }

    let percent = magnitude.percent;
    let tokens = magnitude.changed_tokens;

    if percent >= thresholds.force_percent {
        return Decision::new(Verdict::Force, format!("project changed {:.2}%", percent));
    }

    if tokens >= thresholds.force_tokens {
        return Decision::new(Verdict::Force, format!("{} tokens changed", tokens));
    }

    if percent >= thresholds.recommend_percent {
        return Decision::new(Verdict::Recommend, format!("project changed {:.2}%", percent));
    }

    if tokens >= thresholds.recommend_tokens {
        return Decision::new(Verdict::Recommend, format!("{} tokens changed", tokens));
    }

    Decision::keep()
}

/// One-off cost (USD) of writing `tokens` into a cache
pub fn cache_write_cost(tokens: u64) -> f64 {
    tokens as f64 / 1_000_000.0 * STANDARD_INPUT_PER_M
}

/// Cost (USD) of storing `tokens` for `ttl_hours`
pub fn cache_storage_cost(tokens: u64, ttl_hours: u32) -> f64 {
    tokens as f64 / 1_000_000.0 * CACHE_STORAGE_PER_M_PER_HR * f64::from(ttl_hours)
}

/// Savings (USD) per request when `tokens` are served from cache instead of sent
pub fn cache_hit_savings(tokens: u64) -> f64 {
    tokens as f64 / 1_000_000.0 * (STANDARD_INPUT_PER_M - CACHE_HIT_PER_M)
}

/// Absolute expiry for a cache created at `now`
pub fn compute_expiry(now: DateTime<Utc>, ttl_hours: u32) -> DateTime<Utc> {
    now + Duration::hours(i64::from(ttl_hours))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::collections::BTreeSet;

    fn thresholds() -> CacheConfig {
        CacheConfig {
            force_percent: 50.0,
            recommend_percent: 10.0,
            force_tokens: 1000,
            recommend_tokens: 100,
            critical_files: vec![],
            ..CacheConfig::default()
        }
    }

    fn mag(percent: f64, changed_tokens: u64) -> Magnitude {
        Magnitude {
            changed_bytes: changed_tokens * 4,
            percent,
            changed_tokens,
        }
    }

    #[test]
    fn force_percent_wins_over_recommend() {
        let d = decide(&mag(60.0, 0), &Diff::default(), &thresholds(), false);
        assert_eq!(d.verdict, Verdict::Force);
        assert_eq!(d.reason.as_deref(), Some("project changed 60.00%"));
    }

    #[test]
    fn expiry_overrides_zero_drift() {
        let d = decide(&Magnitude::default(), &Diff::default(), &thresholds(), true);
        assert_eq!(d, Decision::new(Verdict::Force, "cache expired"));
    }

    #[test]
    fn critical_file_forces() {
        let mut config = thresholds();
        config.critical_files = vec!["Cargo.toml".to_string()];
        let diff = Diff {
            deleted: BTreeSet::from(["Cargo.toml".to_string()]),
            ..Diff::default()
        };

        let d = decide(&mag(0.1, 0), &diff, &config, false);
        assert_eq!(d.reason.as_deref(), Some("critical file changed"));
        assert_eq!(d.verdict, Verdict::Force);
    }

    #[test]
    fn token_thresholds_apply_after_percent() {
        let d = decide(&mag(1.0, 1000), &Diff::default(), &thresholds(), false);
        assert_eq!(d, Decision::new(Verdict::Force, "1000 tokens changed"));

        let d = decide(&mag(1.0, 150), &Diff::default(), &thresholds(), false);
        assert_eq!(d, Decision::new(Verdict::Recommend, "150 tokens changed"));
    }

    #[test]
    fn recommend_percent() {
        let d = decide(&mag(12.5, 0), &Diff::default(), &thresholds(), false);
        assert_eq!(d, Decision::new(Verdict::Recommend, "project changed 12.50%"));
    }

    #[test]
    fn below_all_thresholds_keeps() {
        let d = decide(&mag(9.99, 99), &Diff::default(), &thresholds(), false);
        assert_eq!(d.verdict, Verdict::Keep);
        assert!(d.reason.is_none());
        assert!(!d.verdict.wants_rebuild());
    }

    #[test]
    fn verdict_ordering_and_display() {
        assert!(Verdict::Force > Verdict::Recommend);
        assert!(Verdict::Recommend > Verdict::Keep);
        assert_eq!(Verdict::Recommend.to_string(), "recommend");
    }

    #[test]
    fn costs() {
        assert!((cache_write_cost(2_000_000) - 1.0).abs() < 1e-12);
        assert!((cache_storage_cost(500_000, 3) - 1.5).abs() < 1e-12);
        assert!((cache_hit_savings(1_000_000) - 0.45).abs() < 1e-12);
    }

    #[test]
    fn expiry_adds_hours() {
        let now = Utc.with_ymd_and_hms(2026, 1, 1, 23, 30, 0).unwrap();
        let expiry = compute_expiry(now, 2);
        assert_eq!(expiry, Utc.with_ymd_and_hms(2026, 1, 2, 1, 30, 0).unwrap());
    }
}
