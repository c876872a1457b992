//! Severity tiers and the bucket table that maps raw values onto them
//!
//! Severity is a step function, not a formula. Transform rules gate on it.

use serde::{Deserialize, Serialize};

/// Damage severity categories, ordered from nothing to the worst
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// No wound
    None,
    /// Cosmetic only
    Superficial,
    Minor,
    Small,
    Moderate,
    Severe,
    VerySevere,
    Grievous,
    /// Anything past the last bucket
    Horrifying,
}

impl Severity {
    pub fn all() -> [Severity; 9] {
        [
            Severity::None,
            Severity::Superficial,
            Severity::Minor,
            Severity::Small,
            Severity::Moderate,
            Severity::Severe,
            Severity::VerySevere,
            Severity::Grievous,
            Severity::Horrifying,
        ]
    }
}

/// One bucket: every value up to and including `upper` falls into `severity`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeverityBucket {
    pub upper: f32,
    pub severity: Severity,
}

/// Ordered bucket table. Values above the last bound are `Horrifying`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SeverityTable {
    buckets: Vec<SeverityBucket>,
}

impl SeverityTable {
    pub fn new(buckets: Vec<SeverityBucket>) -> Self {
        Self { buckets }
    }

    pub fn buckets(&self) -> &[SeverityBucket] {
        &self.buckets
    }

    /// Map a raw value onto its tier.
    ///
    /// Buckets are checked from the lowest bound up; the first bound the
    /// value does not exceed wins.
    pub fn severity(&self, value: f32) -> Severity {
        self.buckets
            .iter()
            .find(|bucket| value <= bucket.upper)
            .map(|bucket| bucket.severity)
            .unwrap_or(Severity::Horrifying)
    }

    /// Bounds must increase strictly and tiers must not go backwards
    pub fn validate(&self) -> Result<(), String> {
        for pair in self.buckets.windows(2) {
            if pair[1].upper <= pair[0].upper {
                return Err(format!(
                    "severity bound {} does not exceed previous bound {}",
                    pair[1].upper, pair[0].upper
                ));
            }
            if pair[1].severity < pair[0].severity {
                return Err(format!(
                    "severity {:?} follows higher severity {:?}",
                    pair[1].severity, pair[0].severity
                ));
            }
        }
        Ok(())
    }
}

impl Default for SeverityTable {
    fn default() -> Self {
        let bounds = [
            (0.0, Severity::None),
            (2.0, Severity::Superficial),
            (4.0, Severity::Minor),
            (7.0, Severity::Small),
            (12.0, Severity::Moderate),
            (18.0, Severity::Severe),
            (27.0, Severity::VerySevere),
            (40.0, Severity::Grievous),
        ];
        Self::new(
            bounds
                .iter()
                .map(|&(upper, severity)| SeverityBucket { upper, severity })
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_ordering() {
        let all = Severity::all();
        for pair in all.windows(2) {
            assert!(pair[0] < pair[1]);
        }
    }

    #[test]
    fn test_default_buckets() {
        let table = SeverityTable::default();
        assert_eq!(table.severity(0.0), Severity::None);
        assert_eq!(table.severity(-3.0), Severity::None);
        assert_eq!(table.severity(1.5), Severity::Superficial);
        assert_eq!(table.severity(2.0), Severity::Superficial);
        assert_eq!(table.severity(2.01), Severity::Minor);
        assert_eq!(table.severity(12.0), Severity::Moderate);
        assert_eq!(table.severity(40.0), Severity::Grievous);
        assert_eq!(table.severity(40.5), Severity::Horrifying);
    }

    #[test]
    fn test_severity_is_monotonic() {
        let table = SeverityTable::default();
        let mut last = Severity::None;
        for step in 0..500 {
            let current = table.severity(step as f32 * 0.1);
            assert!(current >= last);
            last = current;
        }
    }

    #[test]
    fn test_default_table_validates() {
        assert!(SeverityTable::default().validate().is_ok());
    }

    #[test]
    fn test_unordered_table_rejected() {
        let table = SeverityTable::new(vec![
            SeverityBucket {
                upper: 5.0,
                severity: Severity::Minor,
            },
            SeverityBucket {
                upper: 3.0,
                severity: Severity::Moderate,
            },
        ]);
        assert!(table.validate().is_err());
    }
}
