// Glucose domain models - samples, recorded series and safety classification
use serde::{Deserialize, Serialize};

/// Below this reading (mg/dL) the patient is hypoglycemic.
pub const HYPOGLYCEMIA_THRESHOLD: f64 = 70.0;

/// Above this reading (mg/dL) the patient is hyperglycemic.
pub const HYPERGLYCEMIA_THRESHOLD: f64 = 180.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GlucoseStatus {
    Normal,
    Hypoglycemia,
    Hyperglycemia,
}

impl GlucoseStatus {
    /// Advisory text for the presentation layer.
    pub fn message(&self) -> &'static str {
        match self {
            GlucoseStatus::Normal => "Glucose is in the normal range.",
            GlucoseStatus::Hypoglycemia => "Glucose too low! (Hypoglycemia risk)",
            GlucoseStatus::Hyperglycemia => "Glucose too high! (Hyperglycemia risk)",
        }
    }
}

impl std::fmt::Display for GlucoseStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GlucoseStatus::Normal => write!(f, "Normal"),
            GlucoseStatus::Hypoglycemia => write!(f, "Hypoglycemia"),
            GlucoseStatus::Hyperglycemia => write!(f, "Hyperglycemia"),
        }
    }
}

/// Classify a single reading. Both thresholds are exclusive.
pub fn classify(glucose: f64) -> GlucoseStatus {
    if glucose < HYPOGLYCEMIA_THRESHOLD {
        GlucoseStatus::Hypoglycemia
    } else if glucose > HYPERGLYCEMIA_THRESHOLD {
        GlucoseStatus::Hyperglycemia
    } else {
        GlucoseStatus::Normal
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub time: u64,
    pub glucose: f64,
    pub insulin: f64,
}

impl Sample {
    pub fn new(time: u64, glucose: f64, insulin: f64) -> Self {
        Self {
            time,
            glucose,
            insulin,
        }
    }

    pub fn status(&self) -> GlucoseStatus {
        classify(self.glucose)
    }
}

/// Append-only, time-ordered record of one run.
///
/// Consecutive samples differ by exactly one time step and no dose is negative.
/// Callers get snapshots by cloning; nothing outside the owning run mutates it.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct SampleSeries {
    samples: Vec<Sample>,
}

impl SampleSeries {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append the next sample.
    ///
    /// # Panics
    ///
    /// If `sample` breaks the ordering or carries a negative dose. The driver
    /// only produces samples that satisfy both, so this indicates a bug.
    pub fn push(&mut self, sample: Sample) {
        if let Some(last) = self.samples.last() {
            assert_eq!(
                sample.time,
                last.time + 1,
                "samples must advance by exactly one step"
            );
        }
        assert!(sample.insulin >= 0.0, "insulin dose cannot be negative");
        self.samples.push(sample);
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn last(&self) -> Option<&Sample> {
        self.samples.last()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Sample> {
        self.samples.iter()
    }

    pub fn as_slice(&self) -> &[Sample] {
        &self.samples
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }
}

impl<'a> IntoIterator for &'a SampleSeries {
    type Item = &'a Sample;
    type IntoIter = std::slice::Iter<'a, Sample>;

    fn into_iter(self) -> Self::IntoIter {
        self.samples.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_thresholds() {
        assert_eq!(classify(69.99), GlucoseStatus::Hypoglycemia);
        assert_eq!(classify(100.0), GlucoseStatus::Normal);
        assert_eq!(classify(180.01), GlucoseStatus::Hyperglycemia);
        assert_eq!(classify(-5.0), GlucoseStatus::Hypoglycemia);
    }

    #[test]
    fn test_classify_boundaries_are_normal() {
        assert_eq!(classify(70.0), GlucoseStatus::Normal);
        assert_eq!(classify(180.0), GlucoseStatus::Normal);
    }

    #[test]
    fn test_status_display_names() {
        assert_eq!(GlucoseStatus::Normal.to_string(), "Normal");
        assert_eq!(classify(65.0).to_string(), "Hypoglycemia");
        assert_eq!(classify(181.0).to_string(), "Hyperglycemia");
    }

    #[test]
    fn test_classify_is_repeatable() {
        for glucose in [42.0, 70.0, 121.5, 180.0, 250.0] {
            let first = classify(glucose);
            for _ in 0..5 {
                assert_eq!(classify(glucose), first);
            }
        }
    }

    #[test]
    fn test_series_accepts_consecutive_samples() {
        let mut series = SampleSeries::new();
        series.push(Sample::new(0, 120.0, 0.0));
        series.push(Sample::new(1, 118.0, 2.5));

        assert_eq!(series.len(), 2);
        assert_eq!(series.last().map(|s| s.time), Some(1));
    }

    #[test]
    #[should_panic(expected = "exactly one step")]
    fn test_series_rejects_gap() {
        let mut series = SampleSeries::new();
        series.push(Sample::new(0, 120.0, 0.0));
        series.push(Sample::new(2, 118.0, 0.0));
    }

    #[test]
    #[should_panic(expected = "negative")]
    fn test_series_rejects_negative_dose() {
        let mut series = SampleSeries::new();
        series.push(Sample::new(0, 120.0, -1.0));
    }

    #[test]
    fn test_series_serializes_as_array() {
        let mut series = SampleSeries::new();
        series.push(Sample::new(0, 120.0, 1.5));

        let json = serde_json::to_value(&series).unwrap();
        assert_eq!(
            json,
            serde_json::json!([{ "time": 0, "glucose": 120.0, "insulin": 1.5 }])
        );
    }
}
