// Uploaded glucose datasets - display only, no control computation
use crate::domain::error::DatasetError;
use crate::domain::glucose::{GlucoseStatus, classify};
use serde::Serialize;

/// Column that must be present for a dataset to be displayed.
pub const GLUCOSE_FIELD: &str = "Glucose";

/// Rows shown back to the user as a preview.
pub const PREVIEW_ROWS: usize = 5;

/// Tabular readings supplied from outside, e.g. an uploaded CSV.
#[derive(Debug, Clone, PartialEq)]
pub struct ExternalDataset {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl ExternalDataset {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { columns, rows }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    fn field_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.trim() == name)
    }

    /// Numeric glucose readings in row order. Blank cells are skipped; anything
    /// that is not a finite number is rejected.
    pub fn glucose_readings(&self) -> Result<Vec<f64>, DatasetError> {
        let idx = self
            .field_index(GLUCOSE_FIELD)
            .ok_or_else(|| DatasetError::MissingField(GLUCOSE_FIELD.to_string()))?;

        let mut readings = Vec::with_capacity(self.rows.len());
        for (row, record) in self.rows.iter().enumerate() {
            let cell = record.get(idx).map(|c| c.trim()).unwrap_or("");
            if cell.is_empty() {
                continue;
            }
            match cell.parse::<f64>() {
                Ok(value) if value.is_finite() => readings.push(value),
                _ => {
                    return Err(DatasetError::InvalidReading {
                        row: row + 1,
                        value: cell.to_string(),
                    });
                }
            }
        }

        Ok(readings)
    }

    pub fn preview(&self, rows: usize) -> PreviewTable {
        PreviewTable {
            columns: self.columns.clone(),
            rows: self.rows.iter().take(rows).cloned().collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PreviewTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReadingSummary {
    pub count: usize,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub mean: Option<f64>,
    pub normal: usize,
    pub hypoglycemia: usize,
    pub hyperglycemia: usize,
}

impl ReadingSummary {
    pub fn from_readings(readings: &[f64], statuses: &[GlucoseStatus]) -> Self {
        let count = readings.len();
        let (min, max, mean) = if count == 0 {
            (None, None, None)
        } else {
            let min = readings.iter().cloned().fold(f64::INFINITY, f64::min);
            let max = readings.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
            let mean = readings.iter().sum::<f64>() / count as f64;
            (Some(min), Some(max), Some(mean))
        };
        let tally = |wanted: GlucoseStatus| statuses.iter().filter(|s| **s == wanted).count();

        Self {
            count,
            min,
            max,
            mean,
            normal: tally(GlucoseStatus::Normal),
            hypoglycemia: tally(GlucoseStatus::Hypoglycemia),
            hyperglycemia: tally(GlucoseStatus::Hyperglycemia),
        }
    }
}

/// Everything the presentation layer needs to chart an uploaded dataset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatasetReport {
    pub target_glucose: f64,
    pub preview: PreviewTable,
    pub readings: Vec<f64>,
    pub statuses: Vec<GlucoseStatus>,
    pub summary: ReadingSummary,
}

impl DatasetReport {
    pub fn build(dataset: &ExternalDataset, target_glucose: f64) -> Result<Self, DatasetError> {
        let readings = dataset.glucose_readings()?;
        let statuses: Vec<GlucoseStatus> = readings.iter().map(|g| classify(*g)).collect();
        let summary = ReadingSummary::from_readings(&readings, &statuses);

        Ok(Self {
            target_glucose,
            preview: dataset.preview(PREVIEW_ROWS),
            readings,
            statuses,
            summary,
        })
    }
}
