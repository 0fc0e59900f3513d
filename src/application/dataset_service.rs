// Dataset service - validate and summarise uploaded glucose readings
use crate::domain::dataset::DatasetReport;
use crate::domain::error::DatasetError;
use crate::infrastructure::csv_codec::read_dataset;

#[derive(Clone)]
pub struct DatasetService {
    default_target: f64,
}

impl DatasetService {
    pub fn new(default_target: f64) -> Self {
        Self { default_target }
    }

    /// Parse an uploaded CSV. Nothing is simulated; the report is for display only.
    pub fn analyze(&self, csv: &[u8], target: Option<f64>) -> Result<DatasetReport, DatasetError> {
        let dataset = read_dataset(csv)?;
        let report = DatasetReport::build(&dataset, target.unwrap_or(self.default_target))?;

        tracing::info!(
            "Analyzed dataset: {} rows, {} readings",
            dataset.row_count(),
            report.readings.len()
        );
        Ok(report)
    }
}
