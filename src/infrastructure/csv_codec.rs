// CSV codec - sample series export/import and uploaded dataset reading
use crate::domain::dataset::ExternalDataset;
use crate::domain::error::DatasetError;
use crate::domain::glucose::{Sample, SampleSeries};
use serde::Deserialize;

pub const TIME_COLUMN: &str = "Time";
pub const GLUCOSE_COLUMN: &str = "Glucose (mg/dL)";
pub const INSULIN_COLUMN: &str = "Insulin (units)";

#[derive(Debug, Deserialize)]
struct SeriesRow {
    #[serde(rename = "Time")]
    time: u64,
    #[serde(rename = "Glucose (mg/dL)")]
    glucose: f64,
    #[serde(rename = "Insulin (units)")]
    insulin: f64,
}

fn malformed(err: csv::Error) -> DatasetError {
    DatasetError::Malformed(err.to_string())
}

/// Render a series as CSV: header first, one row per sample, two decimals.
pub fn export_csv(series: &SampleSeries) -> Result<Vec<u8>, csv::Error> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record([TIME_COLUMN, GLUCOSE_COLUMN, INSULIN_COLUMN])?;

    for sample in series {
        writer.write_record([
            sample.time.to_string(),
            format!("{:.2}", sample.glucose),
            format!("{:.2}", sample.insulin),
        ])?;
    }

    writer
        .into_inner()
        .map_err(|e| csv::Error::from(e.into_error()))
}

/// Read back a file produced by [`export_csv`].
pub fn parse_series_csv(bytes: &[u8]) -> Result<SampleSeries, DatasetError> {
    let mut reader = csv::Reader::from_reader(bytes);
    let mut series = SampleSeries::new();

    for (idx, row) in reader.deserialize::<SeriesRow>().enumerate() {
        let row = row.map_err(malformed)?;
        let in_order = series.last().map_or(true, |last| row.time == last.time + 1);
        let readable = row.glucose.is_finite() && row.insulin.is_finite() && row.insulin >= 0.0;
        if !in_order || !readable {
            return Err(DatasetError::InvalidReading {
                row: idx + 1,
                value: format!("{},{},{}", row.time, row.glucose, row.insulin),
            });
        }
        series.push(Sample::new(row.time, row.glucose, row.insulin));
    }

    Ok(series)
}

/// Read an uploaded CSV with a header row into a dataset. Ragged rows are allowed.
pub fn read_dataset(bytes: &[u8]) -> Result<ExternalDataset, DatasetError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(bytes);

    let columns: Vec<String> = reader
        .headers()
        .map_err(malformed)?
        .iter()
        .map(str::to_string)
        .collect();
    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(malformed)?;
        rows.push(record.iter().map(str::to_string).collect());
    }

    Ok(ExternalDataset::new(columns, rows))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::controller::ControllerConfig;
    use crate::domain::model::{GlucoseModel, RandomNoise};
    use crate::domain::simulation::{InitialGlucose, run_batch};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn series(samples: &[(u64, f64, f64)]) -> SampleSeries {
        let mut series = SampleSeries::new();
        for (t, g, i) in samples {
            series.push(Sample::new(*t, *g, *i));
        }
        series
    }

    #[test]
    fn test_export_format() {
        let csv = export_csv(&series(&[(0, 118.784, 12.2), (1, 117.5, 0.0)])).unwrap();
        let text = String::from_utf8(csv).unwrap();

        assert_eq!(
            text,
            "Time,Glucose (mg/dL),Insulin (units)\n0,118.78,12.20\n1,117.50,0.00\n"
        );
    }

    #[test]
    fn test_export_empty_series_has_header_only() {
        let csv = export_csv(&SampleSeries::new()).unwrap();
        assert_eq!(
            String::from_utf8(csv).unwrap(),
            "Time,Glucose (mg/dL),Insulin (units)\n"
        );
    }

    #[test]
    fn test_simulated_series_survives_round_trip() {
        let report = run_batch(
            GlucoseModel::default(),
            RandomNoise::new(StdRng::seed_from_u64(8)),
            ControllerConfig::new(0.5, 0.01, 0.1, 100.0).unwrap(),
            100,
            InitialGlucose::Fixed(120.0),
        )
        .unwrap();

        let parsed = parse_series_csv(&export_csv(&report.series).unwrap()).unwrap();

        assert_eq!(parsed.len(), report.series.len());
        for (a, b) in parsed.iter().zip(report.series.iter()) {
            assert_eq!(a.time, b.time);
            assert!((a.glucose - b.glucose).abs() <= 0.005 + 1e-9);
            assert!((a.insulin - b.insulin).abs() <= 0.005 + 1e-9);
        }
    }

    #[test]
    fn test_parse_rejects_gap_in_time() {
        let csv = b"Time,Glucose (mg/dL),Insulin (units)\n0,120.00,1.00\n2,119.00,1.00\n";
        let err = parse_series_csv(csv).unwrap_err();
        assert!(matches!(err, DatasetError::InvalidReading { row: 2, .. }));
    }

    #[test]
    fn test_parse_rejects_non_finite_values() {
        let nan_dose = b"Time,Glucose (mg/dL),Insulin (units)\n0,120.00,NaN\n";
        assert!(matches!(
            parse_series_csv(nan_dose),
            Err(DatasetError::InvalidReading { row: 1, .. })
        ));

        let inf_glucose = b"Time,Glucose (mg/dL),Insulin (units)\n0,120.00,1.00\n1,inf,1.00\n";
        assert!(matches!(
            parse_series_csv(inf_glucose),
            Err(DatasetError::InvalidReading { row: 2, .. })
        ));
    }

    #[test]
    fn test_parse_reports_malformed_rows() {
        let csv = b"Time,Glucose (mg/dL),Insulin (units)\n0,abc,1.00\n";
        assert!(matches!(
            parse_series_csv(csv),
            Err(DatasetError::Malformed(_))
        ));
    }

    #[test]
    fn test_read_dataset_keeps_columns_and_rows() {
        let csv = b"Time, Glucose\n0, 101.5\n1,99\n2\n";
        let dataset = read_dataset(csv).unwrap();

        assert_eq!(dataset.columns(), ["Time", "Glucose"]);
        assert_eq!(dataset.row_count(), 3);
        assert_eq!(dataset.glucose_readings().unwrap(), vec![101.5, 99.0]);
    }

    #[test]
    fn test_read_dataset_without_glucose_column() {
        let dataset = read_dataset(b"Time,Value\n0,100\n").unwrap();
        assert!(matches!(
            dataset.glucose_readings(),
            Err(DatasetError::MissingField(_))
        ));
    }
}
