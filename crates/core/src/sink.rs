use crate::config::SheetDestination;
use crate::error::SinkError;
use crate::traits::RemoteTable;
use crate::ResultSet;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub const EXPORT_HEADERS: [&str; 2] = ["Company", "Extracted Info"];

/// Header row followed by one `[entity, cell]` row per result.
pub fn export_rows(results: &ResultSet) -> Vec<Vec<String>> {
    let mut rows = Vec::with_capacity(results.len() + 1);
    rows.push(EXPORT_HEADERS.iter().map(|header| header.to_string()).collect());
    rows.extend(
        results
            .iter()
            .map(|result| vec![result.entity.clone(), result.display_value()]),
    );
    rows
}

pub fn export_csv(results: &ResultSet) -> Result<Vec<u8>, SinkError> {
    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    for row in export_rows(results) {
        writer.write_record(&row)?;
    }

    writer
        .into_inner()
        .map_err(|error| SinkError::Io(error.into_error()))
}

#[derive(Debug)]
pub struct Export {
    pub path: PathBuf,
    pub bytes: usize,
    pub rows: usize,
}

#[derive(Debug)]
pub struct SinkReport {
    pub export: Export,
    /// `None` when no remote destination was configured.
    pub sync: Option<Result<(), SinkError>>,
}

impl SinkReport {
    pub fn sync_failed(&self) -> bool {
        matches!(self.sync, Some(Err(_)))
    }
}

pub struct ResultSink<T: RemoteTable> {
    remote: Option<(T, SheetDestination)>,
}

impl<T: RemoteTable> Default for ResultSink<T> {
    fn default() -> Self {
        Self { remote: None }
    }
}

impl<T: RemoteTable> ResultSink<T> {
    pub fn local_only() -> Self {
        Self::default()
    }

    pub fn with_remote(table: T, destination: SheetDestination) -> Self {
        Self {
            remote: Some((table, destination)),
        }
    }

    pub async fn export(&self, results: &ResultSet, path: &Path) -> Result<Export, SinkError> {
        let bytes = export_csv(results)?;
        tokio::fs::write(path, &bytes).await?;

        info!(path = %path.display(), rows = results.len(), bytes = bytes.len(), "csv exported");
        Ok(Export {
            path: path.to_path_buf(),
            bytes: bytes.len(),
            rows: results.len(),
        })
    }

    pub async fn sync(&self, results: &ResultSet) -> Option<Result<(), SinkError>> {
        let (table, destination) = self.remote.as_ref()?;
        let outcome = table.replace_values(destination, &export_rows(results)).await;

        match &outcome {
            Ok(()) => info!(
                spreadsheet_id = %destination.spreadsheet_id,
                range = %destination.range(),
                rows = results.len(),
                "remote sheet updated"
            ),
            Err(error) => warn!(
                spreadsheet_id = %destination.spreadsheet_id,
                error = %error,
                "remote sheet update failed; local export is unaffected"
            ),
        }

        Some(outcome)
    }

    /// Writes the local export, then attempts the remote sync.
    ///
    /// Only a failed local export is an `Err`; a sync failure is carried in
    /// the report.
    pub async fn deliver(&self, results: &ResultSet, path: &Path) -> Result<SinkReport, SinkError> {
        let export = self.export(results, path).await?;
        let sync = self.sync(results).await;
        Ok(SinkReport { export, sync })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{RowError, RowErrorKind};
    use crate::ExtractionResult;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use tempfile::tempdir;

    #[derive(Default)]
    struct RecordingTable {
        fail: bool,
        written: Mutex<Vec<Vec<String>>>,
    }

    #[async_trait]
    impl RemoteTable for RecordingTable {
        async fn read_values(
            &self,
            _destination: &SheetDestination,
        ) -> Result<Vec<Vec<String>>, SinkError> {
            Ok(self.written.lock().unwrap().clone())
        }

        async fn replace_values(
            &self,
            destination: &SheetDestination,
            rows: &[Vec<String>],
        ) -> Result<(), SinkError> {
            if self.fail {
                return Err(SinkError::Remote {
                    destination: destination.spreadsheet_id.clone(),
                    details: "403 Forbidden".to_string(),
                });
            }
            *self.written.lock().unwrap() = rows.to_vec();
            Ok(())
        }
    }

    fn sample() -> ResultSet {
        ResultSet::from_ordered(vec![
            ExtractionResult::success("Acme Inc", "contact@acme.com"),
            ExtractionResult::failure(
                "Umbrella Corp",
                RowError::new(RowErrorKind::Search, "quota exhausted"),
            ),
            ExtractionResult::success("Globex, \"The\" Corp", "line one\nline two"),
        ])
    }

    #[test]
    fn csv_has_header_and_quotes_special_cells() {
        let bytes = export_csv(&sample()).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert_eq!(
            text,
            "Company,Extracted Info\n\
             Acme Inc,contact@acme.com\n\
             Umbrella Corp,[error: search] quota exhausted\n\
             \"Globex, \"\"The\"\" Corp\",\"line one\nline two\"\n"
        );
    }

    #[test]
    fn export_is_byte_identical_across_runs() {
        let results = sample();
        assert_eq!(export_csv(&results).unwrap(), export_csv(&results).unwrap());
    }

    #[test]
    fn empty_result_set_exports_only_the_header() {
        let text = String::from_utf8(export_csv(&ResultSet::default()).unwrap()).unwrap();
        assert_eq!(text, "Company,Extracted Info\n");
    }

    #[tokio::test]
    async fn sync_failure_keeps_the_local_export() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let path = dir.path().join("extracted_data.csv");
        let sink = ResultSink::with_remote(
            RecordingTable {
                fail: true,
                ..RecordingTable::default()
            },
            SheetDestination::new("sheet-id", "Leads"),
        );

        let report = sink.deliver(&sample(), &path).await?;
        assert!(report.sync_failed());
        assert_eq!(report.export.rows, 3);
        assert_eq!(std::fs::read(&path)?, export_csv(&sample())?);
        Ok(())
    }

    #[tokio::test]
    async fn sync_writes_the_same_rows_as_the_export() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let table = RecordingTable::default();
        let destination = SheetDestination::new("sheet-id", "Leads");
        let sink = ResultSink::with_remote(table, destination.clone());

        let report = sink.deliver(&sample(), &dir.path().join("out.csv")).await?;
        assert!(matches!(report.sync, Some(Ok(()))));

        let (table, _) = sink.remote.as_ref().unwrap();
        let written = table.read_values(&destination).await?;
        assert_eq!(written, export_rows(&sample()));
        assert_eq!(written[0], vec!["Company", "Extracted Info"]);
        Ok(())
    }

    #[tokio::test]
    async fn local_only_sink_skips_sync() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let sink: ResultSink<RecordingTable> = ResultSink::local_only();
        let report = sink.deliver(&sample(), &dir.path().join("out.csv")).await?;
        assert!(report.sync.is_none());
        Ok(())
    }
}
