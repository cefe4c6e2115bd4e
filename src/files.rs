//! Shipment file manager - keeps the local CSV files mirroring the
//! latest export and reports their reconciliation status
//!
//! The status check reads a CSV, slices a fixed row range, extracts the
//! order-number column, dedupes, sorts, and joins. The row range uses
//! Python-style slice bounds (the upstream export generator's contract
//! is specified that way): `end_row = None` means through the last row,
//! a negative end counts back from the end, and both bounds are
//! exclusive at the top.

use std::collections::BTreeSet;
use std::fmt;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context};
use tracing::{debug, info};

use crate::api::{ExportDownloader, RequestError};
use crate::settings::Settings;

/// Order-number column of the commodities file
pub const COMMODITIES_ORDER_NUMBER_COLUMN: usize = 0;
/// First data row of the commodities file (row 0 is the header)
pub const COMMODITIES_START_ROW: usize = 1;
/// Commodities rows end one short of the file; the last row is a totals footer
pub const COMMODITIES_END_ROW: Option<isize> = Some(-1);

/// Order-number column of the address file
pub const ADDRESS_ORDER_NUMBER_COLUMN: usize = 17;
/// First data row of the address file (row 0 is the header)
pub const ADDRESS_START_ROW: usize = 1;
/// Address rows run through the end of the file
pub const ADDRESS_END_ROW: Option<isize> = None;

/// Reconciliation status of a local shipping file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileStatus {
    /// The file does not exist; a normal state, not an error
    Missing,
    /// The file could not be read or parsed
    Invalid,
    /// Comma-joined sorted unique order numbers found in the file
    Orders(String),
}

impl fmt::Display for FileStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileStatus::Missing => f.write_str("Missing"),
            FileStatus::Invalid => f.write_str("Invalid"),
            FileStatus::Orders(orders) => f.write_str(orders),
        }
    }
}

/// Resolve Python-style slice bounds over `rows`
///
/// `end` of `None` runs through the last row; a negative `end` counts
/// back from the end. Out-of-range bounds clamp to an empty slice, they
/// never error.
fn slice_rows(rows: &[Vec<String>], start: usize, end: Option<isize>) -> &[Vec<String>] {
    let len = rows.len();
    let end = match end {
        None => len,
        Some(e) if e < 0 => len.saturating_sub(e.unsigned_abs()),
        Some(e) => (e as usize).min(len),
    };
    let start = start.min(len);
    if start >= end {
        &[]
    } else {
        &rows[start..end]
    }
}

/// Read a whole CSV file into memory as rows of fields
///
/// Parsed line by line so a blank line yields an empty row instead of
/// being skipped: blank rows must keep their index for the footer
/// slice, and extracting a column from one fails (mapping the status
/// to `Invalid`).
fn read_csv(path: &Path) -> anyhow::Result<Vec<Vec<String>>> {
    let content = fs::read_to_string(path)?;
    let mut rows = Vec::new();
    for line in content.lines() {
        if line.is_empty() {
            rows.push(Vec::new());
            continue;
        }
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(line.as_bytes());
        for record in reader.records() {
            let record = record?;
            rows.push(record.iter().map(String::from).collect());
        }
    }
    Ok(rows)
}

/// Manages the local commodities and address CSV files
pub struct ShipmentFileManager {
    pub shipment_directory: PathBuf,
    pub commodities_file_path: PathBuf,
    pub address_file_path: PathBuf,
}

impl ShipmentFileManager {
    /// Resolve file paths from loaded settings
    pub fn new(settings: &Settings) -> Self {
        ShipmentFileManager {
            shipment_directory: settings.shipment_directory.clone(),
            commodities_file_path: settings.commodities_file_path(),
            address_file_path: settings.address_file_path(),
        }
    }

    /// Status of the file at `path`, reading order numbers from the
    /// given column across the given row range
    ///
    /// A nonexistent file is `Missing`. Any failure while reading,
    /// parsing, or extracting is swallowed and reported as `Invalid`;
    /// the status display must never crash the application.
    pub fn get_file_status(
        &self,
        path: &Path,
        order_number_column: usize,
        start_row: usize,
        end_row: Option<isize>,
    ) -> FileStatus {
        if !path.is_file() {
            return FileStatus::Missing;
        }
        match self.read_order_numbers(path, order_number_column, start_row, end_row) {
            Ok(orders) => FileStatus::Orders(orders),
            Err(err) => {
                debug!(path = %path.display(), error = %err, "file status check failed");
                FileStatus::Invalid
            }
        }
    }

    fn read_order_numbers(
        &self,
        path: &Path,
        order_number_column: usize,
        start_row: usize,
        end_row: Option<isize>,
    ) -> anyhow::Result<String> {
        let rows = read_csv(path)?;
        let mut orders = BTreeSet::new();
        for row in slice_rows(&rows, start_row, end_row) {
            let cell = row
                .get(order_number_column)
                .ok_or_else(|| anyhow!("column {} out of range", order_number_column))?;
            orders.insert(cell.clone());
        }
        Ok(orders.into_iter().collect::<Vec<_>>().join(", "))
    }

    /// Status of the local commodities file
    pub fn get_commodities_file_status(&self) -> FileStatus {
        self.get_file_status(
            &self.commodities_file_path,
            COMMODITIES_ORDER_NUMBER_COLUMN,
            COMMODITIES_START_ROW,
            COMMODITIES_END_ROW,
        )
    }

    /// Status of the local address file
    pub fn get_address_file_status(&self) -> FileStatus {
        self.get_file_status(
            &self.address_file_path,
            ADDRESS_ORDER_NUMBER_COLUMN,
            ADDRESS_START_ROW,
            ADDRESS_END_ROW,
        )
    }

    /// Replace both local shipping files with the given export's files
    ///
    /// Downloads run sequentially with no rollback: if the commodities
    /// download succeeds and the address download fails, the
    /// commodities file stays updated and the error propagates.
    pub fn update_shipping_files(
        &self,
        downloader: &dyn ExportDownloader,
        export_id: i64,
    ) -> anyhow::Result<()> {
        self.update_commodities_file(downloader, export_id)?;
        self.update_address_file(downloader, export_id)?;
        info!(export_id, "shipping files updated");
        Ok(())
    }

    /// Replace the local commodities file
    pub fn update_commodities_file(
        &self,
        downloader: &dyn ExportDownloader,
        export_id: i64,
    ) -> anyhow::Result<()> {
        self.update_file(&self.commodities_file_path, |dest| {
            downloader.download_commodities_file(export_id, dest)
        })
    }

    /// Replace the local address file
    pub fn update_address_file(
        &self,
        downloader: &dyn ExportDownloader,
        export_id: i64,
    ) -> anyhow::Result<()> {
        self.update_file(&self.address_file_path, |dest| {
            downloader.download_address_file(export_id, dest)
        })
    }

    /// Stream a download into `target`, overwriting existing content
    fn update_file(
        &self,
        target: &Path,
        download: impl FnOnce(&mut dyn Write) -> Result<(), RequestError>,
    ) -> anyhow::Result<()> {
        let file = File::create(target)
            .with_context(|| format!("failed to open {} for writing", target.display()))?;
        let mut writer = BufWriter::new(file);
        download(&mut writer)?;
        writer
            .flush()
            .with_context(|| format!("failed to flush {}", target.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use tempfile::tempdir;

    fn test_settings(dir: &Path) -> Settings {
        Settings {
            protocol: String::from("http"),
            domain: String::from("localhost"),
            token: String::from("t"),
            shipment_directory: dir.to_path_buf(),
            commodities_file_name: String::from("commodities.csv"),
            address_file_name: String::from("address.csv"),
            window_width: 120,
            window_height: 40,
            theme: String::from("cyan"),
        }
    }

    fn fixture_rows() -> Vec<Vec<&'static str>> {
        vec![
            vec!["Col 1", "Col 2", "Col 3"],
            vec!["1", "A", "B"],
            vec!["2", "C", "D"],
            vec!["3", "E", "F"],
        ]
    }

    fn write_csv(path: &Path, rows: &[Vec<&str>]) {
        let mut writer = csv::Writer::from_path(path).unwrap();
        for row in rows {
            writer.write_record(row).unwrap();
        }
        writer.flush().unwrap();
    }

    #[test]
    fn test_sets_file_paths_from_settings() {
        let dir = tempdir().unwrap();
        let manager = ShipmentFileManager::new(&test_settings(dir.path()));
        assert_eq!(manager.shipment_directory, dir.path());
        assert_eq!(
            manager.commodities_file_path,
            dir.path().join("commodities.csv")
        );
        assert_eq!(manager.address_file_path, dir.path().join("address.csv"));
    }

    #[test]
    fn test_status_missing_when_file_does_not_exist() {
        let dir = tempdir().unwrap();
        let manager = ShipmentFileManager::new(&test_settings(dir.path()));
        let path = dir.path().join("absent.csv");
        assert_eq!(manager.get_file_status(&path, 0, 0, Some(0)), FileStatus::Missing);
        assert_eq!(manager.get_file_status(&path, 17, 1, None), FileStatus::Missing);
    }

    #[test]
    fn test_status_whole_file_first_column() {
        let dir = tempdir().unwrap();
        let manager = ShipmentFileManager::new(&test_settings(dir.path()));
        let path = dir.path().join("test.csv");
        write_csv(&path, &fixture_rows());
        assert_eq!(
            manager.get_file_status(&path, 0, 0, None),
            FileStatus::Orders(String::from("1, 2, 3, Col 1"))
        );
    }

    #[test]
    fn test_status_skips_header_and_footer() {
        let dir = tempdir().unwrap();
        let manager = ShipmentFileManager::new(&test_settings(dir.path()));
        let path = dir.path().join("test.csv");
        write_csv(&path, &fixture_rows());
        assert_eq!(
            manager.get_file_status(&path, 0, 1, Some(-1)),
            FileStatus::Orders(String::from("1, 2"))
        );
    }

    #[test]
    fn test_status_second_column() {
        let dir = tempdir().unwrap();
        let manager = ShipmentFileManager::new(&test_settings(dir.path()));
        let path = dir.path().join("test.csv");
        write_csv(&path, &fixture_rows());
        assert_eq!(
            manager.get_file_status(&path, 1, 0, None),
            FileStatus::Orders(String::from("A, C, Col 2, E"))
        );
    }

    #[test]
    fn test_status_deduplicates_and_sorts() {
        let dir = tempdir().unwrap();
        let manager = ShipmentFileManager::new(&test_settings(dir.path()));
        let path = dir.path().join("test.csv");
        write_csv(
            &path,
            &[vec!["ORD2"], vec!["ORD1"], vec!["ORD2"], vec!["ORD1"]],
        );
        assert_eq!(
            manager.get_file_status(&path, 0, 0, None),
            FileStatus::Orders(String::from("ORD1, ORD2"))
        );
    }

    #[test]
    fn test_status_invalid_when_column_out_of_range() {
        let dir = tempdir().unwrap();
        let manager = ShipmentFileManager::new(&test_settings(dir.path()));
        let path = dir.path().join("test.csv");
        write_csv(&path, &fixture_rows());
        assert_eq!(manager.get_file_status(&path, 5, 0, None), FileStatus::Invalid);
    }

    #[test]
    fn test_status_invalid_when_file_unreadable() {
        let dir = tempdir().unwrap();
        let manager = ShipmentFileManager::new(&test_settings(dir.path()));
        let path = dir.path().join("test.csv");
        // Not valid UTF-8, so CSV record parsing fails
        std::fs::write(&path, [0xff, 0xfe, 0xfa, b'x']).unwrap();
        assert_eq!(manager.get_file_status(&path, 0, 0, None), FileStatus::Invalid);
    }

    #[test]
    fn test_status_invalid_when_blank_interior_line() {
        let dir = tempdir().unwrap();
        let manager = ShipmentFileManager::new(&test_settings(dir.path()));
        let path = dir.path().join("test.csv");
        // The blank line is an empty row; extracting column 0 from it fails
        std::fs::write(&path, "h\n1\n\n2\n").unwrap();
        assert_eq!(manager.get_file_status(&path, 0, 1, None), FileStatus::Invalid);
    }

    #[test]
    fn test_blank_rows_keep_their_index_in_the_footer_slice() {
        let dir = tempdir().unwrap();
        let manager = ShipmentFileManager::new(&test_settings(dir.path()));
        let path = dir.path().join("test.csv");
        // A blank last line is the row the footer slice excludes
        std::fs::write(&path, "h\n1\n2\n\n").unwrap();
        assert_eq!(
            manager.get_file_status(&path, 0, 1, Some(-1)),
            FileStatus::Orders(String::from("1, 2"))
        );
    }

    #[test]
    fn test_read_csv_preserves_blank_lines_as_empty_rows() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.csv");
        std::fs::write(&path, "a,b\n\nc,d\n").unwrap();
        let rows = read_csv(&path).unwrap();
        assert_eq!(
            rows,
            vec![
                vec![String::from("a"), String::from("b")],
                Vec::new(),
                vec![String::from("c"), String::from("d")],
            ]
        );
    }

    #[test]
    fn test_status_empty_when_slice_selects_nothing() {
        let dir = tempdir().unwrap();
        let manager = ShipmentFileManager::new(&test_settings(dir.path()));
        let path = dir.path().join("test.csv");
        write_csv(&path, &fixture_rows());
        // Negative end past the start of the file
        assert_eq!(
            manager.get_file_status(&path, 0, 0, Some(-10)),
            FileStatus::Orders(String::new())
        );
        // Start past the end of the file
        assert_eq!(
            manager.get_file_status(&path, 0, 10, None),
            FileStatus::Orders(String::new())
        );
    }

    #[test]
    fn test_slice_rows_bounds() {
        let rows: Vec<Vec<String>> = (0..4).map(|i| vec![i.to_string()]).collect();
        assert_eq!(slice_rows(&rows, 0, None).len(), 4);
        assert_eq!(slice_rows(&rows, 1, None).len(), 3);
        assert_eq!(slice_rows(&rows, 1, Some(-1)).len(), 2);
        assert_eq!(slice_rows(&rows, 0, Some(2)).len(), 2);
        assert_eq!(slice_rows(&rows, 0, Some(10)).len(), 4);
        assert_eq!(slice_rows(&rows, 0, Some(-4)).len(), 0);
        assert_eq!(slice_rows(&rows, 0, Some(-5)).len(), 0);
        assert_eq!(slice_rows(&rows, 4, None).len(), 0);
        assert_eq!(slice_rows(&rows, 3, Some(-2)).len(), 0);
    }

    #[test]
    fn test_file_status_display() {
        assert_eq!(FileStatus::Missing.to_string(), "Missing");
        assert_eq!(FileStatus::Invalid.to_string(), "Invalid");
        assert_eq!(
            FileStatus::Orders(String::from("1, 2")).to_string(),
            "1, 2"
        );
    }

    /// Recording downloader used in place of the API client
    struct FakeDownloader {
        calls: RefCell<Vec<(&'static str, i64)>>,
        fail_address: bool,
    }

    impl FakeDownloader {
        fn new() -> Self {
            FakeDownloader {
                calls: RefCell::new(Vec::new()),
                fail_address: false,
            }
        }

        fn failing_address() -> Self {
            FakeDownloader {
                calls: RefCell::new(Vec::new()),
                fail_address: true,
            }
        }
    }

    impl ExportDownloader for FakeDownloader {
        fn download_commodities_file(
            &self,
            export_id: i64,
            dest: &mut dyn Write,
        ) -> Result<(), RequestError> {
            self.calls.borrow_mut().push(("commodities", export_id));
            dest.write_all(b"commodities contents").unwrap();
            Ok(())
        }

        fn download_address_file(
            &self,
            export_id: i64,
            dest: &mut dyn Write,
        ) -> Result<(), RequestError> {
            self.calls.borrow_mut().push(("address", export_id));
            if self.fail_address {
                return Err(RequestError::Status {
                    url: String::from("http://localhost/fba/api/download_address_file"),
                    status: 500,
                });
            }
            dest.write_all(b"address contents").unwrap();
            Ok(())
        }
    }

    #[test]
    fn test_update_shipping_files_downloads_each_once() {
        let dir = tempdir().unwrap();
        let manager = ShipmentFileManager::new(&test_settings(dir.path()));
        let downloader = FakeDownloader::new();
        manager.update_shipping_files(&downloader, 132).unwrap();
        assert_eq!(
            *downloader.calls.borrow(),
            vec![("commodities", 132), ("address", 132)]
        );
        assert_eq!(
            std::fs::read(&manager.commodities_file_path).unwrap(),
            b"commodities contents"
        );
        assert_eq!(
            std::fs::read(&manager.address_file_path).unwrap(),
            b"address contents"
        );
    }

    #[test]
    fn test_update_file_overwrites_existing_content() {
        let dir = tempdir().unwrap();
        let manager = ShipmentFileManager::new(&test_settings(dir.path()));
        std::fs::write(&manager.commodities_file_path, "stale and much longer contents").unwrap();
        let downloader = FakeDownloader::new();
        manager.update_commodities_file(&downloader, 7).unwrap();
        assert_eq!(
            std::fs::read(&manager.commodities_file_path).unwrap(),
            b"commodities contents"
        );
    }

    #[test]
    fn test_update_shipping_files_no_rollback_on_second_failure() {
        let dir = tempdir().unwrap();
        let manager = ShipmentFileManager::new(&test_settings(dir.path()));
        let downloader = FakeDownloader::failing_address();
        let err = manager.update_shipping_files(&downloader, 132).unwrap_err();
        assert!(err.to_string().contains("download_address_file"));
        // The first file stays updated
        assert_eq!(
            std::fs::read(&manager.commodities_file_path).unwrap(),
            b"commodities contents"
        );
    }
}
