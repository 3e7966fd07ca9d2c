//! Content Providers
//!
//! Preprocessors that deposit files into the pod before extraction runs,
//! e.g. a spreadsheet maintained outside the pod. Fetching is behind
//! [`SheetSource`]; the provider only decides what lands where.

use crate::error::{CatalogError, Result};
use crate::file_system::{FileSystem, PodPath};
use crate::i18n::extractors::{parse_csv, Table};
use crate::logging::Logger;
use serde_json::{Map, Value};
use std::path::PathBuf;

pub trait ContentProvider: Send + Sync {
    fn name(&self) -> &str;

    /// Deposit files into `fs`. Returns the written paths.
    fn run(&self, fs: &dyn FileSystem, logger: &dyn Logger) -> Result<Vec<PodPath>>;
}

/// Where a spreadsheet export comes from.
pub trait SheetSource: Send + Sync {
    /// The sheet as CSV text.
    fn fetch_csv(&self) -> Result<String>;

    fn describe(&self) -> String;
}

/// A CSV export already present on local disk.
#[derive(Debug, Clone)]
pub struct LocalSheetSource {
    path: PathBuf,
}

impl LocalSheetSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        LocalSheetSource { path: path.into() }
    }
}

impl SheetSource for LocalSheetSource {
    fn fetch_csv(&self) -> Result<String> {
        std::fs::read_to_string(&self.path)
            .map_err(|e| CatalogError::io(self.path.display().to_string(), e))
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// Writes a sheet to `path`. A `.json` destination receives an array of
/// row objects keyed by column name, in column order; anything else
/// receives the CSV as is.
pub struct SheetProvider<S> {
    source: S,
    path: PodPath,
}

impl<S: SheetSource> SheetProvider<S> {
    pub fn new(source: S, path: impl AsRef<str>) -> Self {
        SheetProvider {
            source,
            path: PodPath::new(path),
        }
    }
}

impl<S: SheetSource> ContentProvider for SheetProvider<S> {
    fn name(&self) -> &str {
        "sheet"
    }

    fn run(&self, fs: &dyn FileSystem, logger: &dyn Logger) -> Result<Vec<PodPath>> {
        let csv = self.source.fetch_csv()?;
        let content = match self.path.extension().as_deref() {
            Some("json") => {
                let (table, warnings) = parse_csv(&self.source.describe(), &csv);
                for warning in &warnings {
                    logger.warn(&warning.to_string());
                }
                csv_to_json(&table).map_err(|source| CatalogError::Json {
                    path: self.path.to_string(),
                    source,
                })?
            }
            _ => csv,
        };
        fs.ensure_dir(&self.path.dirname())
            .map_err(|e| CatalogError::io(self.path.dirname().as_str(), e))?;
        fs.write_file(&self.path, content.as_bytes())
            .map_err(|e| CatalogError::io(self.path.as_str(), e))?;
        logger.info(&format!("Downloaded sheet {} -> {}", self.source.describe(), self.path));
        Ok(vec![self.path.clone()])
    }
}

fn csv_to_json(table: &Table) -> serde_json::Result<String> {
    let rows: Vec<Value> = table
        .records()
        .map(|record| {
            let object: Map<String, Value> = record
                .into_iter()
                .map(|(column, cell)| (column.to_string(), Value::String(cell.to_string())))
                .collect();
            Value::Object(object)
        })
        .collect();
    serde_json::to_string(&Value::Array(rows))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::file_system::{MockFileSystem, ReadonlyFileSystem};
    use crate::logging::NullLogger;

    struct StaticSheet(&'static str);

    impl SheetSource for StaticSheet {
        fn fetch_csv(&self) -> Result<String> {
            Ok(self.0.to_string())
        }

        fn describe(&self) -> String {
            "static".to_string()
        }
    }

    const SHEET: &str = "key,label@,note\nintro,\"Hello, world\",first\noutro,Bye,\n";

    #[test]
    fn should_deposit_csv_verbatim() {
        let fs = MockFileSystem::new();
        let provider = SheetProvider::new(StaticSheet(SHEET), "/content/strings/sheet.csv");
        let written = provider.run(&fs, &NullLogger::new()).unwrap();
        assert_eq!(written, vec![PodPath::new("/content/strings/sheet.csv")]);
        assert_eq!(fs.read_file(&written[0]).unwrap(), SHEET);
    }

    #[test]
    fn should_convert_to_json_rows_in_column_order() {
        let fs = MockFileSystem::new();
        let provider = SheetProvider::new(StaticSheet(SHEET), "/data/sheet.json");
        provider.run(&fs, &NullLogger::new()).unwrap();
        let json = fs.read_file(&PodPath::new("/data/sheet.json")).unwrap();
        assert_eq!(
            json,
            r#"[{"key":"intro","label@":"Hello, world","note":"first"},{"key":"outro","label@":"Bye","note":""}]"#
        );
    }

    #[test]
    fn should_report_json_errors_with_destination() {
        let source = serde_json::from_str::<Value>("[").unwrap_err();
        let err = CatalogError::Json {
            path: "/data/sheet.json".to_string(),
            source,
        };
        assert!(err.to_string().starts_with("cannot write JSON to /data/sheet.json: "));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn should_fail_on_missing_local_export() {
        let source = LocalSheetSource::new("/nonexistent/export.csv");
        assert!(matches!(source.fetch_csv(), Err(CatalogError::Io { .. })));
    }
}
