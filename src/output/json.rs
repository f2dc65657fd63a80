//! JSON report writer

use crate::config::OutputConfig;
use crate::output::aggregator::CrawlReport;
use crate::output::traits::{OutputError, OutputHandler, OutputResult};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Writes the report as a JSON object keyed by collection name
#[derive(Debug, Clone)]
pub struct JsonReportWriter {
    path: PathBuf,
    pretty: bool,
}

impl JsonReportWriter {
    /// Creates a writer targeting `path`
    pub fn new(path: impl Into<PathBuf>, pretty: bool) -> Self {
        Self {
            path: path.into(),
            pretty,
        }
    }

    /// Creates a writer from the `[output]` configuration section
    pub fn from_config(config: &OutputConfig) -> Self {
        Self::new(&config.report_path, config.pretty)
    }

    /// The target path
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Serializes a report to a JSON string
pub fn report_to_json(report: &CrawlReport, pretty: bool) -> Result<String, serde_json::Error> {
    if pretty {
        serde_json::to_string_pretty(report)
    } else {
        serde_json::to_string(report)
    }
}

impl OutputHandler for JsonReportWriter {
    fn write_report(&self, report: &CrawlReport) -> OutputResult<()> {
        let write_err = |source: std::io::Error| OutputError::Write {
            path: self.path.display().to_string(),
            source,
        };

        let file = File::create(&self.path).map_err(write_err)?;
        let mut writer = BufWriter::new(file);

        if self.pretty {
            serde_json::to_writer_pretty(&mut writer, report)?;
        } else {
            serde_json::to_writer(&mut writer, report)?;
        }
        writer.write_all(b"\n").map_err(write_err)?;
        writer.flush().map_err(write_err)?;

        tracing::info!("Report written to {}", self.path.display());
        Ok(())
    }

    fn destination(&self) -> String {
        self.path.display().to_string()
    }
}
