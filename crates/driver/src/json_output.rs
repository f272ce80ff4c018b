/// Machine-readable output.
///
/// `--output-format json` prints the whole [`Report`] to stdout once the run
/// ends; `--json-log` streams one JSON line per retained case while it runs,
/// so a crashed or interrupted run still leaves its findings behind.
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::sync::{Mutex, PoisonError};

use typefuzz_engine::{Finding, Report};

/// Print the JSON report to stdout.
///
/// JSON goes to stdout only; progress and warnings stay on stderr.
pub fn print_json_report(report: &Report) {
    match report.to_json() {
        Ok(json) => println!("{json}"),
        Err(e) => {
            eprintln!("[typefuzz] Error serializing JSON report: {e}");
        }
    }
}

/// JSON-lines sink shared by the worker threads.
pub struct JsonLog<W: Write> {
    writer: Mutex<W>,
}

impl JsonLog<BufWriter<File>> {
    /// Create or truncate the log file.
    pub fn create(path: &Path) -> io::Result<Self> {
        Ok(Self::new(BufWriter::new(File::create(path)?)))
    }
}

impl<W: Write> JsonLog<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    /// Append one finding and flush it, so each line is complete on disk.
    pub fn append(&self, finding: &Finding) -> io::Result<()> {
        let mut writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        serde_json::to_writer(&mut *writer, finding)?;
        writer.write_all(b"\n")?;
        writer.flush()
    }

    pub fn into_inner(self) -> W {
        self.writer.into_inner().unwrap_or_else(PoisonError::into_inner)
    }
}
