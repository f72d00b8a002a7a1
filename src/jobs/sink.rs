use crate::constants::SINK_TIMESTAMP_FORMAT;
use crate::error::Result;
use chrono::Local;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

/// An append-only, plain-text event sink. One line per event, each prefixed
/// with a `YYYY-MM-DD HH:MM:SS` timestamp.
pub struct LogSink {
    path: PathBuf,
}

impl LogSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn append(&self, message: &str) -> Result<()> {
        let timestamp = Local::now().format(SINK_TIMESTAMP_FORMAT);
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{timestamp} {message}")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use regex::Regex;

    #[test]
    fn lines_are_appended_with_timestamp_prefix() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sink.txt");
        let sink = LogSink::new(&path);

        sink.append("CRM is alive").unwrap();
        sink.append("second line").unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);

        let re = Regex::new(r"^\d{4}-\d{2}-\d{2} \d{2}:\d{2}:\d{2} CRM is alive$").unwrap();
        assert!(re.is_match(lines[0]), "unexpected line: {}", lines[0]);
        assert!(lines[1].ends_with("second line"));
    }
}
