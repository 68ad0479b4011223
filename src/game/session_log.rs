/// Suggested file name when the log is offered as a download.
pub const LOG_FILE_NAME: &str = "whackamole_log.txt";

/// Plain-text record of what happened during the page session; exported when
/// a round ends.
#[derive(Clone, Debug, Default)]
pub struct SessionLog {
    lines: Vec<String>,
}

impl SessionLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, line: impl Into<String>) {
        self.lines.push(line.into());
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// One line per entry, each newline terminated.
    pub fn contents(&self) -> String {
        let mut out = String::with_capacity(self.lines.iter().map(|l| l.len() + 1).sum());
        for line in &self.lines {
            out.push_str(line);
            out.push('\n');
        }
        out
    }
}
