use std::io::{self, Write as _};

/// Sink for the lines of an exception report.
///
/// Implement this trait to capture or redirect report output.
/// The default implementation `StdReport` writes to stdout.
pub trait ReportWriter {
    /// Writes a single report line.
    ///
    /// `line` never carries its own terminator; implementations add one.
    /// A frame line may contain embedded newlines (the source preview
    /// that `traceback.format_tb` attaches to a frame).
    fn write_line(&mut self, line: &str) -> io::Result<()>;

    /// Called once after the last line of a report.
    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<W: ReportWriter + ?Sized> ReportWriter for &mut W {
    fn write_line(&mut self, line: &str) -> io::Result<()> {
        (**self).write_line(line)
    }

    fn flush(&mut self) -> io::Result<()> {
        (**self).flush()
    }
}

/// Default `ReportWriter` that writes to the process's stdout.
///
/// Flushing matters here: the interpreter's default printer writes to its own
/// `sys.stderr`, and the explicit report must reach the terminal first.
#[derive(Debug, Default)]
pub struct StdReport;

impl ReportWriter for StdReport {
    fn write_line(&mut self, line: &str) -> io::Result<()> {
        let mut stdout = io::stdout().lock();
        stdout.write_all(line.as_bytes())?;
        stdout.write_all(b"\n")
    }

    fn flush(&mut self) -> io::Result<()> {
        io::stdout().flush()
    }
}

/// A `ReportWriter` that collects every line in memory.
///
/// Useful for testing or capturing a report programmatically.
#[derive(Debug, Default)]
pub struct CollectReport(Vec<String>);

impl CollectReport {
    /// Creates a new empty `CollectReport`.
    #[must_use]
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Returns the collected lines in write order.
    #[must_use]
    pub fn lines(&self) -> &[String] {
        &self.0
    }

    /// Returns the collected output the way `StdReport` would have printed it.
    #[must_use]
    pub fn output(&self) -> String {
        let mut out = String::new();
        for line in &self.0 {
            out.push_str(line);
            out.push('\n');
        }
        out
    }

    /// Consumes the writer and returns the collected lines.
    #[must_use]
    pub fn into_lines(self) -> Vec<String> {
        self.0
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl ReportWriter for CollectReport {
    fn write_line(&mut self, line: &str) -> io::Result<()> {
        self.0.push(line.to_owned());
        Ok(())
    }
}
