//! The error formatter: writes a captured exception as plain text lines.
//!
//! Output is three parts, in order: one line with `str()` of the exception
//! type, one line with `str()` of the exception value, then one line per
//! traceback frame as rendered by the interpreter's `traceback.format_tb`.
//!
//! Reporting is best effort. Anything that goes wrong on the interpreter side
//! shortens the output and is described by [`ReportOutcome::Partial`]; the
//! only error returned to the caller is a failure to write to the sink.

use std::{fmt, io, str::FromStr};

use pyo3::prelude::*;

use crate::{
    output::ReportWriter,
    snapshot::ExceptionSnapshot,
    traceback::{TracebackFormatter, TracebackUnavailable},
};

/// Whether the interpreter's default printer runs after the explicit report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReportMode {
    /// Only write the explicit report.
    FormatOnly,
    /// Write the explicit report, then hand the exception to the interpreter's
    /// default printer (`sys.excepthook`, normally printing to `sys.stderr`),
    /// which consumes it. As with `PyErr_Print`, `sys.last_type`, `sys.last_value`
    /// and `sys.last_traceback` are set for post-mortem tools such as `pdb.pm()`.
    ///
    /// The default printer exits the process when the exception is `SystemExit`.
    #[default]
    FormatAndDelegate,
}

impl ReportMode {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::FormatOnly => "format_only",
            Self::FormatAndDelegate => "format_and_delegate",
        }
    }

    #[must_use]
    pub fn delegates(self) -> bool {
        self == Self::FormatAndDelegate
    }
}

impl fmt::Display for ReportMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid report mode '{0}', expected 'format_only' or 'format_and_delegate'")]
pub struct ParseReportModeError(String);

impl FromStr for ReportMode {
    type Err = ParseReportModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "format_only" => Ok(Self::FormatOnly),
            "format_and_delegate" => Ok(Self::FormatAndDelegate),
            _ => Err(ParseReportModeError(s.to_owned())),
        }
    }
}

/// Why a report is incomplete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PartialReason {
    /// Frame lines were omitted entirely.
    TracebackUnavailable(TracebackUnavailable),
    /// Frame `index` had no text form; frames from it onwards were omitted.
    FrameNotText { index: usize },
    TypeNotText,
    ValueNotText,
}

impl fmt::Display for PartialReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TracebackUnavailable(reason) => write!(f, "{reason}"),
            Self::FrameNotText { index } => write!(f, "traceback entry {index} is not text"),
            Self::TypeNotText => f.write_str("exception type is not convertible to text"),
            Self::ValueNotText => f.write_str("exception value is not convertible to text"),
        }
    }
}

/// What a report call managed to write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportOutcome {
    /// No exception was pending, nothing was written.
    NothingToReport,
    /// Type, value and every traceback frame were written.
    Reported { frames: usize },
    /// Something could not be fully reported, `frames` frame lines were written.
    Partial { frames: usize, reason: PartialReason },
}

impl ReportOutcome {
    /// Number of frame lines written.
    #[must_use]
    pub fn frames(&self) -> usize {
        match self {
            Self::NothingToReport => 0,
            Self::Reported { frames } | Self::Partial { frames, .. } => *frames,
        }
    }

    #[must_use]
    pub fn is_partial(&self) -> bool {
        matches!(self, Self::Partial { .. })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("failed to write exception report: {0}")]
    Write(#[from] io::Error),
}

/// Writes exceptions raised inside the embedded interpreter as text.
#[derive(Debug, Clone, Default)]
pub struct ErrorFormatter {
    mode: ReportMode,
    traceback: TracebackFormatter,
}

impl ErrorFormatter {
    #[must_use]
    pub fn new(mode: ReportMode) -> Self {
        Self {
            mode,
            traceback: TracebackFormatter::default(),
        }
    }

    /// Replaces the traceback formatting facility, `traceback.format_tb` by default.
    #[must_use]
    pub fn with_traceback(mut self, traceback: TracebackFormatter) -> Self {
        self.traceback = traceback;
        self
    }

    #[must_use]
    pub fn mode(&self) -> ReportMode {
        self.mode
    }

    /// Reports `err`, an exception the caller already holds.
    ///
    /// `err` itself is left untouched. In [`ReportMode::FormatAndDelegate`] a clone
    /// of it is then passed to the default printer, which leaves no exception
    /// pending afterwards.
    pub fn report(
        &self,
        py: Python<'_>,
        err: &PyErr,
        out: &mut impl ReportWriter,
    ) -> Result<ReportOutcome, ReportError> {
        let outcome = self.write_snapshot(py, err, out);
        if self.mode.delegates() {
            err.print_and_set_sys_last_vars(py);
        }
        outcome
    }

    /// Reports the exception currently pending in the interpreter, if any.
    ///
    /// With nothing pending this writes nothing and changes nothing. Otherwise the
    /// exception is taken, reported and restored as the same object, so in
    /// [`ReportMode::FormatOnly`] the caller finds it pending exactly as before.
    /// In [`ReportMode::FormatAndDelegate`] the default printer then consumes it.
    ///
    /// # Panics
    /// A pending `PanicException` (a Rust panic that crossed into Python) is
    /// resumed as a panic instead of being reported.
    pub fn report_pending(&self, py: Python<'_>, out: &mut impl ReportWriter) -> Result<ReportOutcome, ReportError> {
        let Some(err) = PyErr::take(py) else {
            tracing::debug!("no exception pending, nothing to report");
            return Ok(ReportOutcome::NothingToReport);
        };
        let outcome = self.write_snapshot(py, &err, out);
        if self.mode.delegates() {
            // restores the exception before the default printer clears it
            err.print_and_set_sys_last_vars(py);
        } else {
            err.restore(py);
        }
        outcome
    }

    fn write_snapshot(
        &self,
        py: Python<'_>,
        err: &PyErr,
        out: &mut impl ReportWriter,
    ) -> Result<ReportOutcome, ReportError> {
        let snapshot = ExceptionSnapshot::capture(py, err, &self.traceback);
        for line in snapshot.lines() {
            out.write_line(line)?;
        }
        out.flush()?;

        let outcome = snapshot.outcome();
        match &outcome {
            ReportOutcome::Partial { frames, reason } => {
                tracing::warn!(frames, %reason, "exception only partially reported");
            }
            _ => tracing::debug!(frames = outcome.frames(), "exception reported"),
        }
        Ok(outcome)
    }
}
