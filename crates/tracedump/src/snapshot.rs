use std::fmt;

use pyo3::prelude::*;

use crate::{
    report::{PartialReason, ReportOutcome},
    traceback::{FrameLines, FramesStatus, TracebackFormatter},
};

/// Text rendering of one exception: its type, its value and its traceback frames.
///
/// A snapshot exists for the duration of a single report. Capturing one reads the
/// exception but never consumes or replaces it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExceptionSnapshot {
    /// `str()` of the exception class, `None` if that raised.
    pub type_text: Option<String>,
    /// `str()` of the normalized exception value, `None` if that raised.
    pub value_text: Option<String>,
    pub frames: FrameLines,
}

impl ExceptionSnapshot {
    /// Captures `err`, normalizing it first so type, value and traceback agree.
    pub fn capture(py: Python<'_>, err: &PyErr, traceback: &TracebackFormatter) -> Self {
        let value = err.value(py);
        let type_text = text_of(err.get_type(py).as_any());
        if type_text.is_none() {
            tracing::warn!("exception type has no text form");
        }
        let value_text = text_of(value.as_any());
        if value_text.is_none() {
            tracing::warn!("exception value has no text form");
        }
        let frames = traceback.format(py, err.traceback(py).as_ref());
        Self {
            type_text,
            value_text,
            frames,
        }
    }

    /// Report lines in output order: type, value, then one per frame.
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.type_text
            .as_deref()
            .into_iter()
            .chain(self.value_text.as_deref())
            .chain(self.frames.lines.iter().map(String::as_str))
    }

    /// Summarizes how completely this snapshot describes the exception.
    ///
    /// Frame problems take precedence over type/value problems.
    #[must_use]
    pub fn outcome(&self) -> ReportOutcome {
        let frames = self.frames.len();
        let reason = match &self.frames.status {
            FramesStatus::Unavailable(reason) => Some(PartialReason::TracebackUnavailable(reason.clone())),
            FramesStatus::Truncated { index } => Some(PartialReason::FrameNotText { index: *index }),
            FramesStatus::Complete | FramesStatus::NoTraceback => {
                if self.type_text.is_none() {
                    Some(PartialReason::TypeNotText)
                } else if self.value_text.is_none() {
                    Some(PartialReason::ValueNotText)
                } else {
                    None
                }
            }
        };
        match reason {
            Some(reason) => ReportOutcome::Partial { frames, reason },
            None => ReportOutcome::Reported { frames },
        }
    }
}

impl fmt::Display for ExceptionSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, line) in self.lines().enumerate() {
            if i > 0 {
                f.write_str("\n")?;
            }
            f.write_str(line)?;
        }
        Ok(())
    }
}

fn text_of(obj: &Bound<'_, PyAny>) -> Option<String> {
    obj.str()
        .and_then(|s| s.to_str().map(str::to_owned))
        .ok()
}
