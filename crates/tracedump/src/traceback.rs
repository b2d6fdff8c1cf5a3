//! Traceback rendering through the interpreter's own formatting facility.
//!
//! Frame text is produced by calling a function (by default
//! `traceback.format_tb`) inside the embedded interpreter, so the lines look
//! exactly like the ones the interpreter would print itself. When that
//! facility can't be reached, the caller still gets the reason so it can
//! report "could not fully report" rather than "nothing to report".

use pyo3::{prelude::*, types::PyTraceback};

/// Default module providing the frame formatting function.
pub const DEFAULT_TRACEBACK_MODULE: &str = "traceback";
/// Default frame formatting function, looked up on [`DEFAULT_TRACEBACK_MODULE`].
pub const DEFAULT_FORMAT_FUNCTION: &str = "format_tb";

/// Why the traceback formatting facility could not be used.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TracebackUnavailable {
    #[error("could not import traceback module '{module}': {message}")]
    Import { module: String, message: String },
    #[error("module '{module}' has no attribute '{function}'")]
    MissingFunction { module: String, function: String },
    #[error("'{module}.{function}' is not callable")]
    NotCallable { module: String, function: String },
    #[error("traceback formatting raised: {message}")]
    CallFailed { message: String },
    #[error("traceback formatting returned a non-iterable: {message}")]
    NotIterable { message: String },
}

/// How far rendering of the frame lines got.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FramesStatus {
    /// Every entry was converted.
    Complete,
    /// The exception carried no traceback object.
    NoTraceback,
    /// The formatting facility could not be used, no lines were produced.
    Unavailable(TracebackUnavailable),
    /// Entry `index` was not text; only the entries before it were kept.
    Truncated { index: usize },
}

/// Rendered traceback lines, one entry per frame, in the interpreter's order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameLines {
    pub lines: Vec<String>,
    pub status: FramesStatus,
}

impl FrameLines {
    fn empty(status: FramesStatus) -> Self {
        Self {
            lines: Vec::new(),
            status,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Locates and calls the interpreter-side frame formatting function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TracebackFormatter {
    module: String,
    function: String,
}

impl Default for TracebackFormatter {
    fn default() -> Self {
        Self::new(DEFAULT_TRACEBACK_MODULE, DEFAULT_FORMAT_FUNCTION)
    }
}

impl TracebackFormatter {
    /// Creates a formatter calling `module.function(tb)`.
    ///
    /// The function must accept a traceback object and return an iterable of
    /// strings, one per frame, like `traceback.format_tb`.
    #[must_use]
    pub fn new(module: impl Into<String>, function: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            function: function.into(),
        }
    }

    #[must_use]
    pub fn module(&self) -> &str {
        &self.module
    }

    #[must_use]
    pub fn function(&self) -> &str {
        &self.function
    }

    /// Renders `traceback` to frame lines.
    ///
    /// Never fails: Python errors raised while formatting are consumed and
    /// reported through [`FrameLines::status`], the interpreter's error
    /// indicator is left as it was.
    pub fn format(&self, py: Python<'_>, traceback: Option<&Bound<'_, PyTraceback>>) -> FrameLines {
        let Some(traceback) = traceback else {
            return FrameLines::empty(FramesStatus::NoTraceback);
        };
        let entries = match self.call(py, traceback) {
            Ok(entries) => entries,
            Err(reason) => {
                tracing::warn!(
                    module = %self.module,
                    function = %self.function,
                    %reason,
                    "traceback formatting unavailable, omitting frame lines"
                );
                return FrameLines::empty(FramesStatus::Unavailable(reason));
            }
        };

        let mut lines = Vec::new();
        for (index, entry) in entries.enumerate() {
            match entry.and_then(|item| item.extract::<String>().map_err(PyErr::from)) {
                Ok(text) => lines.push(trim_entry(text)),
                Err(err) => {
                    tracing::warn!(index, error = %err, "traceback entry is not text, stopping frame output");
                    return FrameLines {
                        lines,
                        status: FramesStatus::Truncated { index },
                    };
                }
            }
        }
        FrameLines {
            lines,
            status: FramesStatus::Complete,
        }
    }

    /// Resolves the formatting function, calls it and returns an iterator over its result.
    fn call<'py>(
        &self,
        py: Python<'py>,
        traceback: &Bound<'py, PyTraceback>,
    ) -> Result<impl Iterator<Item = PyResult<Bound<'py, PyAny>>>, TracebackUnavailable> {
        let module = py
            .import(self.module.as_str())
            .map_err(|err| TracebackUnavailable::Import {
                module: self.module.clone(),
                message: err.to_string(),
            })?;
        let function = module
            .getattr(self.function.as_str())
            .map_err(|_| TracebackUnavailable::MissingFunction {
                module: self.module.clone(),
                function: self.function.clone(),
            })?;
        if !function.is_callable() {
            return Err(TracebackUnavailable::NotCallable {
                module: self.module.clone(),
                function: self.function.clone(),
            });
        }
        // the argument tuple holds exactly one element: the traceback object
        let result = function
            .call1((traceback,))
            .map_err(|err| TracebackUnavailable::CallFailed {
                message: err.to_string(),
            })?;
        result.try_iter().map_err(|err| TracebackUnavailable::NotIterable {
            message: err.to_string(),
        })
    }
}

/// Drops the single trailing newline `format_tb` puts on every entry.
fn trim_entry(mut text: String) -> String {
    if text.ends_with('\n') {
        text.pop();
    }
    text
}
