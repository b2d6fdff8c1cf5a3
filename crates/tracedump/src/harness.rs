//! Embedded-interpreter harness around the error formatter.
//!
//! Starts the interpreter, sets `sys.argv`, imports one module and reports the
//! import error if there is one. A successful import writes nothing.

use pyo3::{
    prelude::*,
    types::{PyDict, PyList},
};

use crate::{
    output::ReportWriter,
    report::{ErrorFormatter, ReportError, ReportMode, ReportOutcome},
};

/// Module the harness imports unless configured otherwise.
pub const DEFAULT_MODULE: &str = "IPython";
/// Line written before the report when the import fails.
pub const DEFAULT_SENTINEL: &str = "NULL";
/// Default `sys.argv[0]`.
pub const DEFAULT_ARGV0: &str = "python";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarnessConfig {
    /// Dotted name of the module to import.
    pub module: String,
    /// Value given to `sys.argv` before importing.
    pub argv: Vec<String>,
    pub sentinel: String,
    pub mode: ReportMode,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            module: DEFAULT_MODULE.to_owned(),
            argv: vec![DEFAULT_ARGV0.to_owned()],
            sentinel: DEFAULT_SENTINEL.to_owned(),
            mode: ReportMode::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HarnessOutcome {
    /// The module imported, nothing was written.
    Imported,
    /// The import raised; the sentinel and the report were written.
    ImportFailed(ReportOutcome),
}

#[derive(Debug, thiserror::Error)]
pub enum HarnessError {
    #[error("module name must not be empty")]
    InvalidModuleName,
    #[error("failed to prepare the interpreter: {0}")]
    Setup(#[source] PyErr),
    #[error(transparent)]
    Report(#[from] ReportError),
}

/// Drives one import attempt in the process's embedded interpreter.
#[derive(Debug, Clone)]
pub struct Harness {
    config: HarnessConfig,
    formatter: ErrorFormatter,
}

impl Harness {
    #[must_use]
    pub fn new(config: HarnessConfig) -> Self {
        let formatter = ErrorFormatter::new(config.mode);
        Self { config, formatter }
    }

    /// Replaces the formatter built from the config's report mode.
    #[must_use]
    pub fn with_formatter(mut self, formatter: ErrorFormatter) -> Self {
        self.formatter = formatter;
        self
    }

    #[must_use]
    pub fn config(&self) -> &HarnessConfig {
        &self.config
    }

    /// Runs the import attempt, writing the sentinel and report to `out` on failure.
    ///
    /// The interpreter is initialized on first use without installing its
    /// signal handlers, and stays alive for the rest of the process.
    pub fn run(&self, out: &mut impl ReportWriter) -> Result<HarnessOutcome, HarnessError> {
        if self.config.module.trim().is_empty() {
            return Err(HarnessError::InvalidModuleName);
        }
        Python::initialize();
        Python::attach(|py| {
            set_argv(py, &self.config.argv).map_err(HarnessError::Setup)?;
            let globals = import_globals(py, &self.config.module).map_err(HarnessError::Setup)?;
            match py.run(c"__import__(module_name)", Some(&globals), None) {
                Ok(()) => {
                    tracing::debug!(module = %self.config.module, "module imported");
                    Ok(HarnessOutcome::Imported)
                }
                Err(err) => {
                    tracing::debug!(module = %self.config.module, "import failed, reporting");
                    out.write_line(&self.config.sentinel).map_err(ReportError::from)?;
                    let outcome = self.formatter.report(py, &err, out)?;
                    Ok(HarnessOutcome::ImportFailed(outcome))
                }
            }
        })
    }
}

/// Replaces `sys.argv` with `argv`.
pub fn set_argv(py: Python<'_>, argv: &[String]) -> PyResult<()> {
    let sys = py.import("sys")?;
    sys.setattr("argv", PyList::new(py, argv)?)
}

/// Globals for the import statement; the interpreter adds `__builtins__` itself.
fn import_globals<'py>(py: Python<'py>, module: &str) -> PyResult<Bound<'py, PyDict>> {
    let globals = PyDict::new(py);
    globals.set_item("module_name", module)?;
    Ok(globals)
}
