//! Plain-text exception reports for programs embedding CPython.
//!
//! When code running in an embedded interpreter raises, [`ErrorFormatter`] writes
//! the exception type, its value and the formatted traceback lines to stdout (or
//! any [`ReportWriter`]), and can then hand the exception to the interpreter's
//! default printer. [`Harness`] is the small driver that imports a module in a
//! fresh interpreter and reports the import error.
//!
//! ```no_run
//! use pyo3::prelude::*;
//! use tracedump::{ErrorFormatter, ReportMode, StdReport};
//!
//! Python::initialize();
//! Python::attach(|py| {
//!     if let Err(err) = py.import("does_not_exist_xyz") {
//!         let formatter = ErrorFormatter::new(ReportMode::FormatOnly);
//!         formatter.report(py, &err, &mut StdReport).unwrap();
//!     }
//! });
//! ```

mod harness;
mod output;
mod report;
mod snapshot;
mod traceback;

pub use crate::{
    harness::{
        DEFAULT_ARGV0, DEFAULT_MODULE, DEFAULT_SENTINEL, Harness, HarnessConfig, HarnessError, HarnessOutcome,
        set_argv,
    },
    output::{CollectReport, ReportWriter, StdReport},
    report::{ErrorFormatter, ParseReportModeError, PartialReason, ReportError, ReportMode, ReportOutcome},
    snapshot::ExceptionSnapshot,
    traceback::{
        DEFAULT_FORMAT_FUNCTION, DEFAULT_TRACEBACK_MODULE, FrameLines, FramesStatus, TracebackFormatter,
        TracebackUnavailable,
    },
};
