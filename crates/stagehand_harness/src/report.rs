//! The record stream.
//!
//! Every line the outer harness scrapes goes through [`Reporter`]. Lines are
//! written and flushed as they are produced, so the stream never reorders
//! against engine activity. A run passed iff every record used its pass
//! label and the stream ends with `result=SUCCESS`.

use std::borrow::Cow;
use std::fmt;
use std::io::{self, Write};

use tracing::warn;

use crate::error::FatalScenario;

/// Terminal line of a passing scenario.
pub const RESULT_SUCCESS: &str = "result=SUCCESS";
/// Terminal line of a failing scenario.
pub const RESULT_FAILURE: &str = "result=FAILURE";

/// The two lines an assertion can produce.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LabelPair {
    /// Emitted when the assertion holds.
    pub pass: Cow<'static, str>,
    /// Emitted when it does not.
    pub fail: Cow<'static, str>,
}

impl LabelPair {
    /// Creates a pair from static labels.
    #[must_use]
    pub const fn fixed(pass: &'static str, fail: &'static str) -> Self {
        Self {
            pass: Cow::Borrowed(pass),
            fail: Cow::Borrowed(fail),
        }
    }

    /// Creates a pair from any strings.
    #[must_use]
    pub fn new(pass: impl Into<Cow<'static, str>>, fail: impl Into<Cow<'static, str>>) -> Self {
        Self {
            pass: pass.into(),
            fail: fail.into(),
        }
    }

    /// The label for an outcome.
    #[must_use]
    pub fn label(&self, outcome: bool) -> &str {
        if outcome { &*self.pass } else { &*self.fail }
    }
}

/// Append-only writer of records.
pub struct Reporter {
    sink: Box<dyn Write>,
    lines: Vec<String>,
    failed: bool,
}

impl fmt::Debug for Reporter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reporter")
            .field("lines", &self.lines.len())
            .field("failed", &self.failed)
            .finish_non_exhaustive()
    }
}

impl Reporter {
    /// Creates a reporter writing to `sink`.
    #[must_use]
    pub fn new(sink: Box<dyn Write>) -> Self {
        Self {
            sink,
            lines: Vec::new(),
            failed: false,
        }
    }

    /// Creates a reporter writing to stdout.
    #[must_use]
    pub fn stdout() -> Self {
        Self::new(Box::new(io::stdout()))
    }

    /// Creates a reporter that only keeps lines in memory.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(Box::new(io::sink()))
    }

    fn emit(&mut self, line: String) {
        let written = writeln!(self.sink, "{line}").and_then(|()| self.sink.flush());
        if let Err(err) = written {
            warn!(error = %err, "record_write_failed");
        }
        self.lines.push(line);
    }

    /// Advisory line; never affects the outcome.
    pub fn info(&mut self, message: impl fmt::Display) {
        self.emit(format!("Info: {message}"));
    }

    /// Emits the pass or fail label. Returns `outcome`.
    pub fn record(&mut self, labels: &LabelPair, outcome: bool) -> bool {
        if !outcome {
            self.failed = true;
        }
        self.emit(labels.label(outcome).to_string());
        outcome
    }

    /// As [`Reporter::record`], but a false outcome aborts the scenario.
    ///
    /// # Errors
    ///
    /// Returns [`FatalScenario`] when `outcome` is false.
    pub fn critical(&mut self, labels: &LabelPair, outcome: bool) -> Result<(), FatalScenario> {
        if self.record(labels, outcome) {
            Ok(())
        } else {
            Err(FatalScenario {
                label: labels.fail.to_string(),
            })
        }
    }

    /// Emits a fail record for an error that escaped the scenario.
    pub fn failure(&mut self, message: impl fmt::Display) {
        self.failed = true;
        self.emit(message.to_string());
    }

    /// Opens a scenario bracket and clears the failure flag.
    pub fn start_scenario(&mut self, name: &str) {
        self.failed = false;
        self.emit(format!("Starting scenario: {name}"));
    }

    /// Closes a scenario bracket with the overall result line. The result is
    /// a failure if `outcome` is false or any record failed.
    pub fn end_scenario(&mut self, name: &str, outcome: bool) -> bool {
        let passed = outcome && !self.failed;
        self.emit(format!("Finished scenario: {name}"));
        self.emit(if passed { RESULT_SUCCESS } else { RESULT_FAILURE }.to_string());
        passed
    }

    /// True while no record in the current scenario failed.
    #[must_use]
    pub fn passed(&self) -> bool {
        !self.failed
    }

    /// Every line emitted so far.
    #[must_use]
    pub fn lines(&self) -> &[String] {
        &self.lines
    }
}
