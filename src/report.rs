//! Connect, query, print.
//!
//! The report flow is linear: open a session, print the handle, query the
//! mode, query the run state. Each query failure is printed where it happens
//! and leaves an empty field; the other query still runs. A connect failure
//! prints the raw code and ends the flow without any query.

use std::io::{BufRead, Write};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::codes::StatusDisplay;
use crate::config::ReportOptions;
use crate::driver::FocasDriver;
use crate::endpoint::ConnectionTarget;
use crate::error::FocasError;
use crate::error_codes::{code_category, describe_code};
use crate::session::Session;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    /// Console lines
    #[default]
    Text,
    /// One JSON document
    Json,
}

impl std::str::FromStr for ReportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown report format '{other}' (expected text|json)")),
        }
    }
}

/// Outcome of one report run.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Report {
    pub address: String,
    pub port: u16,
    pub handle: u16,
    /// Decoded mode, `None` when the query failed.
    pub mode: Option<String>,
    /// Run state rendered per `status_display`, `None` when the query failed.
    pub status: Option<String>,
    pub status_display: StatusDisplay,
    /// Messages printed for failed steps.
    pub errors: Vec<String>,
}

/// Operator-facing message for a failed query of `what` ("mode" / "status").
#[must_use]
pub fn query_failure_message(what: &str, err: &FocasError) -> String {
    match err {
        FocasError::NoHandle => {
            "Error: Please obtain a handle before calling this method".to_string()
        }
        FocasError::QueryFailed(code) => {
            format!(
                "Error: Unable to obtain {what}.\nReturn Code: {}",
                describe_code(*code)
            )
        }
        other => format!("Error: Unable to obtain {what}: {other}"),
    }
}

#[must_use]
pub fn connect_failure_message(target: &ConnectionTarget, code: i16) -> String {
    format!(
        "Unable to connect to {} on port {}\n\nReturn Code: {}\n\nExiting...",
        target.address,
        target.port,
        describe_code(code)
    )
}

/// Writes the report for one session to `out`.
pub struct Reporter<W: Write> {
    out: W,
    options: ReportOptions,
}

impl<W: Write> Reporter<W> {
    pub const fn new(out: W, options: ReportOptions) -> Self {
        Self { out, options }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn text(&self) -> bool {
        self.options.format == ReportFormat::Text
    }

    fn line(&mut self, s: &str) -> Result<(), FocasError> {
        if self.text() {
            writeln!(self.out, "{s}")?;
        }
        Ok(())
    }

    /// Query mode and status through `session` and print them.
    pub fn report_session<D: FocasDriver>(
        &mut self,
        session: &mut Session<D>,
    ) -> Result<Report, FocasError> {
        let target = session.target().clone();
        let mut report = Report {
            address: target.address,
            port: target.port,
            handle: session.handle().raw(),
            status_display: self.options.status_display,
            ..Report::default()
        };
        self.line(&format!("Our Focas handle is {}", session.handle()))?;

        match session.get_mode() {
            Ok(mode) => {
                self.line(&format!("\n\nMode is: {mode}"))?;
                report.mode = Some(mode.to_string());
            }
            Err(e) => {
                let msg = query_failure_message("mode", &e);
                self.line(&msg)?;
                report.errors.push(msg);
            }
        }

        match session.get_status(self.options.status_display) {
            Ok(status) => {
                self.line(&format!("\n\nStatus is: {status}"))?;
                report.status = Some(status.to_string());
            }
            Err(e) => {
                let msg = query_failure_message("status", &e);
                self.line(&msg)?;
                report.errors.push(msg);
            }
        }

        if !self.text() {
            serde_json::to_writer_pretty(&mut self.out, &report)
                .map_err(|e| FocasError::Io(e.into()))?;
            writeln!(self.out)?;
        }
        self.out.flush()?;
        Ok(report)
    }

    /// Print a connect failure.
    pub fn report_connect_failure(
        &mut self,
        target: &ConnectionTarget,
        code: i16,
    ) -> Result<(), FocasError> {
        let msg = connect_failure_message(target, code);
        if self.text() {
            writeln!(self.out, "{msg}")?;
        } else {
            let doc = serde_json::json!({
                "address": target.address,
                "port": target.port,
                "return_code": code,
                "category": code_category(code),
                "errors": [msg],
            });
            serde_json::to_writer_pretty(&mut self.out, &doc)
                .map_err(|e| FocasError::Io(e.into()))?;
            writeln!(self.out)?;
        }
        self.out.flush()?;
        Ok(())
    }
}

/// Connect through `driver`, print the report to `out`, release the handle.
///
/// # Errors
///
/// `ConnectFailed(code)` after the failure has been printed, even when `out`
/// fails; `Config` for an invalid target; `Io` when printing the report fails.
pub fn run<D: FocasDriver, W: Write>(
    driver: D,
    target: &ConnectionTarget,
    options: &ReportOptions,
    out: W,
) -> Result<Report, FocasError> {
    let mut reporter = Reporter::new(out, options.clone());
    let mut session = match Session::connect(driver, target) {
        Ok(s) => s,
        Err(FocasError::ConnectFailed(code)) => {
            if let Err(e) = reporter.report_connect_failure(target, code) {
                tracing::warn!(error = %e, code, "printing connect failure failed");
            }
            return Err(FocasError::ConnectFailed(code));
        }
        Err(e) => return Err(e),
    };
    let report = reporter.report_session(&mut session)?;
    if let Err(e) = session.close() {
        // the report is already out; a failed release is only logged
        tracing::warn!(error = %e, "release after report failed");
    }
    Ok(report)
}

/// Block until the operator presses Enter (or input closes).
pub fn wait_for_ack<R: BufRead>(mut input: R) -> Result<(), FocasError> {
    let mut line = String::new();
    let n = input.read_line(&mut line)?;
    debug!(bytes = n, "acknowledged");
    Ok(())
}
