//! In-process stand-in for the vendor driver.
//!
//! `SimulatedDriver` answers connect/status/disconnect from configured values
//! and counts every call, so callers can check which primitives were reached.
//! Query results can be scripted per call; once the script is exhausted the
//! configured default result is returned.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{DriverResult, FocasDriver, Handle, StatusSnapshot};
use crate::endpoint::ConnectionTarget;
use crate::error_codes::EW_OK;

/// EW_HANDLE, returned when a query or release names an unknown handle.
const EW_HANDLE: i16 = -8;

/// Values the simulator answers with. Deserializable from the `[simulator]`
/// config section.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct SimulatorConfig {
    pub connect_code: i16,
    pub handle: u16,
    pub query_code: i16,
    pub mode_code: i16,
    pub run_code: i16,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            connect_code: EW_OK,
            handle: 1,
            query_code: EW_OK,
            mode_code: 1,
            run_code: 0,
        }
    }
}

/// Per-primitive call counters.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CallLog {
    pub connects: usize,
    pub status_queries: usize,
    pub disconnects: usize,
    /// Handles passed to `disconnect`, in order.
    pub released: Vec<Handle>,
    /// Last target passed to `connect`.
    pub last_target: Option<ConnectionTarget>,
}

#[derive(Debug, Default)]
pub struct SimulatedDriver {
    config: SimulatorConfig,
    script: VecDeque<DriverResult<StatusSnapshot>>,
    open: Option<Handle>,
    calls: CallLog,
}

impl SimulatedDriver {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn from_config(config: SimulatorConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Connect succeeds with `handle`.
    #[must_use]
    pub fn with_handle(mut self, handle: u16) -> Self {
        self.config.connect_code = EW_OK;
        self.config.handle = handle;
        self
    }

    /// Connect fails with `code`.
    #[must_use]
    pub const fn with_connect_code(mut self, code: i16) -> Self {
        self.config.connect_code = code;
        self
    }

    /// Default status record returned by successful queries.
    #[must_use]
    pub const fn with_snapshot(mut self, snapshot: StatusSnapshot) -> Self {
        self.config.mode_code = snapshot.mode_code;
        self.config.run_code = snapshot.run_code;
        self
    }

    /// Default return code of every query (non-zero makes queries fail).
    #[must_use]
    pub const fn with_query_code(mut self, code: i16) -> Self {
        self.config.query_code = code;
        self
    }

    /// Queue one query result ahead of the default.
    #[must_use]
    pub fn then_query(mut self, result: DriverResult<StatusSnapshot>) -> Self {
        self.script.push_back(result);
        self
    }

    #[must_use]
    pub const fn calls(&self) -> &CallLog {
        &self.calls
    }

    #[must_use]
    pub const fn config(&self) -> &SimulatorConfig {
        &self.config
    }

    /// Handle currently held open, if any.
    #[must_use]
    pub const fn open_handle(&self) -> Option<Handle> {
        self.open
    }

    fn default_query(&self) -> DriverResult<StatusSnapshot> {
        if self.config.query_code == EW_OK {
            Ok(StatusSnapshot::new(self.config.mode_code, self.config.run_code))
        } else {
            Err(self.config.query_code)
        }
    }
}

impl FocasDriver for SimulatedDriver {
    fn connect(&mut self, target: &ConnectionTarget) -> DriverResult<Handle> {
        self.calls.connects += 1;
        self.calls.last_target = Some(target.clone());
        debug!(addr = %target.addr(), code = self.config.connect_code, "simulated connect");
        if self.config.connect_code != EW_OK {
            return Err(self.config.connect_code);
        }
        let handle = Handle::new(self.config.handle);
        self.open = handle.is_valid().then_some(handle);
        Ok(handle)
    }

    fn status_info(&mut self, handle: Handle) -> DriverResult<StatusSnapshot> {
        self.calls.status_queries += 1;
        if self.open != Some(handle) {
            return Err(EW_HANDLE);
        }
        let result = self
            .script
            .pop_front()
            .unwrap_or_else(|| self.default_query());
        debug!(%handle, ?result, "simulated status query");
        result
    }

    fn disconnect(&mut self, handle: Handle) -> DriverResult<()> {
        self.calls.disconnects += 1;
        self.calls.released.push(handle);
        if self.open != Some(handle) {
            return Err(EW_HANDLE);
        }
        self.open = None;
        Ok(())
    }
}
