//! One controller session: a handle obtained from the driver plus the
//! queries made through it.
//!
//! A `Session` owns its handle for its whole lifetime and releases it when
//! closed or dropped, whichever path the caller takes out of the report.
//! Queries on a session without a handle fail locally with
//! [`FocasError::NoHandle`] and never reach the driver.

use std::mem;

use tracing::{debug, info, warn};

use crate::codes::{mode_label, StatusDisplay, StatusLabel};
use crate::driver::{FocasDriver, Handle, StatusSnapshot};
use crate::endpoint::ConnectionTarget;
use crate::error::FocasError;

pub struct Session<D: FocasDriver> {
    driver: D,
    target: ConnectionTarget,
    handle: Handle,
}

impl<D: FocasDriver> Session<D> {
    /// Open a handle to `target` through `driver`.
    ///
    /// # Errors
    ///
    /// `FocasError::Config` for an invalid target, `FocasError::ConnectFailed`
    /// with the driver's raw code when the driver refuses the connection.
    pub fn connect(mut driver: D, target: &ConnectionTarget) -> Result<Self, FocasError> {
        target.validate()?;
        match driver.connect(target) {
            Ok(handle) => {
                info!(%handle, addr = %target.addr(), "connected");
                Ok(Self {
                    driver,
                    target: target.clone(),
                    handle,
                })
            }
            Err(code) => {
                warn!(code, addr = %target.addr(), "connect failed");
                Err(FocasError::ConnectFailed(code))
            }
        }
    }

    /// A session that never obtained a handle. Every query on it fails with
    /// `NoHandle`.
    #[must_use]
    pub fn unconnected(driver: D, target: &ConnectionTarget) -> Self {
        Self {
            driver,
            target: target.clone(),
            handle: Handle::NONE,
        }
    }

    #[must_use]
    pub const fn handle(&self) -> Handle {
        self.handle
    }

    #[must_use]
    pub const fn target(&self) -> &ConnectionTarget {
        &self.target
    }

    #[must_use]
    pub const fn driver(&self) -> &D {
        &self.driver
    }

    /// Read one status record.
    pub fn status_info(&mut self) -> Result<StatusSnapshot, FocasError> {
        if !self.handle.is_valid() {
            debug!("status query rejected: no handle");
            return Err(FocasError::NoHandle);
        }
        self.driver.status_info(self.handle).map_err(|code| {
            warn!(code, handle = %self.handle, "status query failed");
            FocasError::QueryFailed(code)
        })
    }

    /// Query the controller and decode its operating mode.
    pub fn get_mode(&mut self) -> Result<&'static str, FocasError> {
        let snapshot = self.status_info()?;
        Ok(mode_label(snapshot.mode_code))
    }

    /// Query the controller and render its run state as `display` asks.
    pub fn get_status(&mut self, display: StatusDisplay) -> Result<StatusLabel, FocasError> {
        let snapshot = self.status_info()?;
        Ok(StatusLabel::new(snapshot.run_code, display))
    }

    /// Release the handle now and report the driver's answer.
    ///
    /// # Errors
    ///
    /// `FocasError::ReleaseFailed` when the driver returns a non-zero code.
    pub fn close(mut self) -> Result<(), FocasError> {
        self.release().map_err(FocasError::ReleaseFailed)
    }

    fn release(&mut self) -> Result<(), i16> {
        let handle = mem::replace(&mut self.handle, Handle::NONE);
        if !handle.is_valid() {
            return Ok(());
        }
        self.driver.disconnect(handle)?;
        info!(%handle, "handle released");
        Ok(())
    }
}

impl<D: FocasDriver> Drop for Session<D> {
    fn drop(&mut self) {
        let handle = self.handle;
        if let Err(code) = self.release() {
            warn!(code, %handle, "handle release failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codes::UNAVAILABLE;
    use crate::driver::sim::SimulatedDriver;

    fn target() -> ConnectionTarget {
        ConnectionTarget::direct("127.0.0.1", 8193)
    }

    #[test]
    fn mode_is_decoded() {
        let mut sim = SimulatedDriver::new()
            .with_handle(5)
            .with_snapshot(StatusSnapshot::new(1, 0));
        let mut session = Session::connect(&mut sim, &target()).expect("connect");
        assert_eq!(session.handle(), Handle::new(5));
        assert_eq!(session.get_mode().expect("mode"), "MEM");
    }

    #[test]
    fn mode_is_pure_in_the_code() {
        let mut sim = SimulatedDriver::new()
            .with_handle(5)
            .with_snapshot(StatusSnapshot::new(9, 0));
        let mut session = Session::connect(&mut sim, &target()).expect("connect");
        let first = session.get_mode().expect("first");
        let second = session.get_mode().expect("second");
        assert_eq!(first, "REF");
        assert_eq!(first, second);
    }

    #[test]
    fn gap_code_is_unavailable() {
        let mut sim = SimulatedDriver::new()
            .with_handle(5)
            .with_snapshot(StatusSnapshot::new(2, 0));
        let mut session = Session::connect(&mut sim, &target()).expect("connect");
        assert_eq!(session.get_mode().expect("mode"), UNAVAILABLE);
    }

    #[test]
    fn status_raw_and_decoded() {
        let mut sim = SimulatedDriver::new()
            .with_handle(5)
            .with_snapshot(StatusSnapshot::new(1, 3));
        let mut session = Session::connect(&mut sim, &target()).expect("connect");
        assert_eq!(
            session.get_status(StatusDisplay::Raw).expect("raw"),
            StatusLabel::Raw(3)
        );
        assert_eq!(
            session.get_status(StatusDisplay::Decoded).expect("decoded"),
            StatusLabel::Decoded("STRT")
        );
    }

    #[test]
    fn no_handle_never_reaches_driver() {
        let mut sim = SimulatedDriver::new();
        {
            let mut session = Session::unconnected(&mut sim, &target());
            assert!(matches!(session.get_mode(), Err(FocasError::NoHandle)));
            assert!(matches!(
                session.get_status(StatusDisplay::Raw),
                Err(FocasError::NoHandle)
            ));
        }
        assert_eq!(sim.calls().connects, 0);
        assert_eq!(sim.calls().status_queries, 0);
        assert_eq!(sim.calls().disconnects, 0);
    }

    #[test]
    fn query_failure_carries_code() {
        let mut sim = SimulatedDriver::new().with_handle(5).with_query_code(-16);
        let mut session = Session::connect(&mut sim, &target()).expect("connect");
        match session.get_mode() {
            Err(FocasError::QueryFailed(code)) => assert_eq!(code, -16),
            other => panic!("expected QueryFailed, got {other:?}"),
        }
        match session.get_status(StatusDisplay::Raw) {
            Err(e) => assert_eq!(e.return_code(), Some(-16)),
            Ok(v) => panic!("expected failure, got {v}"),
        }
    }

    #[test]
    fn connect_failure_carries_code() {
        let mut sim = SimulatedDriver::new().with_connect_code(-8);
        match Session::connect(&mut sim, &target()) {
            Err(FocasError::ConnectFailed(code)) => assert_eq!(code, -8),
            Err(e) => panic!("unexpected error {e}"),
            Ok(_) => panic!("connect should fail"),
        }
        assert_eq!(sim.calls().status_queries, 0);
        assert_eq!(sim.calls().disconnects, 0);
    }

    #[test]
    fn invalid_target_is_rejected_locally() {
        let mut sim = SimulatedDriver::new();
        let res = Session::connect(&mut sim, &ConnectionTarget::direct("", 8193));
        assert!(matches!(res, Err(FocasError::Config(_))));
        drop(res);
        assert_eq!(sim.calls().connects, 0);
    }

    #[test]
    fn drop_releases_handle_once() {
        let mut sim = SimulatedDriver::new().with_handle(7).with_query_code(-8);
        {
            let mut session = Session::connect(&mut sim, &target()).expect("connect");
            let _ = session.get_mode();
        }
        assert_eq!(sim.calls().released, vec![Handle::new(7)]);
        assert_eq!(sim.open_handle(), None);
    }

    #[test]
    fn close_releases_and_drop_does_not_repeat() {
        let mut sim = SimulatedDriver::new().with_handle(7);
        let session = Session::connect(&mut sim, &target()).expect("connect");
        session.close().expect("close");
        assert_eq!(sim.calls().disconnects, 1);
    }
}
