//! Driver boundary.
//!
//! The FOCAS wire protocol lives inside the vendor library. This crate only
//! needs three of its primitives: open a handle, read the status record, and
//! release the handle. Each returns the driver's raw signed return code on
//! failure.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::endpoint::ConnectionTarget;

#[cfg(feature = "fwlib")]
pub mod fwlib;
pub mod sim;

/// Driver-level result: `Err` carries the raw non-zero return code.
pub type DriverResult<T> = Result<T, i16>;

/// Opaque library handle issued by a successful connect. `0` means "none".
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Handle(u16);

impl Handle {
    pub const NONE: Self = Self(0);

    #[must_use]
    pub const fn new(raw: u16) -> Self {
        Self(raw)
    }
    #[must_use]
    pub const fn raw(self) -> u16 {
        self.0
    }
    #[must_use]
    pub const fn is_valid(self) -> bool {
        self.0 != 0
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The two fields of the controller status record this crate reads.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct StatusSnapshot {
    /// Operating mode (`aut` in the vendor record)
    pub mode_code: i16,
    /// Run state (`run` in the vendor record)
    pub run_code: i16,
}

impl StatusSnapshot {
    #[must_use]
    pub const fn new(mode_code: i16, run_code: i16) -> Self {
        Self {
            mode_code,
            run_code,
        }
    }
}

/// The vendor primitives this crate depends on.
pub trait FocasDriver {
    /// Open a library handle to `target`.
    fn connect(&mut self, target: &ConnectionTarget) -> DriverResult<Handle>;

    /// Read the status record through `handle`.
    fn status_info(&mut self, handle: Handle) -> DriverResult<StatusSnapshot>;

    /// Release `handle`.
    fn disconnect(&mut self, handle: Handle) -> DriverResult<()>;
}

impl<D: FocasDriver + ?Sized> FocasDriver for &mut D {
    fn connect(&mut self, target: &ConnectionTarget) -> DriverResult<Handle> {
        (**self).connect(target)
    }
    fn status_info(&mut self, handle: Handle) -> DriverResult<StatusSnapshot> {
        (**self).status_info(handle)
    }
    fn disconnect(&mut self, handle: Handle) -> DriverResult<()> {
        (**self).disconnect(handle)
    }
}

impl<D: FocasDriver + ?Sized> FocasDriver for Box<D> {
    fn connect(&mut self, target: &ConnectionTarget) -> DriverResult<Handle> {
        (**self).connect(target)
    }
    fn status_info(&mut self, handle: Handle) -> DriverResult<StatusSnapshot> {
        (**self).status_info(handle)
    }
    fn disconnect(&mut self, handle: Handle) -> DriverResult<()> {
        (**self).disconnect(handle)
    }
}
