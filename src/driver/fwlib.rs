//! Binding to the vendor `fwlib32` library (feature `fwlib`).
//!
//! The library must be installed on the host; the crate links against it by
//! name. All calls are blocking.

use std::ffi::CString;
use std::os::raw::{c_char, c_long, c_short, c_ushort};

use tracing::{debug, warn};

use super::{DriverResult, FocasDriver, Handle, StatusSnapshot};
use crate::endpoint::ConnectionTarget;
use crate::error_codes::EW_OK;

/// EW_SOCKET, used when the address cannot be handed to the library.
const EW_SOCKET: i16 = -16;

/// Vendor status record (`ODBST`). Only `aut` and `run` are read.
#[repr(C)]
#[derive(Default)]
#[allow(dead_code)]
struct Odbst {
    hdck: c_short,
    tmmode: c_short,
    aut: c_short,
    run: c_short,
    motion: c_short,
    mstb: c_short,
    emergency: c_short,
    alarm: c_short,
    edit: c_short,
}

// stdcall on 32-bit Windows, C elsewhere
#[link(name = "fwlib32")]
extern "system" {
    fn cnc_allclibhndl3(
        ip: *const c_char,
        port: c_ushort,
        timeout: c_long,
        handle: *mut c_ushort,
    ) -> c_short;
    fn cnc_statinfo(handle: c_ushort, statinfo: *mut Odbst) -> c_short;
    fn cnc_freelibhndl(handle: c_ushort) -> c_short;
    #[cfg(target_os = "linux")]
    fn cnc_startupprocess(level: c_long, filename: *const c_char) -> c_short;
    #[cfg(target_os = "linux")]
    fn cnc_exitprocess() -> c_short;
}

/// Driver backed by the vendor library.
pub struct FwlibDriver {
    _private: (),
}

impl FwlibDriver {
    /// Prepare the library. On Linux this starts the library process with
    /// logging sent to `focas.log` in the working directory.
    pub fn new() -> DriverResult<Self> {
        #[cfg(target_os = "linux")]
        {
            let log = CString::new("focas.log").map_err(|_| EW_SOCKET)?;
            // SAFETY: `log` is a valid NUL-terminated string that outlives the call.
            let ret = unsafe { cnc_startupprocess(0, log.as_ptr()) };
            debug!(ret, "cnc_startupprocess");
            if ret != EW_OK {
                return Err(ret);
            }
        }
        Ok(Self { _private: () })
    }
}

impl FocasDriver for FwlibDriver {
    fn connect(&mut self, target: &ConnectionTarget) -> DriverResult<Handle> {
        let ip = CString::new(target.address.as_str()).map_err(|_| {
            warn!(address = %target.address, "address contains NUL; not passed to fwlib");
            EW_SOCKET
        })?;
        let mut raw: c_ushort = 0;
        // SAFETY: `ip` is NUL-terminated and `raw` is a valid out-pointer for the call.
        let ret = unsafe {
            cnc_allclibhndl3(
                ip.as_ptr(),
                target.port,
                c_long::from(target.timeout),
                &mut raw,
            )
        };
        debug!(ret, handle = raw, addr = %target.addr(), "cnc_allclibhndl3");
        if ret != EW_OK {
            return Err(ret);
        }
        Ok(Handle::new(raw))
    }

    fn status_info(&mut self, handle: Handle) -> DriverResult<StatusSnapshot> {
        let mut st = Odbst::default();
        // SAFETY: `st` is a properly laid out ODBST the library fills in.
        let ret = unsafe { cnc_statinfo(handle.raw(), &mut st) };
        debug!(ret, %handle, aut = st.aut, run = st.run, "cnc_statinfo");
        if ret != EW_OK {
            return Err(ret);
        }
        Ok(StatusSnapshot::new(st.aut, st.run))
    }

    fn disconnect(&mut self, handle: Handle) -> DriverResult<()> {
        // SAFETY: plain value call.
        let ret = unsafe { cnc_freelibhndl(handle.raw()) };
        debug!(ret, %handle, "cnc_freelibhndl");
        if ret != EW_OK {
            return Err(ret);
        }
        Ok(())
    }
}

impl Drop for FwlibDriver {
    fn drop(&mut self) {
        #[cfg(target_os = "linux")]
        {
            // SAFETY: paired with cnc_startupprocess in `new`.
            let ret = unsafe { cnc_exitprocess() };
            debug!(ret, "cnc_exitprocess");
        }
    }
}
