//! Foreign seam towards the native input wrapper libraries.
//!
//! Each device family is served by a small C wrapper library exposing five
//! entry points: `create`, `start_listening`, `stop_listening`, `destroy`
//! and a blocking `get_message`. The rest of the crate is written against
//! the [`InputDriver`] trait; the dlopen-backed implementations live in
//! [`remote_lib`] and [`media_keys_lib`], and tests substitute scripted
//! drivers behind the same trait.

pub mod media_keys_lib;
pub mod remote_lib;

use std::ffi::c_void;

use chrono::{DateTime, Local};

/// Address-sized identifier for a wrapper-managed native object.
///
/// The controller unit is the sole owner; the listener unit borrows the
/// handle by value for the duration of its read loop and never destroys it.
/// The address crosses task boundaries as a plain integer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RawHandle(usize);

impl RawHandle {
    pub fn from_ptr(ptr: *mut c_void) -> Self {
        Self(ptr as usize)
    }

    pub fn as_ptr(self) -> *mut c_void {
        self.0 as *mut c_void
    }

    pub fn address(self) -> usize {
        self.0
    }
}

/// Errors raised while opening or driving a native wrapper library.
#[derive(Debug, thiserror::Error)]
pub enum NativeError {
    /// The wrapper library could not be loaded or is missing an entry point.
    #[error("Failed to load wrapper library: {0}")]
    LibraryLoad(#[from] libloading::Error),

    /// The wrapper's `create` entry point returned a null handle.
    #[error("Wrapper create() returned a null handle")]
    NullHandle,
}

/// One fixed-layout record returned by the blocking read entry point.
pub trait DriverRecord: Send + Sized + 'static {
    /// Decoded shape forwarded from the listener to the controller. The
    /// shutdown sentinel is never forwarded, so the decoded shape carries no
    /// sentinel flag.
    type Decoded: Send + 'static;

    /// True for the sentinel pushed by `destroy`, telling the listener to
    /// exit its read loop.
    fn is_shutdown_sentinel(&self) -> bool;

    /// Convert the wire record into the controller-facing shape, stamping
    /// the arrival time.
    fn decode(self, received_at: DateTime<Local>) -> Self::Decoded;
}

/// The five foreign entry points of one wrapper library.
///
/// `next_record` blocks the calling thread until the native side has a
/// record; everything else returns promptly. The wrapper guarantees that a
/// blocked `next_record` returns (with the shutdown sentinel) once `destroy`
/// has been invoked, which is what makes the shutdown handshake deadlock
/// free.
pub trait InputDriver: Send + Sync + 'static {
    type Record: DriverRecord;

    fn create(&self) -> Result<RawHandle, NativeError>;
    fn start_listening(&self, handle: RawHandle);
    fn stop_listening(&self, handle: RawHandle);
    fn destroy(&self, handle: RawHandle);

    /// Blocking read of the next record for `handle`.
    fn next_record(&self, handle: RawHandle) -> Self::Record;
}
