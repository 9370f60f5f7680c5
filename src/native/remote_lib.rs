//! dlopen-backed driver for the remote control wrapper library.

use std::ffi::c_void;
use std::os::raw::c_uint;
use std::path::Path;

use libloading::Library;
use tracing::{debug, info};

use super::{InputDriver, NativeError, RawHandle};
use crate::remote::RemoteMessage;

type CreateFn = unsafe extern "C" fn() -> *mut c_void;
type HandleFn = unsafe extern "C" fn(*mut c_void);
type GetMessageFn = unsafe extern "C" fn(*mut c_void) -> ArtcwMessage;

/// Wire layout of one record returned by `artcw_get_message`.
#[repr(C)]
#[derive(Clone, Copy)]
struct ArtcwMessage {
    button: c_uint,
    pressed_down: u8,
    is_destroy_notification: u8,
}

/// Remote control wrapper library with all entry points resolved at open
/// time. The `Library` field keeps the dlopen handle alive for as long as
/// the cached function pointers are callable.
pub struct RemoteLibrary {
    create: CreateFn,
    start_listening: HandleFn,
    stop_listening: HandleFn,
    destroy: HandleFn,
    get_message: GetMessageFn,
    _lib: Library,
}

impl RemoteLibrary {
    /// Open the wrapper library at `path` and resolve the `artcw_*` entry
    /// points.
    pub fn open(path: &Path) -> Result<Self, NativeError> {
        info!(
            "Opening remote control wrapper library: {}",
            path.display()
        );

        // SAFETY: the wrapper is a plain C library without load-time side
        // effects; the symbol signatures match its header.
        unsafe {
            let lib = Library::new(path)?;
            let create = *lib.get::<CreateFn>(b"artcw_create\0")?;
            let start_listening = *lib.get::<HandleFn>(b"artcw_start_listening\0")?;
            let stop_listening = *lib.get::<HandleFn>(b"artcw_stop_listening\0")?;
            let destroy = *lib.get::<HandleFn>(b"artcw_destroy\0")?;
            let get_message = *lib.get::<GetMessageFn>(b"artcw_get_message\0")?;
            debug!("Resolved all artcw_* entry points");

            Ok(Self {
                create,
                start_listening,
                stop_listening,
                destroy,
                get_message,
                _lib: lib,
            })
        }
    }
}

impl InputDriver for RemoteLibrary {
    type Record = RemoteMessage;

    fn create(&self) -> Result<RawHandle, NativeError> {
        // SAFETY: artcw_create takes no arguments and returns a heap handle or
        // null.
        let ptr = unsafe { (self.create)() };
        if ptr.is_null() {
            return Err(NativeError::NullHandle);
        }
        debug!("Created remote control handle at {:#x}", ptr as usize);
        Ok(RawHandle::from_ptr(ptr))
    }

    fn start_listening(&self, handle: RawHandle) {
        // SAFETY: handle came from artcw_create and has not been destroyed.
        unsafe { (self.start_listening)(handle.as_ptr()) }
    }

    fn stop_listening(&self, handle: RawHandle) {
        // SAFETY: as above.
        unsafe { (self.stop_listening)(handle.as_ptr()) }
    }

    fn destroy(&self, handle: RawHandle) {
        debug!("Destroying remote control handle {:#x}", handle.address());
        // SAFETY: called exactly once per handle, by the controller unit.
        unsafe { (self.destroy)(handle.as_ptr()) }
    }

    fn next_record(&self, handle: RawHandle) -> RemoteMessage {
        // SAFETY: blocks until the wrapper has a record; destroy forces the
        // sentinel, so this always eventually returns.
        let raw = unsafe { (self.get_message)(handle.as_ptr()) };
        RemoteMessage {
            button_mask: raw.button,
            pressed_down: raw.pressed_down != 0,
            is_destroy_notification: raw.is_destroy_notification != 0,
        }
    }
}
