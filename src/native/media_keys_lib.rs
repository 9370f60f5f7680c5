//! dlopen-backed driver for the media keys wrapper library.

use std::ffi::c_void;
use std::os::raw::c_int;
use std::path::Path;

use libloading::Library;
use tracing::{debug, info};

use super::{InputDriver, NativeError, RawHandle};
use crate::media_keys::MediaKeyMessage;

type CreateFn = unsafe extern "C" fn() -> *mut c_void;
type HandleFn = unsafe extern "C" fn(*mut c_void);
type GetMessageFn = unsafe extern "C" fn(*mut c_void) -> MktcwMessage;

/// Wire layout of one record returned by `mktcw_get_message`.
#[repr(C)]
#[derive(Clone, Copy)]
struct MktcwMessage {
    is_destroy_notification: u8,
    pressed_down: u8,
    key_code: c_int,
    key_flags: c_int,
    key_repeat: u8,
}

/// Media keys wrapper library with all entry points resolved at open time.
pub struct MediaKeysLibrary {
    create: CreateFn,
    start_listening: HandleFn,
    stop_listening: HandleFn,
    destroy: HandleFn,
    get_message: GetMessageFn,
    _lib: Library,
}

impl MediaKeysLibrary {
    /// Open the wrapper library at `path` and resolve the `mktcw_*` entry
    /// points.
    pub fn open(path: &Path) -> Result<Self, NativeError> {
        info!("Opening media keys wrapper library: {}", path.display());

        // SAFETY: the wrapper is a plain C library without load-time side
        // effects; the symbol signatures match its header.
        unsafe {
            let lib = Library::new(path)?;
            let create = *lib.get::<CreateFn>(b"mktcw_create\0")?;
            let start_listening = *lib.get::<HandleFn>(b"mktcw_start_listening\0")?;
            let stop_listening = *lib.get::<HandleFn>(b"mktcw_stop_listening\0")?;
            let destroy = *lib.get::<HandleFn>(b"mktcw_destroy\0")?;
            let get_message = *lib.get::<GetMessageFn>(b"mktcw_get_message\0")?;
            debug!("Resolved all mktcw_* entry points");

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

impl InputDriver for MediaKeysLibrary {
    type Record = MediaKeyMessage;

    fn create(&self) -> Result<RawHandle, NativeError> {
        // SAFETY: mktcw_create takes no arguments and returns a heap handle or
        // null.
        let ptr = unsafe { (self.create)() };
        if ptr.is_null() {
            return Err(NativeError::NullHandle);
        }
        debug!("Created media keys handle at {:#x}", ptr as usize);
        Ok(RawHandle::from_ptr(ptr))
    }

    fn start_listening(&self, handle: RawHandle) {
        // SAFETY: handle came from mktcw_create and has not been destroyed.
        unsafe { (self.start_listening)(handle.as_ptr()) }
    }

    fn stop_listening(&self, handle: RawHandle) {
        // SAFETY: as above.
        unsafe { (self.stop_listening)(handle.as_ptr()) }
    }

    fn destroy(&self, handle: RawHandle) {
        debug!("Destroying media keys handle {:#x}", handle.address());
        // SAFETY: called exactly once per handle, by the controller unit.
        unsafe { (self.destroy)(handle.as_ptr()) }
    }

    fn next_record(&self, handle: RawHandle) -> MediaKeyMessage {
        // SAFETY: blocks until the wrapper has a record; destroy forces the
        // sentinel, so this always eventually returns.
        let raw = unsafe { (self.get_message)(handle.as_ptr()) };
        MediaKeyMessage {
            is_destroy_notification: raw.is_destroy_notification != 0,
            pressed_down: raw.pressed_down != 0,
            key_code: raw.key_code,
            key_flags: raw.key_flags,
            key_repeat: raw.key_repeat != 0,
        }
    }
}
