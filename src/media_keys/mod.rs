//! Media keys device family: keyboard media key events.

pub mod controller;
pub mod handle;

use std::fmt;

use chrono::{DateTime, Local};

use crate::native::DriverRecord;

pub use handle::MediaKeysHandle;

/// Media key identifier as reported by the wrapper library.
///
/// On some Apple keyboards the fast-forward and rewind keys report as next
/// and previous, so hosts should treat those pairs as equivalent.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MediaKeyCode(i32);

impl MediaKeyCode {
    pub const PLAY: MediaKeyCode = MediaKeyCode(16);
    pub const NEXT: MediaKeyCode = MediaKeyCode(17);
    pub const PREVIOUS: MediaKeyCode = MediaKeyCode(18);
    pub const FAST: MediaKeyCode = MediaKeyCode(19);
    pub const REWIND: MediaKeyCode = MediaKeyCode(20);

    pub fn from_code(code: i32) -> Self {
        Self(code)
    }

    pub fn code(self) -> i32 {
        self.0
    }
}

impl fmt::Display for MediaKeyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match *self {
            MediaKeyCode::PLAY => "Play",
            MediaKeyCode::NEXT => "Next",
            MediaKeyCode::PREVIOUS => "Previous",
            MediaKeyCode::FAST => "Fast",
            MediaKeyCode::REWIND => "Rewind",
            MediaKeyCode(code) => return write!(f, "Unknown({})", code),
        };
        f.write_str(name)
    }
}

/// Wire record as the wrapper library hands it over.
#[derive(Clone, Copy, Debug)]
pub struct MediaKeyMessage {
    pub is_destroy_notification: bool,
    pub pressed_down: bool,
    pub key_code: i32,
    pub key_flags: i32,
    pub key_repeat: bool,
}

impl DriverRecord for MediaKeyMessage {
    type Decoded = MediaKeyRecord;

    fn is_shutdown_sentinel(&self) -> bool {
        self.is_destroy_notification
    }

    fn decode(self, received_at: DateTime<Local>) -> MediaKeyRecord {
        MediaKeyRecord {
            key: MediaKeyCode::from_code(self.key_code),
            pressed: self.pressed_down,
            flags: self.key_flags,
            is_repeat: self.key_repeat,
            received_at,
        }
    }
}

/// One decoded media key record, timestamped on arrival.
#[derive(Clone, Copy, Debug)]
pub struct MediaKeyRecord {
    pub key: MediaKeyCode,
    pub pressed: bool,
    pub flags: i32,
    pub is_repeat: bool,
    pub received_at: DateTime<Local>,
}

/// Semantic media key event delivered to the host.
///
/// The keyboard autorepeats in hardware, so unlike the remote control
/// pipeline there is no software repeat timer; repeats arrive as records
/// flagged by the wrapper and are translated directly.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MediaKeyEvent {
    /// Key transitioned to pressed.
    KeyDown(MediaKeyCode),
    /// Key transitioned to released.
    KeyUp(MediaKeyCode),
    /// Key is pressed or still held down.
    KeyPress(MediaKeyCode),
}

/// Errors surfaced by the media keys facade.
#[derive(Debug, thiserror::Error)]
pub enum MediaKeysError {
    #[error("Native wrapper error: {0}")]
    Native(#[from] crate::native::NativeError),

    #[error("Media keys input is not supported on this platform")]
    Unsupported,

    #[error("Channel error: {0}")]
    ChannelError(String),

    #[error("Listener exited unexpectedly, media keys are unusable")]
    ListenerFailed,

    #[error("Media keys handle was already shut down")]
    AlreadyShutDown,
}
