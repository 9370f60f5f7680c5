//! Remote control device family: button events with autorepeat.

pub mod autorepeat;
pub mod controller;
pub mod handle;

use std::fmt;

use chrono::{DateTime, Local};

use crate::native::DriverRecord;

pub use handle::RemoteControlHandle;

/// Remote control button identifier.
///
/// The wrapper reports buttons as a bit mask with exactly one bit set per
/// record. Hold variants are distinct buttons reported by the hardware, not
/// a flag combined with the base button.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RemoteButton(u32);

impl RemoteButton {
    pub const PLUS: RemoteButton = RemoteButton(1 << 1);
    pub const MINUS: RemoteButton = RemoteButton(1 << 2);
    pub const MENU: RemoteButton = RemoteButton(1 << 3);
    pub const PLAY: RemoteButton = RemoteButton(1 << 4);
    pub const RIGHT: RemoteButton = RemoteButton(1 << 5);
    pub const LEFT: RemoteButton = RemoteButton(1 << 6);
    pub const PLUS_HOLD: RemoteButton = RemoteButton(1 << 7);
    pub const MINUS_HOLD: RemoteButton = RemoteButton(1 << 8);
    pub const MENU_HOLD: RemoteButton = RemoteButton(1 << 9);
    pub const PLAY_HOLD: RemoteButton = RemoteButton(1 << 10);
    pub const RIGHT_HOLD: RemoteButton = RemoteButton(1 << 11);
    pub const LEFT_HOLD: RemoteButton = RemoteButton(1 << 12);
    pub const CONTROL_SWITCHED: RemoteButton = RemoteButton(1 << 13);

    pub fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    pub fn bits(self) -> u32 {
        self.0
    }
}

impl fmt::Display for RemoteButton {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match *self {
            RemoteButton::PLUS => "Plus",
            RemoteButton::MINUS => "Minus",
            RemoteButton::MENU => "Menu",
            RemoteButton::PLAY => "Play",
            RemoteButton::RIGHT => "Right",
            RemoteButton::LEFT => "Left",
            RemoteButton::PLUS_HOLD => "PlusHold",
            RemoteButton::MINUS_HOLD => "MinusHold",
            RemoteButton::MENU_HOLD => "MenuHold",
            RemoteButton::PLAY_HOLD => "PlayHold",
            RemoteButton::RIGHT_HOLD => "RightHold",
            RemoteButton::LEFT_HOLD => "LeftHold",
            RemoteButton::CONTROL_SWITCHED => "ControlSwitched",
            RemoteButton(bits) => return write!(f, "Unknown({:#x})", bits),
        };
        f.write_str(name)
    }
}

/// Wire record as the wrapper library hands it over.
#[derive(Clone, Copy, Debug)]
pub struct RemoteMessage {
    pub button_mask: u32,
    pub pressed_down: bool,
    pub is_destroy_notification: bool,
}

impl DriverRecord for RemoteMessage {
    type Decoded = RemoteRecord;

    fn is_shutdown_sentinel(&self) -> bool {
        self.is_destroy_notification
    }

    fn decode(self, received_at: DateTime<Local>) -> RemoteRecord {
        RemoteRecord {
            button: RemoteButton::from_bits(self.button_mask),
            pressed: self.pressed_down,
            received_at,
        }
    }
}

/// One decoded button edge, timestamped on arrival.
#[derive(Clone, Copy, Debug)]
pub struct RemoteRecord {
    pub button: RemoteButton,
    pub pressed: bool,
    pub received_at: DateTime<Local>,
}

/// Semantic remote control event delivered to the host.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RemoteEvent {
    /// Button transitioned to pressed.
    ButtonDown(RemoteButton),
    /// Button transitioned to released.
    ButtonUp(RemoteButton),
    /// Press pulse: emitted once with every down edge, then repeatedly by
    /// the autorepeat timers while the button stays held.
    ButtonPress(RemoteButton),
}

/// Errors surfaced by the remote control facade.
#[derive(Debug, thiserror::Error)]
pub enum RemoteError {
    #[error("Native wrapper error: {0}")]
    Native(#[from] crate::native::NativeError),

    #[error("Remote control input is not supported on this platform")]
    Unsupported,

    #[error("Channel error: {0}")]
    ChannelError(String),

    #[error("Listener exited unexpectedly, remote control is unusable")]
    ListenerFailed,

    #[error("Remote control handle was already shut down")]
    AlreadyShutDown,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn button_bits_match_the_wrapper() {
        // The wrapper reports these exact bit positions; a host matching on
        // the constants depends on them never moving.
        assert_eq!(RemoteButton::PLUS.bits(), 1 << 1);
        assert_eq!(RemoteButton::MINUS.bits(), 1 << 2);
        assert_eq!(RemoteButton::MENU.bits(), 1 << 3);
        assert_eq!(RemoteButton::PLAY.bits(), 1 << 4);
        assert_eq!(RemoteButton::RIGHT.bits(), 1 << 5);
        assert_eq!(RemoteButton::LEFT.bits(), 1 << 6);
        assert_eq!(RemoteButton::PLUS_HOLD.bits(), 1 << 7);
        assert_eq!(RemoteButton::MINUS_HOLD.bits(), 1 << 8);
        assert_eq!(RemoteButton::MENU_HOLD.bits(), 1 << 9);
        assert_eq!(RemoteButton::PLAY_HOLD.bits(), 1 << 10);
        assert_eq!(RemoteButton::RIGHT_HOLD.bits(), 1 << 11);
        assert_eq!(RemoteButton::LEFT_HOLD.bits(), 1 << 12);
        assert_eq!(RemoteButton::CONTROL_SWITCHED.bits(), 1 << 13);
    }

    #[test]
    fn button_names_follow_the_bits() {
        assert_eq!(RemoteButton::PLAY_HOLD.to_string(), "PlayHold");
        assert_eq!(RemoteButton::RIGHT_HOLD.to_string(), "RightHold");
        assert_eq!(RemoteButton::from_bits(1 << 20).to_string(), "Unknown(0x100000)");
    }
}
