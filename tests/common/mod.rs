//! Scripted drivers standing in for the native wrapper libraries.

use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::Mutex;

use remotekeys::media_keys::MediaKeyMessage;
use remotekeys::native::{InputDriver, NativeError, RawHandle};
use remotekeys::remote::RemoteMessage;

/// Remote control driver fed from the test. `next_record` blocks on an
/// in-memory queue the way the real wrapper blocks on hardware input, and
/// `destroy` pushes the shutdown sentinel the way the real wrapper does.
pub struct ScriptedRemoteDriver {
    feed: Mutex<Sender<RemoteMessage>>,
    inbox: Mutex<Receiver<RemoteMessage>>,
    pub started: AtomicUsize,
    pub stopped: AtomicUsize,
    pub destroyed: AtomicUsize,
}

impl ScriptedRemoteDriver {
    pub fn new() -> Self {
        let (feed, inbox) = channel();
        Self {
            feed: Mutex::new(feed),
            inbox: Mutex::new(inbox),
            started: AtomicUsize::new(0),
            stopped: AtomicUsize::new(0),
            destroyed: AtomicUsize::new(0),
        }
    }

    pub fn push(&self, button_mask: u32, pressed: bool) {
        self.feed
            .lock()
            .unwrap()
            .send(RemoteMessage {
                button_mask,
                pressed_down: pressed,
                is_destroy_notification: false,
            })
            .unwrap();
    }

    /// Deliver the sentinel without a destroy call, simulating a listener
    /// that dies underneath the pipeline.
    pub fn push_spurious_sentinel(&self) {
        self.feed
            .lock()
            .unwrap()
            .send(RemoteMessage {
                button_mask: 0,
                pressed_down: false,
                is_destroy_notification: true,
            })
            .unwrap();
    }
}

impl InputDriver for ScriptedRemoteDriver {
    type Record = RemoteMessage;

    fn create(&self) -> Result<RawHandle, NativeError> {
        Ok(RawHandle::from_ptr(std::ptr::null_mut()))
    }

    fn start_listening(&self, _handle: RawHandle) {
        self.started.fetch_add(1, Ordering::SeqCst);
    }

    fn stop_listening(&self, _handle: RawHandle) {
        self.stopped.fetch_add(1, Ordering::SeqCst);
    }

    fn destroy(&self, _handle: RawHandle) {
        self.destroyed.fetch_add(1, Ordering::SeqCst);
        self.feed
            .lock()
            .unwrap()
            .send(RemoteMessage {
                button_mask: 0,
                pressed_down: false,
                is_destroy_notification: true,
            })
            .unwrap();
    }

    fn next_record(&self, _handle: RawHandle) -> RemoteMessage {
        self.inbox.lock().unwrap().recv().unwrap()
    }
}

/// Media keys counterpart of [`ScriptedRemoteDriver`].
pub struct ScriptedMediaKeysDriver {
    feed: Mutex<Sender<MediaKeyMessage>>,
    inbox: Mutex<Receiver<MediaKeyMessage>>,
    pub started: AtomicUsize,
    pub stopped: AtomicUsize,
    pub destroyed: AtomicUsize,
}

impl ScriptedMediaKeysDriver {
    pub fn new() -> Self {
        let (feed, inbox) = channel();
        Self {
            feed: Mutex::new(feed),
            inbox: Mutex::new(inbox),
            started: AtomicUsize::new(0),
            stopped: AtomicUsize::new(0),
            destroyed: AtomicUsize::new(0),
        }
    }

    pub fn push(&self, key_code: i32, pressed: bool, repeat: bool) {
        self.feed
            .lock()
            .unwrap()
            .send(MediaKeyMessage {
                is_destroy_notification: false,
                pressed_down: pressed,
                key_code,
                key_flags: 0,
                key_repeat: repeat,
            })
            .unwrap();
    }

    pub fn push_spurious_sentinel(&self) {
        self.feed
            .lock()
            .unwrap()
            .send(MediaKeyMessage {
                is_destroy_notification: true,
                pressed_down: false,
                key_code: 0,
                key_flags: 0,
                key_repeat: false,
            })
            .unwrap();
    }
}

impl InputDriver for ScriptedMediaKeysDriver {
    type Record = MediaKeyMessage;

    fn create(&self) -> Result<RawHandle, NativeError> {
        Ok(RawHandle::from_ptr(std::ptr::null_mut()))
    }

    fn start_listening(&self, _handle: RawHandle) {
        self.started.fetch_add(1, Ordering::SeqCst);
    }

    fn stop_listening(&self, _handle: RawHandle) {
        self.stopped.fetch_add(1, Ordering::SeqCst);
    }

    fn destroy(&self, _handle: RawHandle) {
        self.destroyed.fetch_add(1, Ordering::SeqCst);
        self.feed
            .lock()
            .unwrap()
            .send(MediaKeyMessage {
                is_destroy_notification: true,
                pressed_down: false,
                key_code: 0,
                key_flags: 0,
                key_repeat: false,
            })
            .unwrap();
    }

    fn next_record(&self, _handle: RawHandle) -> MediaKeyMessage {
        self.inbox.lock().unwrap().recv().unwrap()
    }
}
