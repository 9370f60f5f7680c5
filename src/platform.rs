//! Platform capability detection.

/// Which device families the current platform can serve. Decided once at
/// startup and passed into the facades, which refuse to open unsupported
/// pipelines instead of silently doing nothing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlatformSupport {
    pub remote_control: bool,
    pub media_keys: bool,
}

impl PlatformSupport {
    /// Detect support for the running platform. Both wrapper libraries bind
    /// macOS frameworks, so support is macOS-only.
    pub fn detect() -> Self {
        let macos = cfg!(target_os = "macos");
        Self {
            remote_control: macos,
            media_keys: macos,
        }
    }

    /// Claim support for everything. Useful for tests and for hosts that
    /// ship their own wrapper builds.
    pub fn all() -> Self {
        Self {
            remote_control: true,
            media_keys: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detect_matches_target_os() {
        let support = PlatformSupport::detect();
        assert_eq!(support.remote_control, cfg!(target_os = "macos"));
        assert_eq!(support.media_keys, cfg!(target_os = "macos"));
    }
}
