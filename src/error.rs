use std::error;
use std::fmt;
use std::panic::Location;

/// Raw HRESULT returned by the failing API call.
pub type HResult = i32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Device creation failed on both the hardware and the WARP path.
    /// Unrecoverable: no further GPU work is possible.
    DeviceCreation,
    /// A GPU object (heap, buffer, view, fence) could not be created.
    ResourceCreation,
    /// Command list recording, submission or present failed.
    Submission,
    /// Queue signal or fence completion registration failed. The drain wait
    /// itself is unbounded and never times out; see `FrameSync::drain`.
    Synchronization,
}

impl ErrorKind {
    fn as_str(self) -> &'static str {
        match self {
            ErrorKind::DeviceCreation => "device creation",
            ErrorKind::ResourceCreation => "resource creation",
            ErrorKind::Submission => "submission",
            ErrorKind::Synchronization => "synchronization",
        }
    }
}

/// A failed graphics API call, annotated with the call name, the raw
/// HRESULT and the Rust source location that issued it. Never caught inside
/// the core; propagates to the process entry point, which reports it and
/// terminates.
#[derive(Debug)]
pub struct Error {
    kind: ErrorKind,
    call: &'static str,
    hr: HResult,
    location: &'static Location<'static>,
}

impl Error {
    #[track_caller]
    pub fn new(kind: ErrorKind, call: &'static str, hr: HResult) -> Self {
        Error {
            kind,
            call,
            hr,
            location: Location::caller(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn call(&self) -> &'static str {
        self.call
    }

    pub fn hresult(&self) -> HResult {
        self.hr
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} failed with HRESULT {:#010x} ({}) at {}:{}",
            self.call,
            self.hr as u32,
            self.kind.as_str(),
            self.location.file(),
            self.location.line(),
        )
    }
}

impl error::Error for Error {}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_carries_call_code_and_location() {
        const DXGI_ERROR_DEVICE_REMOVED: HResult = 0x887A_0005u32 as i32;
        let error = Error::new(
            ErrorKind::DeviceCreation,
            "D3D12CreateDevice",
            DXGI_ERROR_DEVICE_REMOVED,
        );
        let message = error.to_string();
        assert!(message.contains("D3D12CreateDevice"));
        assert!(message.contains("0x887a0005"));
        assert!(message.contains("device creation"));
        assert!(message.contains("error.rs"));
    }

    #[test]
    fn kind_and_hresult_are_preserved() {
        let error = Error::new(ErrorKind::ResourceCreation, "CreateCommittedResource", -1);
        assert_eq!(error.kind(), ErrorKind::ResourceCreation);
        assert_eq!(error.hresult(), -1);
        assert_eq!(error.call(), "CreateCommittedResource");
    }
}
