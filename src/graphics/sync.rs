use crate::error::{Error, ErrorKind, Result};
use crate::graphics::com::ComPtr;
use crate::graphics::command::CommandExecutor;

use log::trace;

use winapi::shared::winerror::{E_FAIL, FAILED};
use winapi::um::{d3d12, handleapi, synchapi, winbase, winnt};
use winapi::Interface;

use std::ptr;

/// OS wait handle, signaled on fence completion. Closed on drop.
struct Event {
    handle: winnt::HANDLE,
}

impl Event {
    fn create() -> Result<Self> {
        let handle = unsafe {
            synchapi::CreateEventExW(
                ptr::null_mut(),
                ptr::null(),
                0,
                winnt::EVENT_MODIFY_STATE | winnt::SYNCHRONIZE,
            )
        };
        if handle.is_null() {
            return Err(Error::new(
                ErrorKind::Synchronization,
                "CreateEventExW",
                E_FAIL,
            ));
        }
        Ok(Event { handle })
    }

    /// Blocks with no timeout until the event is signaled.
    fn wait(&self) {
        unsafe {
            synchapi::WaitForSingleObject(self.handle, winbase::INFINITE);
        }
    }
}

impl Drop for Event {
    fn drop(&mut self) {
        unsafe {
            handleapi::CloseHandle(self.handle);
        }
    }
}

/// The fence-based CPU/GPU barrier. The fence is a monotonically
/// increasing 64-bit counter on the GPU timeline: `signaled_value` is the
/// last value the CPU asked the queue to signal and only ever increases;
/// the GPU-completed value is non-decreasing and never exceeds it. A value
/// observed as completed guarantees every command submitted before the
/// corresponding signal has finished.
pub struct FrameSync {
    fence: ComPtr<d3d12::ID3D12Fence>,
    signaled: u64,
}

impl FrameSync {
    pub(crate) fn new(device: &ComPtr<d3d12::ID3D12Device>) -> Result<Self> {
        let mut fence = ComPtr::<d3d12::ID3D12Fence>::empty();
        let hr = unsafe {
            device.CreateFence(
                0,
                d3d12::D3D12_FENCE_FLAG_NONE,
                &d3d12::ID3D12Fence::uuidof(),
                fence.as_mut_void(),
            )
        };
        if FAILED(hr) {
            return Err(Error::new(
                ErrorKind::ResourceCreation,
                "ID3D12Device::CreateFence",
                hr,
            ));
        }
        Ok(FrameSync { fence, signaled: 0 })
    }

    pub fn signaled_value(&self) -> u64 {
        self.signaled
    }

    pub fn completed_value(&self) -> u64 {
        unsafe { self.fence.GetCompletedValue() }
    }

    /// Blocks until all GPU work previously submitted on `executor`'s queue
    /// has completed.
    ///
    /// This is a coarse, stop-the-world barrier: it stalls the submitting
    /// thread on every call rather than pipelining frames over a ring of
    /// per-frame fence values. That blocking contract is load-bearing for
    /// the resize protocol and is kept as-is; pipelining is the first
    /// optimization target for any rework.
    ///
    /// The wait is unbounded. A device removal while waiting hangs the
    /// thread; recovery behavior is an open gap left unresolved on purpose.
    pub fn drain(&mut self, executor: &CommandExecutor) -> Result<()> {
        self.signaled += 1;
        let hr = unsafe { executor.queue().Signal(self.fence.as_ptr(), self.signaled) };
        if FAILED(hr) {
            return Err(Error::new(
                ErrorKind::Synchronization,
                "ID3D12CommandQueue::Signal",
                hr,
            ));
        }

        if self.completed_value() < self.signaled {
            let event = Event::create()?;
            let hr = unsafe { self.fence.SetEventOnCompletion(self.signaled, event.handle) };
            if FAILED(hr) {
                return Err(Error::new(
                    ErrorKind::Synchronization,
                    "ID3D12Fence::SetEventOnCompletion",
                    hr,
                ));
            }
            event.wait();
        }

        trace!("Drained GPU queue at fence value {}.", self.signaled);
        Ok(())
    }
}
