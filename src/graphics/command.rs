use crate::error::{Error, ErrorKind, Result};
use crate::graphics::com::ComPtr;
use crate::graphics::device::DeviceContext;

use winapi::shared::winerror::FAILED;
use winapi::um::d3d12;
use winapi::Interface;

use std::mem;
use std::ptr;

/// The one submission path to the GPU: a direct queue, a command allocator
/// and a command list. The list is either recording (between `reset` and
/// `close`) or closed; only a closed list may be submitted. The allocator
/// must not be reset while the GPU may still be executing commands it
/// backs; callers drain the queue first.
///
/// Not thread-safe. There is exactly one submitting thread, so no locking.
pub struct CommandExecutor {
    queue: ComPtr<d3d12::ID3D12CommandQueue>,
    allocator: ComPtr<d3d12::ID3D12CommandAllocator>,
    list: ComPtr<d3d12::ID3D12GraphicsCommandList>,
    recording: bool,
}

impl CommandExecutor {
    pub fn new(context: &DeviceContext) -> Result<Self> {
        let device = &context.device;

        let mut queue = ComPtr::<d3d12::ID3D12CommandQueue>::empty();
        let desc = d3d12::D3D12_COMMAND_QUEUE_DESC {
            Type: d3d12::D3D12_COMMAND_LIST_TYPE_DIRECT,
            Priority: d3d12::D3D12_COMMAND_QUEUE_PRIORITY_NORMAL as _,
            Flags: d3d12::D3D12_COMMAND_QUEUE_FLAG_NONE,
            NodeMask: 0,
        };
        let hr = unsafe {
            device.CreateCommandQueue(
                &desc,
                &d3d12::ID3D12CommandQueue::uuidof(),
                queue.as_mut_void(),
            )
        };
        if FAILED(hr) {
            return Err(Error::new(
                ErrorKind::ResourceCreation,
                "ID3D12Device::CreateCommandQueue",
                hr,
            ));
        }

        let mut allocator = ComPtr::<d3d12::ID3D12CommandAllocator>::empty();
        let hr = unsafe {
            device.CreateCommandAllocator(
                d3d12::D3D12_COMMAND_LIST_TYPE_DIRECT,
                &d3d12::ID3D12CommandAllocator::uuidof(),
                allocator.as_mut_void(),
            )
        };
        if FAILED(hr) {
            return Err(Error::new(
                ErrorKind::ResourceCreation,
                "ID3D12Device::CreateCommandAllocator",
                hr,
            ));
        }

        let mut list = ComPtr::<d3d12::ID3D12GraphicsCommandList>::empty();
        let hr = unsafe {
            device.CreateCommandList(
                0,
                d3d12::D3D12_COMMAND_LIST_TYPE_DIRECT,
                allocator.as_ptr(),
                ptr::null_mut(),
                &d3d12::ID3D12GraphicsCommandList::uuidof(),
                list.as_mut_void(),
            )
        };
        if FAILED(hr) {
            return Err(Error::new(
                ErrorKind::ResourceCreation,
                "ID3D12Device::CreateCommandList",
                hr,
            ));
        }

        // Lists are created open; start closed so the first frame can
        // Reset it unconditionally.
        let hr = unsafe { list.Close() };
        if FAILED(hr) {
            return Err(Error::new(
                ErrorKind::Submission,
                "ID3D12GraphicsCommandList::Close",
                hr,
            ));
        }

        Ok(CommandExecutor {
            queue,
            allocator,
            list,
            recording: false,
        })
    }

    /// Begins recording on the list with the current allocator.
    pub fn reset(&mut self) -> Result<()> {
        debug_assert!(!self.recording, "command list is already recording");
        let hr = unsafe { self.list.Reset(self.allocator.as_ptr(), ptr::null_mut()) };
        if FAILED(hr) {
            return Err(Error::new(
                ErrorKind::Submission,
                "ID3D12GraphicsCommandList::Reset",
                hr,
            ));
        }
        self.recording = true;
        Ok(())
    }

    /// Ends recording. Required before `execute`.
    pub fn close(&mut self) -> Result<()> {
        debug_assert!(self.recording, "command list is not recording");
        let hr = unsafe { self.list.Close() };
        if FAILED(hr) {
            return Err(Error::new(
                ErrorKind::Submission,
                "ID3D12GraphicsCommandList::Close",
                hr,
            ));
        }
        self.recording = false;
        Ok(())
    }

    /// Submits the closed list to the queue. Schedules GPU work; does not
    /// block.
    pub fn execute(&self) {
        debug_assert!(!self.recording, "submission requires a closed list");
        let lists = [self.list.as_ptr() as *mut d3d12::ID3D12CommandList];
        unsafe {
            self.queue.ExecuteCommandLists(lists.len() as _, lists.as_ptr());
        }
    }

    /// Reclaims allocator memory. Only valid once the fence confirms every
    /// command it backs has completed.
    pub fn reset_allocator(&self) -> Result<()> {
        let hr = unsafe { self.allocator.Reset() };
        if FAILED(hr) {
            return Err(Error::new(
                ErrorKind::Submission,
                "ID3D12CommandAllocator::Reset",
                hr,
            ));
        }
        Ok(())
    }

    pub fn is_recording(&self) -> bool {
        self.recording
    }

    pub(crate) fn queue(&self) -> &ComPtr<d3d12::ID3D12CommandQueue> {
        &self.queue
    }

    pub(crate) fn list(&self) -> &ComPtr<d3d12::ID3D12GraphicsCommandList> {
        &self.list
    }

    /// Raw recording handle for the content collaborator; valid between
    /// `reset` and `close`.
    pub fn list_ptr(&self) -> *mut d3d12::ID3D12GraphicsCommandList {
        self.list.as_ptr()
    }
}

/// Declares a usage change for `resource`, required before certain
/// operations (e.g. before writing depth data).
pub(crate) fn transition_barrier(
    resource: *mut d3d12::ID3D12Resource,
    state_before: d3d12::D3D12_RESOURCE_STATES,
    state_after: d3d12::D3D12_RESOURCE_STATES,
) -> d3d12::D3D12_RESOURCE_BARRIER {
    let mut barrier = d3d12::D3D12_RESOURCE_BARRIER {
        Type: d3d12::D3D12_RESOURCE_BARRIER_TYPE_TRANSITION,
        Flags: d3d12::D3D12_RESOURCE_BARRIER_FLAG_NONE,
        u: unsafe { mem::zeroed() },
    };
    unsafe {
        *barrier.u.Transition_mut() = d3d12::D3D12_RESOURCE_TRANSITION_BARRIER {
            pResource: resource,
            Subresource: d3d12::D3D12_RESOURCE_BARRIER_ALL_SUBRESOURCES,
            StateBefore: state_before,
            StateAfter: state_after,
        };
    }
    barrier
}
