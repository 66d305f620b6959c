use crate::error::{Error, ErrorKind, Result};
use crate::graphics::com::ComPtr;

use winapi::shared::winerror::FAILED;
use winapi::um::d3d12;
use winapi::Interface;

/// Fixed-stride array of view descriptors of one kind. Capacity is fixed
/// at creation and equals the number of views ever bound into it.
pub struct DescriptorHeap {
    // Handles point into the heap's memory; the heap must outlive them.
    _native: ComPtr<d3d12::ID3D12DescriptorHeap>,
    base: d3d12::D3D12_CPU_DESCRIPTOR_HANDLE,
    stride: u32,
    capacity: u32,
}

impl DescriptorHeap {
    pub fn new(
        device: &ComPtr<d3d12::ID3D12Device>,
        kind: d3d12::D3D12_DESCRIPTOR_HEAP_TYPE,
        capacity: u32,
    ) -> Result<Self> {
        let desc = d3d12::D3D12_DESCRIPTOR_HEAP_DESC {
            Type: kind,
            NumDescriptors: capacity,
            Flags: d3d12::D3D12_DESCRIPTOR_HEAP_FLAG_NONE,
            NodeMask: 0,
        };
        let mut heap = ComPtr::<d3d12::ID3D12DescriptorHeap>::empty();
        let hr = unsafe {
            device.CreateDescriptorHeap(
                &desc,
                &d3d12::ID3D12DescriptorHeap::uuidof(),
                heap.as_mut_void(),
            )
        };
        if FAILED(hr) {
            return Err(Error::new(
                ErrorKind::ResourceCreation,
                "ID3D12Device::CreateDescriptorHeap",
                hr,
            ));
        }

        let base = unsafe { heap.GetCPUDescriptorHandleForHeapStart() };
        let stride = unsafe { device.GetDescriptorHandleIncrementSize(kind) };

        Ok(DescriptorHeap {
            _native: heap,
            base,
            stride,
            capacity,
        })
    }

    /// Handle at `base + index * stride`.
    pub fn cpu_handle(&self, index: u32) -> d3d12::D3D12_CPU_DESCRIPTOR_HANDLE {
        assert!(index < self.capacity, "descriptor index out of heap bounds");
        d3d12::D3D12_CPU_DESCRIPTOR_HANDLE {
            ptr: self.base.ptr + (index * self.stride) as usize,
        }
    }
}
