use crate::error::{Error, ErrorKind, Result};
use crate::graphics::com::ComPtr;
use crate::graphics::command::{transition_barrier, CommandExecutor};
use crate::graphics::descriptor::DescriptorHeap;
use crate::graphics::device::DeviceContext;

use winapi::shared::winerror::FAILED;
use winapi::shared::{dxgiformat, dxgitype};
use winapi::um::d3d12;
use winapi::Interface;

use std::mem;

/// Owns the single depth/stencil resource and its descriptor heap. The
/// depth buffer is never double-buffered; it is released and recreated
/// (not resized in place) whenever dimensions or sampling change.
pub struct DepthStencilManager {
    resource: Option<ComPtr<d3d12::ID3D12Resource>>,
    dsv_heap: DescriptorHeap,
    format: dxgiformat::DXGI_FORMAT,
    width: u32,
    height: u32,
}

impl DepthStencilManager {
    pub fn new(context: &DeviceContext, format: dxgiformat::DXGI_FORMAT) -> Result<Self> {
        let dsv_heap =
            DescriptorHeap::new(&context.device, d3d12::D3D12_DESCRIPTOR_HEAP_TYPE_DSV, 1)?;
        Ok(DepthStencilManager {
            resource: None,
            dsv_heap,
            format,
            width: 0,
            height: 0,
        })
    }

    /// Releases the current depth resource and creates a new one at the
    /// given size, then records the common-to-depth-write transition into
    /// the currently-recording command list. The caller ensures the list
    /// is open before calling this and executes it afterward.
    pub fn rebuild(
        &mut self,
        context: &DeviceContext,
        executor: &CommandExecutor,
        width: u32,
        height: u32,
        sample_count: u32,
        sample_quality: u32,
    ) -> Result<()> {
        debug_assert!(
            executor.is_recording(),
            "depth rebuild records a barrier; open the command list first"
        );

        // Release before recreate; the resize protocol depends on
        // deterministic release timing.
        self.resource = None;

        let desc = d3d12::D3D12_RESOURCE_DESC {
            Dimension: d3d12::D3D12_RESOURCE_DIMENSION_TEXTURE2D,
            Alignment: 0,
            Width: u64::from(width),
            Height: height,
            DepthOrArraySize: 1,
            MipLevels: 1,
            // Typeless resource so both a DSV and a depth-reading SRV can
            // view the same memory.
            Format: typeless_format(self.format),
            SampleDesc: dxgitype::DXGI_SAMPLE_DESC {
                Count: sample_count,
                Quality: sample_quality,
            },
            Layout: d3d12::D3D12_TEXTURE_LAYOUT_UNKNOWN,
            Flags: d3d12::D3D12_RESOURCE_FLAG_ALLOW_DEPTH_STENCIL,
        };
        let heap_properties = d3d12::D3D12_HEAP_PROPERTIES {
            Type: d3d12::D3D12_HEAP_TYPE_DEFAULT,
            CPUPageProperty: d3d12::D3D12_CPU_PAGE_PROPERTY_UNKNOWN,
            MemoryPoolPreference: d3d12::D3D12_MEMORY_POOL_UNKNOWN,
            CreationNodeMask: 1,
            VisibleNodeMask: 1,
        };

        let mut resource = ComPtr::<d3d12::ID3D12Resource>::empty();
        unsafe {
            let mut clear_value = d3d12::D3D12_CLEAR_VALUE {
                Format: self.format,
                u: mem::zeroed(),
            };
            *clear_value.u.DepthStencil_mut() = d3d12::D3D12_DEPTH_STENCIL_VALUE {
                Depth: 1.0,
                Stencil: 0,
            };
            let hr = context.device.CreateCommittedResource(
                &heap_properties,
                d3d12::D3D12_HEAP_FLAG_NONE,
                &desc,
                d3d12::D3D12_RESOURCE_STATE_COMMON,
                &clear_value,
                &d3d12::ID3D12Resource::uuidof(),
                resource.as_mut_void(),
            );
            if FAILED(hr) {
                return Err(Error::new(
                    ErrorKind::ResourceCreation,
                    "ID3D12Device::CreateCommittedResource",
                    hr,
                ));
            }

            let view_dimension = if sample_count > 1 {
                d3d12::D3D12_DSV_DIMENSION_TEXTURE2DMS
            } else {
                d3d12::D3D12_DSV_DIMENSION_TEXTURE2D
            };
            let dsv_desc = d3d12::D3D12_DEPTH_STENCIL_VIEW_DESC {
                Format: self.format,
                ViewDimension: view_dimension,
                Flags: d3d12::D3D12_DSV_FLAG_NONE,
                u: mem::zeroed(),
            };
            context
                .device
                .CreateDepthStencilView(resource.as_ptr(), &dsv_desc, self.dsv_heap.cpu_handle(0));

            let barrier = transition_barrier(
                resource.as_ptr(),
                d3d12::D3D12_RESOURCE_STATE_COMMON,
                d3d12::D3D12_RESOURCE_STATE_DEPTH_WRITE,
            );
            executor.list().ResourceBarrier(1, &barrier);
        }

        self.width = width;
        self.height = height;
        self.resource = Some(resource);
        Ok(())
    }

    pub fn view(&self) -> d3d12::D3D12_CPU_DESCRIPTOR_HANDLE {
        self.dsv_heap.cpu_handle(0)
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

fn typeless_format(view_format: dxgiformat::DXGI_FORMAT) -> dxgiformat::DXGI_FORMAT {
    match view_format {
        dxgiformat::DXGI_FORMAT_D24_UNORM_S8_UINT => dxgiformat::DXGI_FORMAT_R24G8_TYPELESS,
        dxgiformat::DXGI_FORMAT_D32_FLOAT => dxgiformat::DXGI_FORMAT_R32_TYPELESS,
        other => other,
    }
}
