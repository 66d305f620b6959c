use crate::error::Result;
use crate::frame::BackBufferRing;
use crate::graphics::com::ComPtr;
use crate::graphics::command::CommandExecutor;
use crate::graphics::descriptor::DescriptorHeap;
use crate::graphics::device::DeviceContext;
use crate::graphics::dxgi::{SwapChain, SwapChainDesc};

use log::debug;

use winapi::shared::{dxgiformat, windef::HWND};
use winapi::um::d3d12;

use std::ptr;

/// Owns the presentable buffer chain and its render-target descriptor
/// heap, and tracks which buffer is current.
pub struct SwapChainManager {
    chain: SwapChain,
    buffers: Vec<Option<ComPtr<d3d12::ID3D12Resource>>>,
    rtv_heap: DescriptorHeap,
    ring: BackBufferRing,
    format: dxgiformat::DXGI_FORMAT,
}

impl SwapChainManager {
    pub fn new(
        context: &DeviceContext,
        executor: &CommandExecutor,
        window_handle: HWND,
        width: u32,
        height: u32,
        format: dxgiformat::DXGI_FORMAT,
        buffer_count: u32,
    ) -> Result<Self> {
        let chain = SwapChain::new(
            &context.factory,
            executor.queue(),
            &SwapChainDesc {
                window_handle,
                width,
                height,
                format,
                buffer_count,
            },
        )?;
        let rtv_heap = DescriptorHeap::new(
            &context.device,
            d3d12::D3D12_DESCRIPTOR_HEAP_TYPE_RTV,
            buffer_count,
        )?;

        let mut manager = SwapChainManager {
            chain,
            buffers: (0..buffer_count).map(|_| None).collect(),
            rtv_heap,
            ring: BackBufferRing::new(buffer_count),
            format,
        };
        manager.create_render_target_views(context)?;
        Ok(manager)
    }

    /// Drops every back-buffer reference. Required before `resize`; the
    /// underlying resize call fails while references are alive.
    pub fn release_buffers(&mut self) {
        for buffer in &mut self.buffers {
            *buffer = None;
        }
    }

    /// Resizes the chain, resets the current index to 0 and regenerates
    /// one render-target view per buffer. `release_buffers` must have run,
    /// and the GPU must be drained.
    pub fn resize(&mut self, context: &DeviceContext, width: u32, height: u32) -> Result<()> {
        debug_assert!(
            self.buffers.iter().all(Option::is_none),
            "back buffers must be released before resizing the swap chain"
        );
        self.chain
            .resize_buffers(self.buffers.len() as u32, width, height, self.format)?;
        self.ring.reset();
        self.create_render_target_views(context)?;
        debug!("Resized swap chain to {}x{}.", width, height);
        Ok(())
    }

    fn create_render_target_views(&mut self, context: &DeviceContext) -> Result<()> {
        for index in 0..self.buffers.len() as u32 {
            let buffer = self.chain.buffer(index)?;
            unsafe {
                context.device.CreateRenderTargetView(
                    buffer.as_ptr(),
                    ptr::null(),
                    self.rtv_heap.cpu_handle(index),
                );
            }
            self.buffers[index as usize] = Some(buffer);
        }
        Ok(())
    }

    /// Submits the frame for display and advances the current index by one
    /// (mod buffer count).
    pub fn present(&mut self) -> Result<()> {
        self.chain.present()?;
        self.ring.advance();
        Ok(())
    }

    pub fn current_view(&self) -> d3d12::D3D12_CPU_DESCRIPTOR_HANDLE {
        self.rtv_heap.cpu_handle(self.ring.current())
    }

    pub(crate) fn current_buffer_ptr(&self) -> *mut d3d12::ID3D12Resource {
        self.buffers[self.ring.current() as usize]
            .as_ref()
            .expect("back buffer released while in use")
            .as_ptr()
    }

    pub fn current_index(&self) -> u32 {
        self.ring.current()
    }

    pub fn buffer_count(&self) -> u32 {
        self.ring.count()
    }
}
