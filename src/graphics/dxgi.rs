use crate::error::{Error, ErrorKind, Result};
use crate::graphics::com::ComPtr;

use winapi::shared::{
    dxgi, dxgi1_2, dxgi1_3, dxgi1_4, dxgiformat, dxgitype, minwindef,
    windef::HWND,
    winerror::FAILED,
};
use winapi::um::d3d12;
use winapi::Interface;

use std::mem;
use std::ptr;

pub struct Factory {
    pub(crate) native: ComPtr<dxgi1_4::IDXGIFactory4>,
}

impl Factory {
    pub fn new() -> Result<Self> {
        #[cfg(debug_assertions)]
        let flags = dxgi1_3::DXGI_CREATE_FACTORY_DEBUG;
        #[cfg(not(debug_assertions))]
        let flags = 0;

        let mut factory = ComPtr::<dxgi1_4::IDXGIFactory4>::empty();
        let hr = unsafe {
            dxgi1_3::CreateDXGIFactory2(
                flags,
                &dxgi1_4::IDXGIFactory4::uuidof(),
                factory.as_mut_void(),
            )
        };
        if FAILED(hr) {
            return Err(Error::new(
                ErrorKind::DeviceCreation,
                "CreateDXGIFactory2",
                hr,
            ));
        }
        Ok(Factory { native: factory })
    }

    /// Enumerates the WARP software adapter, the fallback when no hardware
    /// adapter supports the minimum feature level.
    pub fn warp_adapter(&self) -> Result<ComPtr<dxgi::IDXGIAdapter>> {
        let mut adapter = ComPtr::<dxgi::IDXGIAdapter>::empty();
        let hr = unsafe {
            self.native
                .EnumWarpAdapter(&dxgi::IDXGIAdapter::uuidof(), adapter.as_mut_void())
        };
        if FAILED(hr) {
            return Err(Error::new(
                ErrorKind::DeviceCreation,
                "IDXGIFactory4::EnumWarpAdapter",
                hr,
            ));
        }
        Ok(adapter)
    }
}

pub struct SwapChainDesc {
    pub window_handle: HWND,
    pub width: u32,
    pub height: u32,
    pub format: dxgiformat::DXGI_FORMAT,
    pub buffer_count: u32,
}

/// Thin wrapper over the DXGI swap chain object. Buffer bookkeeping lives
/// in `SwapChainManager`.
pub struct SwapChain(ComPtr<dxgi1_2::IDXGISwapChain1>);

impl SwapChain {
    pub fn new(
        factory: &Factory,
        queue: &ComPtr<d3d12::ID3D12CommandQueue>,
        desc: &SwapChainDesc,
    ) -> Result<Self> {
        let native_desc = dxgi1_2::DXGI_SWAP_CHAIN_DESC1 {
            Width: desc.width,
            Height: desc.height,
            Format: desc.format,
            Stereo: minwindef::FALSE,
            SampleDesc: dxgitype::DXGI_SAMPLE_DESC {
                Count: 1,
                Quality: 0,
            },
            BufferUsage: dxgitype::DXGI_USAGE_RENDER_TARGET_OUTPUT,
            BufferCount: desc.buffer_count,
            Scaling: dxgi1_2::DXGI_SCALING_STRETCH,
            SwapEffect: dxgi::DXGI_SWAP_EFFECT_FLIP_DISCARD,
            AlphaMode: dxgi1_2::DXGI_ALPHA_MODE_UNSPECIFIED,
            Flags: 0,
        };
        let fullscreen_desc = dxgi1_2::DXGI_SWAP_CHAIN_FULLSCREEN_DESC {
            Windowed: minwindef::TRUE,
            ..unsafe { mem::zeroed() }
        };

        let mut swap_chain = ComPtr::<dxgi1_2::IDXGISwapChain1>::empty();
        let hr = unsafe {
            factory.native.CreateSwapChainForHwnd(
                queue.as_ptr() as *mut _,
                desc.window_handle,
                &native_desc,
                &fullscreen_desc,
                ptr::null_mut(),
                swap_chain.as_mut_void() as *mut *mut _,
            )
        };
        if FAILED(hr) {
            return Err(Error::new(
                ErrorKind::ResourceCreation,
                "IDXGIFactory4::CreateSwapChainForHwnd",
                hr,
            ));
        }
        Ok(SwapChain(swap_chain))
    }

    /// Fails if any back-buffer reference is still alive; callers release
    /// them all first.
    pub fn resize_buffers(
        &self,
        buffer_count: u32,
        width: u32,
        height: u32,
        format: dxgiformat::DXGI_FORMAT,
    ) -> Result<()> {
        let hr = unsafe {
            self.0
                .ResizeBuffers(buffer_count, width, height, format, 0)
        };
        if FAILED(hr) {
            return Err(Error::new(
                ErrorKind::ResourceCreation,
                "IDXGISwapChain::ResizeBuffers",
                hr,
            ));
        }
        Ok(())
    }

    pub fn buffer(&self, index: u32) -> Result<ComPtr<d3d12::ID3D12Resource>> {
        let mut buffer = ComPtr::<d3d12::ID3D12Resource>::empty();
        let hr = unsafe {
            self.0.GetBuffer(
                index,
                &d3d12::ID3D12Resource::uuidof(),
                buffer.as_mut_void(),
            )
        };
        if FAILED(hr) {
            return Err(Error::new(
                ErrorKind::ResourceCreation,
                "IDXGISwapChain::GetBuffer",
                hr,
            ));
        }
        Ok(buffer)
    }

    pub fn present(&self) -> Result<()> {
        let hr = unsafe { self.0.Present(0, 0) };
        if FAILED(hr) {
            return Err(Error::new(
                ErrorKind::Submission,
                "IDXGISwapChain::Present",
                hr,
            ));
        }
        Ok(())
    }
}
