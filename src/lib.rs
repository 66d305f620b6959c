//! Frame-lifecycle core for a D3D12 renderer: device/adapter acquisition,
//! command submission, swap-chain and depth-buffer management, and the
//! fence-based CPU/GPU synchronization that keeps resource reuse safe.

pub mod error;
pub mod frame;
pub mod timer;

#[cfg(windows)]
pub mod graphics;

use bitflags::bitflags;

#[cfg(windows)]
use winapi::shared::dxgiformat;
#[cfg(windows)]
use winapi::um::d3dcommon;

bitflags! {
    pub struct InitFlags: u32 {
        const MSAA_4X = 0b0000_0001;
    }
}

/// Process-lifetime configuration. Fixed at startup, never reloaded.
#[cfg(windows)]
#[derive(Clone, Debug)]
pub struct InitParams {
    pub window_title: String,
    pub icon_path: String,
    pub window_width: u32,
    pub window_height: u32,
    pub back_buffer_format: dxgiformat::DXGI_FORMAT,
    pub depth_buffer_format: dxgiformat::DXGI_FORMAT,
    pub back_buffer_count: u32,
    pub min_feature_level: d3dcommon::D3D_FEATURE_LEVEL,
    pub flags: InitFlags,
}

#[cfg(windows)]
impl InitParams {
    pub fn new(window_title: String, window_width: u32, window_height: u32) -> Self {
        Self {
            window_title,
            icon_path: "misc/cobalt.ico".to_string(),
            window_width,
            window_height,
            back_buffer_format: dxgiformat::DXGI_FORMAT_R8G8B8A8_UNORM,
            depth_buffer_format: dxgiformat::DXGI_FORMAT_D24_UNORM_S8_UINT,
            back_buffer_count: 2,
            min_feature_level: d3dcommon::D3D_FEATURE_LEVEL_11_0,
            flags: InitFlags::empty(),
        }
    }
}

/// Per-frame hooks held by the frame loop. The loop owns the frame
/// lifecycle; implementors only record content on top of it.
#[cfg(windows)]
pub trait FrameApp {
    fn update(&mut self, timer: &timer::FrameTimer);
    fn draw(&mut self, renderer: &mut graphics::renderer::Renderer) -> error::Result<()>;
}
