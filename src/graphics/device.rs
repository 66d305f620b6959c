use crate::error::{Error, ErrorKind, Result};
use crate::graphics::com::ComPtr;
use crate::graphics::dxgi::Factory;
use crate::graphics::sync::FrameSync;

use log::{info, warn};

use winapi::shared::dxgiformat;
use winapi::shared::winerror::FAILED;
use winapi::um::{d3d12, d3dcommon};
use winapi::Interface;

use std::mem;
use std::ptr;

/// Owns the logical GPU device, the DXGI factory and the frame fence.
/// Created once at startup; destroyed only at process teardown.
pub struct DeviceContext {
    pub(crate) factory: Factory,
    pub(crate) device: ComPtr<d3d12::ID3D12Device>,
    pub(crate) sync: FrameSync,
}

impl DeviceContext {
    /// Tries hardware device creation at `min_feature_level`; on failure
    /// falls back to the WARP software adapter. Both paths failing is
    /// fatal: no further GPU work is possible.
    pub fn new(min_feature_level: d3dcommon::D3D_FEATURE_LEVEL) -> Result<Self> {
        #[cfg(debug_assertions)]
        enable_debug_layer();

        let factory = Factory::new()?;

        let device = match create_device(ptr::null_mut(), min_feature_level) {
            Ok(device) => {
                info!("Created D3D12 device on the default hardware adapter.");
                device
            }
            Err(hardware_error) => {
                warn!(
                    "Hardware device creation failed ({}); retrying on the WARP adapter.",
                    hardware_error
                );
                let warp = factory.warp_adapter()?;
                let device = create_device(warp.as_ptr() as *mut _, min_feature_level)?;
                info!("Created D3D12 device on the WARP software adapter.");
                device
            }
        };

        let sync = FrameSync::new(&device)?;

        Ok(DeviceContext {
            factory,
            device,
            sync,
        })
    }

    /// Number of quality levels the device supports for 4x MSAA at the
    /// given format. Zero means unsupported.
    pub fn msaa_4x_quality(&self, format: dxgiformat::DXGI_FORMAT) -> Result<u32> {
        let mut levels = d3d12::D3D12_FEATURE_DATA_MULTISAMPLE_QUALITY_LEVELS {
            Format: format,
            SampleCount: 4,
            Flags: d3d12::D3D12_MULTISAMPLE_QUALITY_LEVELS_FLAG_NONE,
            NumQualityLevels: 0,
        };
        let hr = unsafe {
            self.device.CheckFeatureSupport(
                d3d12::D3D12_FEATURE_MULTISAMPLE_QUALITY_LEVELS,
                &mut levels as *mut _ as *mut _,
                mem::size_of::<d3d12::D3D12_FEATURE_DATA_MULTISAMPLE_QUALITY_LEVELS>() as _,
            )
        };
        if FAILED(hr) {
            return Err(Error::new(
                ErrorKind::ResourceCreation,
                "ID3D12Device::CheckFeatureSupport",
                hr,
            ));
        }
        Ok(levels.NumQualityLevels)
    }
}

fn create_device(
    adapter: *mut winapi::um::unknwnbase::IUnknown,
    min_feature_level: d3dcommon::D3D_FEATURE_LEVEL,
) -> Result<ComPtr<d3d12::ID3D12Device>> {
    let mut device = ComPtr::<d3d12::ID3D12Device>::empty();
    let hr = unsafe {
        d3d12::D3D12CreateDevice(
            adapter,
            min_feature_level,
            &d3d12::ID3D12Device::uuidof(),
            device.as_mut_void(),
        )
    };
    if FAILED(hr) {
        return Err(Error::new(
            ErrorKind::DeviceCreation,
            "D3D12CreateDevice",
            hr,
        ));
    }
    Ok(device)
}

#[cfg(debug_assertions)]
fn enable_debug_layer() {
    use winapi::shared::winerror::SUCCEEDED;
    use winapi::um::d3d12sdklayers;

    let mut debug = ComPtr::<d3d12sdklayers::ID3D12Debug>::empty();
    unsafe {
        if SUCCEEDED(d3d12::D3D12GetDebugInterface(
            &d3d12sdklayers::ID3D12Debug::uuidof(),
            debug.as_mut_void(),
        )) {
            debug.EnableDebugLayer();
        }
    }
}
