use crate::error::Result;
use crate::frame::{RebuildHost, ResizeCoordinator, ResizeState, SizeEvent};
use crate::graphics::command::{transition_barrier, CommandExecutor};
use crate::graphics::depth::DepthStencilManager;
use crate::graphics::device::DeviceContext;
use crate::graphics::swapchain::SwapChainManager;
use crate::{InitFlags, InitParams};

use log::info;

use winapi::shared::{minwindef, windef::HWND};
use winapi::um::d3d12;

use winit::platform::windows::WindowExtWindows;
use winit::window::Window;

use std::ptr;

const CLEAR_COLOR: [f32; 4] = [0.392, 0.584, 0.929, 1.0];

/// Everything the resize coordinator rebuilds: the device-owning context,
/// the submission path and the window-sized resources.
struct RenderSurface {
    context: DeviceContext,
    executor: CommandExecutor,
    swap_chain: SwapChainManager,
    depth_stencil: DepthStencilManager,
    viewport: d3d12::D3D12_VIEWPORT,
    scissor_rect: d3d12::D3D12_RECT,
    width: u32,
    height: u32,
    msaa_4x: bool,
    msaa_quality: u32,
}

impl RenderSurface {
    fn sample_count(&self) -> u32 {
        if self.msaa_4x {
            4
        } else {
            1
        }
    }

    fn sample_quality(&self) -> u32 {
        if self.msaa_4x {
            self.msaa_quality - 1
        } else {
            0
        }
    }

    /// Opens the list, transitions the current back buffer into the
    /// render-target state. The allocator reset is safe because `present`
    /// drained the queue before returning.
    fn prepare(&mut self) -> Result<()> {
        self.executor.reset_allocator()?;
        self.executor.reset()?;
        let barrier = transition_barrier(
            self.swap_chain.current_buffer_ptr(),
            d3d12::D3D12_RESOURCE_STATE_PRESENT,
            d3d12::D3D12_RESOURCE_STATE_RENDER_TARGET,
        );
        unsafe {
            self.executor.list().ResourceBarrier(1, &barrier);
        }
        Ok(())
    }

    fn clear(&self) {
        let rtv = self.swap_chain.current_view();
        let dsv = self.depth_stencil.view();
        unsafe {
            let list = self.executor.list();
            list.RSSetViewports(1, &self.viewport);
            list.RSSetScissorRects(1, &self.scissor_rect);
            list.ClearRenderTargetView(rtv, &CLEAR_COLOR, 0, ptr::null());
            list.ClearDepthStencilView(
                dsv,
                d3d12::D3D12_CLEAR_FLAG_DEPTH | d3d12::D3D12_CLEAR_FLAG_STENCIL,
                1.0,
                0,
                0,
                ptr::null(),
            );
            list.OMSetRenderTargets(1, &rtv, minwindef::FALSE, &dsv);
        }
    }

    /// Transitions back to the present state, submits, presents and then
    /// drains the queue. The full per-frame drain is the documented
    /// blocking contract of this design.
    fn present(&mut self) -> Result<()> {
        let barrier = transition_barrier(
            self.swap_chain.current_buffer_ptr(),
            d3d12::D3D12_RESOURCE_STATE_RENDER_TARGET,
            d3d12::D3D12_RESOURCE_STATE_PRESENT,
        );
        unsafe {
            self.executor.list().ResourceBarrier(1, &barrier);
        }
        self.executor.close()?;
        self.executor.execute();
        self.swap_chain.present()?;
        self.context.sync.drain(&self.executor)
    }
}

impl RebuildHost for RenderSurface {
    fn drain(&mut self) -> Result<()> {
        self.context.sync.drain(&self.executor)
    }

    fn open_command_list(&mut self) -> Result<()> {
        self.executor.reset()
    }

    fn resize_swap_chain(&mut self, width: u32, height: u32) -> Result<()> {
        self.swap_chain.release_buffers();
        self.swap_chain.resize(&self.context, width, height)
    }

    fn rebuild_depth_stencil(&mut self, width: u32, height: u32) -> Result<()> {
        let sample_count = self.sample_count();
        let sample_quality = self.sample_quality();
        self.depth_stencil.rebuild(
            &self.context,
            &self.executor,
            width,
            height,
            sample_count,
            sample_quality,
        )
    }

    fn submit_rebuild_commands(&mut self) -> Result<()> {
        self.executor.close()?;
        self.executor.execute();
        Ok(())
    }

    fn set_client_rect(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.viewport = viewport(width, height);
        self.scissor_rect = scissor(width, height);
    }
}

/// The frame-lifecycle front end handed to the frame loop. A `Renderer`
/// cannot exist without an initialized device, so frame submission can
/// never reach a null queue.
pub struct Renderer {
    surface: RenderSurface,
    coordinator: ResizeCoordinator,
}

impl Renderer {
    pub fn new(window: &Window, params: &InitParams) -> Result<Self> {
        let window_handle = window.hwnd() as HWND;

        let mut context = DeviceContext::new(params.min_feature_level)?;
        let mut executor = CommandExecutor::new(&context)?;

        let msaa_4x = params.flags.contains(InitFlags::MSAA_4X);
        let msaa_quality = context.msaa_4x_quality(params.back_buffer_format)?;
        assert!(
            !msaa_4x || msaa_quality > 0,
            "4x MSAA is not supported for the back-buffer format"
        );

        let swap_chain = SwapChainManager::new(
            &context,
            &executor,
            window_handle,
            params.window_width,
            params.window_height,
            params.back_buffer_format,
            params.back_buffer_count,
        )?;
        let mut depth_stencil = DepthStencilManager::new(&context, params.depth_buffer_format)?;

        // The initial depth build goes through the same open/record/submit/
        // drain sequence a resize rebuild uses.
        let sample_count = if msaa_4x { 4 } else { 1 };
        let sample_quality = if msaa_4x { msaa_quality - 1 } else { 0 };
        executor.reset()?;
        depth_stencil.rebuild(
            &context,
            &executor,
            params.window_width,
            params.window_height,
            sample_count,
            sample_quality,
        )?;
        executor.close()?;
        executor.execute();
        context.sync.drain(&executor)?;

        info!(
            "Renderer ready: {}x{}, {} back buffers.",
            params.window_width, params.window_height, params.back_buffer_count
        );

        Ok(Renderer {
            surface: RenderSurface {
                context,
                executor,
                swap_chain,
                depth_stencil,
                viewport: viewport(params.window_width, params.window_height),
                scissor_rect: scissor(params.window_width, params.window_height),
                width: params.window_width,
                height: params.window_height,
                msaa_4x,
                msaa_quality,
            },
            coordinator: ResizeCoordinator::new(params.window_width, params.window_height),
        })
    }

    /// Routes a size-change notification through the resize state machine,
    /// which rebuilds the swap chain and depth buffer when required.
    pub fn handle_size_event(&mut self, event: SizeEvent) -> Result<()> {
        self.coordinator.handle_event(event, &mut self.surface)
    }

    pub fn resize_state(&self) -> ResizeState {
        self.coordinator.state()
    }

    /// True while the window is minimized; the loop skips frames.
    pub fn is_paused(&self) -> bool {
        self.coordinator.is_paused()
    }

    pub fn prepare(&mut self) -> Result<()> {
        self.surface.prepare()
    }

    pub fn clear(&mut self) {
        self.surface.clear()
    }

    pub fn present(&mut self) -> Result<()> {
        self.surface.present()
    }

    pub fn current_back_buffer_view(&self) -> d3d12::D3D12_CPU_DESCRIPTOR_HANDLE {
        self.surface.swap_chain.current_view()
    }

    pub fn depth_stencil_view(&self) -> d3d12::D3D12_CPU_DESCRIPTOR_HANDLE {
        self.surface.depth_stencil.view()
    }

    pub fn current_back_buffer_index(&self) -> u32 {
        self.surface.swap_chain.current_index()
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.surface.width as f32 / self.surface.height as f32
    }

    pub fn client_size(&self) -> (u32, u32) {
        (self.surface.width, self.surface.height)
    }

    /// Raw command-recording handle for the content collaborator; valid
    /// between `prepare` and `present`.
    pub fn command_list(&self) -> *mut d3d12::ID3D12GraphicsCommandList {
        self.surface.executor.list_ptr()
    }
}

fn viewport(width: u32, height: u32) -> d3d12::D3D12_VIEWPORT {
    d3d12::D3D12_VIEWPORT {
        TopLeftX: 0.0,
        TopLeftY: 0.0,
        Width: width as _,
        Height: height as _,
        MinDepth: d3d12::D3D12_MIN_DEPTH,
        MaxDepth: d3d12::D3D12_MAX_DEPTH,
    }
}

fn scissor(width: u32, height: u32) -> d3d12::D3D12_RECT {
    d3d12::D3D12_RECT {
        left: 0,
        top: 0,
        right: width as _,
        bottom: height as _,
    }
}
