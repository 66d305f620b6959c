pub(crate) mod com;
pub(crate) mod descriptor;
pub(crate) mod dxgi;

pub mod command;
pub mod depth;
pub mod device;
pub mod renderer;
pub mod swapchain;
pub mod sync;
