// VIEW: the overlay's rendering root
pub mod render;
pub mod gpu_init;

pub use render::RenderState;
pub use gpu_init::GpuContext;
