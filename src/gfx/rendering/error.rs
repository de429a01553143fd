use thiserror::Error;

/// Failures while setting up or driving the GPU
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to create a surface for the window: {0}")]
    CreateSurface(#[from] wgpu::CreateSurfaceError),
    #[error("no compatible GPU adapter: {0}")]
    RequestAdapter(#[from] wgpu::RequestAdapterError),
    #[error("failed to open the GPU device: {0}")]
    RequestDevice(#[from] wgpu::RequestDeviceError),
    #[error("the surface supports no texture formats on this adapter")]
    NoSurfaceFormat,
    #[error("no pipeline registered as '{0}'")]
    UnknownPipeline(String),
    #[error("pipeline '{pipeline}' needs shader '{shader}', which is not loaded")]
    MissingShader { pipeline: String, shader: String },
    #[error("the GPU ran out of memory while acquiring a frame")]
    OutOfMemory,
}
