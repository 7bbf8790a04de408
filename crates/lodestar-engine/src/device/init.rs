/// Initialization parameters for the GPU layer.
///
/// The defaults encode the fixed context request of the runtime: 8-bit RGBA
/// color, 32-bit depth, double-buffered vsync presentation.
#[derive(Debug, Clone)]
pub struct GpuInit {
    /// Prefer an sRGB surface format. When `false`, an 8-bit UNORM format is
    /// preferred.
    pub prefer_srgb: bool,

    /// Present mode. FIFO blocks on vertical sync and is always supported.
    pub present_mode: wgpu::PresentMode,

    /// Optional alpha mode; an unsupported value falls back to the first
    /// mode the surface reports.
    pub alpha_mode: Option<wgpu::CompositeAlphaMode>,

    /// Depth buffer format. `None` skips the depth buffer.
    pub depth_format: Option<wgpu::TextureFormat>,

    pub required_features: wgpu::Features,

    pub required_limits: wgpu::Limits,

    /// Frames in flight. `2` is double buffering. This is a hint.
    pub desired_maximum_frame_latency: u32,
}

impl Default for GpuInit {
    fn default() -> Self {
        Self {
            prefer_srgb: false,
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: None,
            depth_format: Some(wgpu::TextureFormat::Depth32Float),
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::default(),
            desired_maximum_frame_latency: 2,
        }
    }
}
