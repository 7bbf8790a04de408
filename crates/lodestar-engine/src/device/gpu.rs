use anyhow::{Context, Result};
use wgpu::util::DeviceExt;
use wgpu::SurfaceError;
use winit::dpi::PhysicalSize;

use crate::render::{RenderCtx, RenderTarget};

use super::surface::{self, SurfaceErrorAction};
use super::{Diagnostics, DiagnosticsError, GpuErrorRecord, GpuInit};

/// One acquired swapchain image plus the encoder recording into it.
///
/// Hand it back through [`Gpu::submit`] promptly; the next image cannot be
/// acquired while it is alive.
pub struct GpuFrame {
    pub surface_texture: wgpu::SurfaceTexture,
    pub view: wgpu::TextureView,
    pub encoder: wgpu::CommandEncoder,
}

/// Owns the wgpu objects behind one window.
///
/// - creates and stores Adapter/Device/Queue
/// - creates and configures the Surface (swapchain) and the depth buffer
/// - acquires frames, clears them and presents them
/// - routes device errors into [`Diagnostics`]
pub struct Gpu<'w> {
    surface: wgpu::Surface<'w>,
    adapter: wgpu::Adapter,
    device: wgpu::Device,
    queue: wgpu::Queue,

    config: wgpu::SurfaceConfiguration,

    /// Current drawable size in physical pixels.
    size: PhysicalSize<u32>,

    depth_format: Option<wgpu::TextureFormat>,
    depth_view: Option<wgpu::TextureView>,

    diagnostics: Diagnostics,
}

impl<'w> Gpu<'w> {
    /// Creates a GPU context for a window surface.
    ///
    /// Adapter/device acquisition is asynchronous under wgpu; callers block
    /// on it with `pollster`.
    pub async fn new(
        target: impl Into<wgpu::SurfaceTarget<'w>>,
        size: PhysicalSize<u32>,
        init: GpuInit,
        diagnostics: Diagnostics,
    ) -> Result<Self> {
        anyhow::ensure!(size.width > 0 && size.height > 0, "window has zero size");

        let GpuInit {
            prefer_srgb,
            present_mode,
            alpha_mode,
            depth_format,
            required_features,
            required_limits,
            desired_maximum_frame_latency,
        } = init;

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance
            .create_surface(target)
            .context("failed to create wgpu surface")?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .context("failed to find a suitable GPU adapter")?;

        let info = adapter.get_info();
        log::info!("GPU adapter: {} ({:?})", info.name, info.backend);

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("lodestar device"),
                required_features,
                required_limits,
                experimental_features: wgpu::ExperimentalFeatures::disabled(),
                memory_hints: wgpu::MemoryHints::Performance,
                trace: wgpu::Trace::Off,
            })
            .await
            .context("failed to create wgpu device/queue")?;

        diagnostics.install(&device);

        let surface_caps = surface.get_capabilities(&adapter);
        let format = surface::choose_surface_format(&surface_caps, prefer_srgb)
            .context("no supported surface formats")?;
        let alpha_mode = match alpha_mode {
            Some(mode) if surface_caps.alpha_modes.contains(&mode) => mode,
            _ => surface_caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
        };

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width,
            height: size.height,
            present_mode,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency,
        };

        surface.configure(&device, &config);
        diagnostics.check("surface configure")?;

        let depth_view = depth_format.map(|f| surface::create_depth_view(&device, f, size));
        diagnostics.check("depth buffer creation")?;

        log::debug!("surface configured: {format:?} {}x{}", size.width, size.height);

        Ok(Self {
            surface,
            adapter,
            device,
            queue,
            config,
            size,
            depth_format,
            depth_view,
            diagnostics,
        })
    }

    pub fn adapter_info(&self) -> wgpu::AdapterInfo {
        self.adapter.get_info()
    }

    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.config.format
    }

    pub fn depth_format(&self) -> Option<wgpu::TextureFormat> {
        self.depth_format
    }

    /// Current drawable size (physical pixels).
    pub fn size(&self) -> PhysicalSize<u32> {
        self.size
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// Reconfigures the surface and depth buffer after a resize.
    ///
    /// A 0x0 size (minimized window) only records the size.
    pub fn resize(&mut self, new_size: PhysicalSize<u32>) -> Result<(), DiagnosticsError> {
        let reconfigured = surface::apply_resize(
            &self.surface,
            &self.device,
            &mut self.config,
            &mut self.size,
            new_size,
        );

        if reconfigured {
            if let Some(format) = self.depth_format {
                self.depth_view = Some(surface::create_depth_view(&self.device, format, new_size));
            }
        }

        self.diagnostics.check("surface resize")
    }

    /// Uploads `contents` into a new vertex buffer.
    pub fn create_vertex_buffer(
        &self,
        label: &str,
        contents: &[u8],
    ) -> Result<wgpu::Buffer, DiagnosticsError> {
        let buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(label),
                contents,
                usage: wgpu::BufferUsages::VERTEX,
            });
        self.diagnostics.check(label)?;
        Ok(buffer)
    }

    /// Acquires the next surface texture and creates an encoder.
    pub fn begin_frame(&self) -> std::result::Result<GpuFrame, SurfaceError> {
        let surface_texture = self.surface.get_current_texture()?;
        let view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("lodestar frame encoder"),
            });

        Ok(GpuFrame {
            surface_texture,
            view,
            encoder,
        })
    }

    /// Submits the recorded commands and presents the frame.
    ///
    /// With FIFO presentation this may block for up to one vsync interval.
    pub fn submit(&self, frame: GpuFrame) {
        self.queue.submit(std::iter::once(frame.encoder.finish()));
        drop(frame.view);
        frame.surface_texture.present();
    }

    /// Clears color and depth, lets `draw` record passes, then presents.
    ///
    /// A transient surface error skips the frame; an unrecoverable one is
    /// returned as an error.
    pub fn present<F>(&mut self, clear: wgpu::Color, draw: F) -> Result<()>
    where
        F: FnOnce(&RenderCtx<'_>, &mut RenderTarget<'_>),
    {
        let mut frame = match self.begin_frame() {
            Ok(f) => f,
            Err(err) => {
                return match self.handle_surface_error(&err) {
                    SurfaceErrorAction::Fatal => {
                        self.diagnostics.check("surface acquire")?;
                        Err(anyhow::anyhow!("surface acquisition failed: {err}"))
                    }
                    action => {
                        log::debug!("frame skipped ({action:?}): {err}");
                        Ok(())
                    }
                };
            }
        };

        // Clear pass. Dropped before the encoder is lent to `draw`.
        {
            let depth_stencil_attachment =
                self.depth_view
                    .as_ref()
                    .map(|view| wgpu::RenderPassDepthStencilAttachment {
                        view,
                        depth_ops: Some(wgpu::Operations {
                            load: wgpu::LoadOp::Clear(1.0),
                            store: wgpu::StoreOp::Store,
                        }),
                        stencil_ops: None,
                    });

            let _rpass = frame.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("lodestar clear"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &frame.view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(clear),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });
        }

        {
            let rctx = RenderCtx::new(
                &self.device,
                &self.queue,
                self.config.format,
                (self.size.width, self.size.height),
            );
            let mut target =
                RenderTarget::new(&mut frame.encoder, &frame.view, self.depth_view.as_ref());
            draw(&rctx, &mut target);
        }

        self.submit(frame);
        self.diagnostics.check("frame submit")?;
        Ok(())
    }

    /// Reacts to a failed acquisition and tells the caller what to do with the frame.
    ///
    /// Lost surfaces are configured again (unless minimized); a fatal error is
    /// queued on the diagnostics gate.
    pub fn handle_surface_error(&mut self, err: &SurfaceError) -> SurfaceErrorAction {
        let action = SurfaceErrorAction::classify(err);
        match action {
            SurfaceErrorAction::Reconfigured => {
                if self.size.width > 0 && self.size.height > 0 {
                    self.surface.configure(&self.device, &self.config);
                }
            }
            SurfaceErrorAction::Fatal => self.diagnostics.report(GpuErrorRecord::from(err)),
            SurfaceErrorAction::SkipFrame => {}
        }
        action
    }
}
