use std::sync::Arc;

use wgpu::{
    Adapter, CompositeAlphaMode, Device, DeviceDescriptor, Features, Instance, Limits,
    PresentMode, Queue, Surface, SurfaceConfiguration, SurfaceTexture, TextureView,
};
use winit::window::Window;

use crate::core::extent::ClientSize;
use crate::error::{SessionError, SessionResult};
use crate::traits::GraphicsContext;

/// Extension names answered by [`GraphicsContext::extension_supported`]
const EXTENSIONS: &[(&str, Features)] = &[
    ("timestamp_query", Features::TIMESTAMP_QUERY),
    (
        "texture_adapter_specific_format_features",
        Features::TEXTURE_ADAPTER_SPECIFIC_FORMAT_FEATURES,
    ),
    ("depth_clip_control", Features::DEPTH_CLIP_CONTROL),
    ("texture_compression_bc", Features::TEXTURE_COMPRESSION_BC),
    ("indirect_first_instance", Features::INDIRECT_FIRST_INSTANCE),
    ("shader_f16", Features::SHADER_F16),
    ("polygon_mode_line", Features::POLYGON_MODE_LINE),
    ("depth32float_stencil8", Features::DEPTH32FLOAT_STENCIL8),
];

/// Look up the device feature behind an extension name
pub fn extension_feature(name: &str) -> Option<Features> {
    EXTENSIONS
        .iter()
        .find(|(known, _)| known.eq_ignore_ascii_case(name))
        .map(|&(_, feature)| feature)
}

/// Present mode for a swap interval: 0 tears, anything else waits for vblank
pub fn present_mode_for_interval(interval: u32) -> PresentMode {
    if interval == 0 {
        PresentMode::AutoNoVsync
    } else {
        PresentMode::AutoVsync
    }
}

struct AcquiredFrame {
    texture: SurfaceTexture,
    view: TextureView,
}

/// wgpu device, queue and window surface for the hardware path
pub struct WgpuContext {
    surface: Option<Surface<'static>>,
    device: Option<Arc<Device>>,
    queue: Option<Arc<Queue>>,
    config: SurfaceConfiguration,
    frame: Option<AcquiredFrame>,
    current: bool,
}

impl WgpuContext {
    /// Create an instance, adapter and device compatible with `window`
    pub fn new(window: Arc<Window>, size: ClientSize) -> SessionResult<Self> {
        let instance = Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });
        let surface = instance
            .create_surface(window)
            .map_err(|e| SessionError::GraphicsContext(e.to_string()))?;

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::default(),
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .map_err(|e| SessionError::GraphicsContext(format!("no suitable adapter: {}", e)))?;

        let (device, queue) = pollster::block_on(Self::request_device(&adapter))?;

        let caps = surface.get_capabilities(&adapter);
        let format = caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or_else(|| caps.formats.first())
            .copied()
            .ok_or_else(|| SessionError::GraphicsContext("surface reports no formats".into()))?;
        let alpha_mode = caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(CompositeAlphaMode::Auto);

        let config = SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: PresentMode::AutoVsync,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };

        log::debug!(
            "wgpu context on {} ({:?}), format {:?}",
            adapter.get_info().name,
            adapter.get_info().backend,
            format
        );

        Ok(Self {
            surface: Some(surface),
            device: Some(Arc::new(device)),
            queue: Some(Arc::new(queue)),
            config,
            frame: None,
            current: false,
        })
    }

    pub fn device(&self) -> Option<&Arc<Device>> {
        self.device.as_ref()
    }

    pub fn queue(&self) -> Option<&Arc<Queue>> {
        self.queue.as_ref()
    }

    pub fn format(&self) -> wgpu::TextureFormat {
        self.config.format
    }

    pub fn present_mode(&self) -> PresentMode {
        self.config.present_mode
    }

    /// Names from the extension table this device supports
    pub fn supported_extensions(&self) -> Vec<&'static str> {
        EXTENSIONS
            .iter()
            .filter(|(name, _)| self.extension_supported(name))
            .map(|&(name, _)| name)
            .collect()
    }

    /// View of this frame's surface texture, acquiring it on first call
    pub fn begin_frame(&mut self) -> Option<&TextureView> {
        if self.frame.is_none() {
            self.frame = self.acquire();
        }
        self.frame.as_ref().map(|frame| &frame.view)
    }

    /// Clear the current frame to `color`
    pub fn clear(&mut self, color: wgpu::Color) -> bool {
        if self.begin_frame().is_none() {
            return false;
        }
        let (Some(device), Some(queue), Some(frame)) = (&self.device, &self.queue, &self.frame) else {
            return false;
        };

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Clear Encoder"),
        });
        {
            let _pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Clear Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &frame.view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(color),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
        }
        queue.submit(Some(encoder.finish()));
        true
    }

    fn acquire(&mut self) -> Option<AcquiredFrame> {
        let surface = self.surface.as_ref()?;
        let texture = match surface.get_current_texture() {
            Ok(texture) => texture,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                log::warn!("surface lost, reconfiguring");
                self.configure();
                self.surface.as_ref()?.get_current_texture().ok()?
            }
            Err(e) => {
                log::warn!("failed to acquire surface texture: {}", e);
                return None;
            }
        };
        let view = texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        Some(AcquiredFrame { texture, view })
    }

    fn configure(&self) {
        if let (Some(surface), Some(device)) = (&self.surface, &self.device) {
            surface.configure(device, &self.config);
        }
    }

    async fn request_device(adapter: &Adapter) -> SessionResult<(Device, Queue)> {
        let supported = adapter.features();
        // Ask for every named extension the adapter offers
        let requested = EXTENSIONS
            .iter()
            .map(|&(_, feature)| feature)
            .filter(|feature| supported.contains(*feature))
            .fold(Features::empty(), |acc, feature| acc | feature);

        adapter
            .request_device(&DeviceDescriptor {
                label: Some("Window Context Device"),
                required_features: requested,
                required_limits: Limits::default().using_resolution(adapter.limits()),
                memory_hints: Default::default(),
                experimental_features: Default::default(),
                trace: Default::default(),
            })
            .await
            .map_err(|e| SessionError::GraphicsContext(format!("failed to create device: {}", e)))
    }
}

impl GraphicsContext for WgpuContext {
    fn make_current(&mut self, size: ClientSize) -> bool {
        if self.device.is_none() || self.surface.is_none() {
            return false;
        }
        if !size.is_empty() {
            self.config.width = size.width;
            self.config.height = size.height;
        }
        self.frame = None;
        self.configure();
        self.current = true;
        true
    }

    fn is_current(&self) -> bool {
        self.current
    }

    fn swap_buffers(&mut self, interval: u32) -> bool {
        if !self.current {
            return false;
        }
        // Nothing drawn this frame: present a cleared one
        if self.frame.is_none() && !self.clear(wgpu::Color::BLACK) {
            return false;
        }
        let Some(frame) = self.frame.take() else {
            return false;
        };
        frame.texture.present();

        let mode = present_mode_for_interval(interval);
        if mode != self.config.present_mode {
            log::debug!("present mode {:?} -> {:?}", self.config.present_mode, mode);
            self.config.present_mode = mode;
            self.configure();
        }
        true
    }

    fn extension_supported(&self, name: &str) -> bool {
        match (extension_feature(name), &self.device) {
            (Some(feature), Some(device)) => device.features().contains(feature),
            _ => false,
        }
    }

    fn resize(&mut self, size: ClientSize) {
        if size.is_empty() {
            return;
        }
        self.frame = None;
        self.config.width = size.width;
        self.config.height = size.height;
        self.configure();
    }

    fn detach(&mut self) {
        self.current = false;
        self.frame = None;
        self.queue = None;
        self.device = None;
    }

    fn release_surface(&mut self) {
        self.frame = None;
        self.surface = None;
    }
}

impl Drop for WgpuContext {
    fn drop(&mut self) {
        self.detach();
        self.release_surface();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_lookup_is_case_insensitive() {
        assert_eq!(extension_feature("timestamp_query"), Some(Features::TIMESTAMP_QUERY));
        assert_eq!(extension_feature("SHADER_F16"), Some(Features::SHADER_F16));
        assert_eq!(extension_feature("WGL_EXT_swap_control"), None);
    }

    #[test]
    fn test_present_mode_mapping() {
        assert_eq!(present_mode_for_interval(0), PresentMode::AutoNoVsync);
        assert_eq!(present_mode_for_interval(1), PresentMode::AutoVsync);
        assert_eq!(present_mode_for_interval(4), PresentMode::AutoVsync);
    }
}
