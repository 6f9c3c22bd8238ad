use crate::config::VisualizerConfig;
use crate::geometry::WireMesh;
use crate::session::SceneUniforms;
use glam::Mat4;
use web_sys as web;

mod helpers;
mod post;
mod sphere;
mod targets;

use post::{PostBindGroups, PostResources};
use sphere::{SphereResources, SphereUniforms};
use targets::RenderTargets;

// Shaders bundled as string constants
pub static SPHERE_WGSL: &str = include_str!("../../shaders/sphere.wgsl");
pub static POST_WGSL: &str = include_str!("../../shaders/post.wgsl");

/// Pick the embedded shader text when present, otherwise the bundled one.
pub fn sphere_shader_or_default(embedded: &str) -> &str {
    if embedded.trim().is_empty() {
        SPHERE_WGSL
    } else {
        embedded
    }
}

/// Build the sphere pipeline, falling back to the bundled shader when the
/// embedded one fails validation.
async fn build_sphere(
    device: &wgpu::Device,
    mesh: &WireMesh,
    shader: &str,
) -> anyhow::Result<SphereResources> {
    device.push_error_scope(wgpu::ErrorFilter::Validation);
    let sphere = SphereResources::new(device, mesh, shader);
    let Some(err) = device.pop_error_scope().await else {
        return Ok(sphere);
    };
    if shader == SPHERE_WGSL {
        return Err(anyhow::anyhow!("bundled sphere shader rejected: {}", err));
    }
    log::warn!("[gpu] embedded sphere shader rejected, using bundled one: {}", err);
    device.push_error_scope(wgpu::ErrorFilter::Validation);
    let sphere = SphereResources::new(device, mesh, SPHERE_WGSL);
    match device.pop_error_scope().await {
        Some(err) => Err(anyhow::anyhow!("bundled sphere shader rejected: {}", err)),
        None => Ok(sphere),
    }
}

pub struct GpuState {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    view_format: wgpu::TextureFormat,
    sphere: SphereResources,
    targets: RenderTargets,
    post: PostResources,
    post_groups: PostBindGroups,
    clear_color: wgpu::Color,
}

impl GpuState {
    pub async fn new(
        canvas: &web::HtmlCanvasElement,
        settings: &VisualizerConfig,
        mesh: &WireMesh,
        sphere_shader: &str,
    ) -> anyhow::Result<Self> {
        let width = canvas.width().max(1);
        let height = canvas.height().max(1);

        let instance = wgpu::Instance::default();
        let surface = instance.create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone()))?;
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or_else(|| anyhow::anyhow!("No WebGPU adapter"))?;
        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    required_features: wgpu::Features::empty(),
                    // default limits; older WebGPU impls reject unknown fields
                    required_limits: wgpu::Limits::default(),
                    memory_hints: wgpu::MemoryHints::Performance,
                    label: None,
                },
                None,
            )
            .await
            .map_err(|e| anyhow::anyhow!(format!("request_device error: {:?}", e)))?;
        let caps = surface.get_capabilities(&adapter);
        let format = helpers::pick_surface_format(&caps.formats)
            .ok_or_else(|| anyhow::anyhow!("surface reports no formats"))?;
        let view_format = helpers::output_view_format(format);
        let alpha_mode = caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width,
            height,
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode,
            view_formats: if view_format == format {
                vec![]
            } else {
                vec![view_format]
            },
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);
        log::info!(
            "[gpu] surface {}x{} format={:?} view={:?}",
            width,
            height,
            format,
            view_format
        );

        let sphere = build_sphere(&device, mesh, sphere_shader).await?;
        let targets = RenderTargets::new(&device, width, height);
        let post = PostResources::new(&device, view_format, settings.bloom);
        post.write_uniforms(&queue, targets.bloom_size());
        let post_groups = post.bind_groups(&device, &targets);

        let [r, g, b] = settings.clear_color;
        Ok(Self {
            surface,
            device,
            queue,
            config,
            view_format,
            sphere,
            targets,
            post,
            post_groups,
            clear_color: wgpu::Color {
                r: r as f64,
                g: g as f64,
                b: b as f64,
                a: 1.0,
            },
        })
    }

    /// Surface size and post-processing size, which always move together.
    pub fn sizes(&self) -> ((u32, u32), (u32, u32)) {
        ((self.config.width, self.config.height), self.targets.size())
    }

    /// Resize the swapchain and every offscreen buffer in one step.
    /// Returns false for zero sizes or when nothing changed.
    pub fn resize_if_needed(&mut self, width: u32, height: u32) -> bool {
        if width == 0 || height == 0 {
            return false;
        }
        if width == self.config.width && height == self.config.height {
            return false;
        }
        self.config.width = width;
        self.config.height = height;
        self.surface.configure(&self.device, &self.config);

        self.targets.recreate(&self.device, width, height);
        self.post.write_uniforms(&self.queue, self.targets.bloom_size());
        self.post_groups = self.post.bind_groups(&self.device, &self.targets);
        true
    }

    pub fn reconfigure(&mut self) {
        self.surface.configure(&self.device, &self.config);
    }

    pub fn render(
        &mut self,
        view_proj: Mat4,
        scene: &SceneUniforms,
    ) -> Result<(), wgpu::SurfaceError> {
        let frame = self.surface.get_current_texture()?;
        let view = frame.texture.create_view(&wgpu::TextureViewDescriptor {
            format: Some(self.view_format),
            ..Default::default()
        });
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("encoder"),
            });

        self.sphere
            .write_uniforms(&self.queue, &SphereUniforms::new(view_proj, scene));
        {
            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("scene_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &self.targets.hdr_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear_color),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.targets.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            self.sphere.draw(&mut rpass);
        }

        self.post
            .encode(&mut encoder, &self.targets, &self.post_groups, &view);

        self.queue.submit(Some(encoder.finish()));
        frame.present();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom;
    use crate::session::Viewport;
    use wasm_bindgen_test::*;

    async fn gpu_on(canvas: &web::HtmlCanvasElement, shader: &str) -> anyhow::Result<GpuState> {
        let mesh = crate::geometry::icosahedron(4.0, 1);
        GpuState::new(canvas, &VisualizerConfig::default(), &mesh, shader).await
    }

    /// Canvas plus a working `GpuState`, or `None` when the runner has no WebGPU adapter.
    async fn test_gpu(id: &str) -> Option<(dom::AttachedCanvas, GpuState)> {
        if !wgpu::util::is_browser_webgpu_supported().await {
            return None;
        }
        let (_, document) = dom::window_document().ok()?;
        let attached = dom::attach_canvas(&document, id, Viewport::new(64, 48)).ok()?;
        let gpu = gpu_on(attached.canvas(), SPHERE_WGSL).await.ok()?;
        Some((attached, gpu))
    }

    #[wasm_bindgen_test]
    async fn resize_moves_surface_and_post_buffers_together() {
        let Some((_canvas, mut gpu)) = test_gpu("gpu-resize").await else {
            return;
        };
        assert_eq!(gpu.sizes(), ((64, 48), (64, 48)));

        assert!(gpu.resize_if_needed(301, 199));
        assert_eq!(gpu.sizes(), ((301, 199), (301, 199)));
        assert_eq!(gpu.targets.bloom_size(), (150, 99));

        assert!(!gpu.resize_if_needed(301, 199));
        assert!(!gpu.resize_if_needed(0, 199));
        assert_eq!(gpu.sizes(), ((301, 199), (301, 199)));
    }

    #[wasm_bindgen_test]
    async fn frames_render_through_srgb_view() {
        let Some((_canvas, mut gpu)) = test_gpu("gpu-srgb").await else {
            return;
        };
        assert!(gpu.view_format.is_srgb() || gpu.config.format == wgpu::TextureFormat::Rgba16Float);
        let scene = crate::session::SceneUniforms {
            time: 0.5,
            frequency: 0.0,
            red: 1.0,
            green: 1.0,
            blue: 1.0,
        };
        assert!(gpu.render(Mat4::IDENTITY, &scene).is_ok());
    }

    #[wasm_bindgen_test]
    async fn broken_embedded_shader_falls_back_to_bundled() {
        let Some((canvas, gpu)) = test_gpu("gpu-fallback").await else {
            return;
        };
        drop(gpu);
        let gpu = gpu_on(canvas.canvas(), "@vertex fn vs_main( {").await;
        assert!(gpu.is_ok());
    }
}
