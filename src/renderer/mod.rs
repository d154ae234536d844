//! Rendering
//!
//! A single forward pass: clear to the scene background, draw the grid,
//! draw every model primitive (opaque first, then blended), then run the
//! overlay nodes (the GUI) on top of the same surface texture.
//!
//! [`Renderer`] is created empty and becomes usable once
//! [`init`](Renderer::init) has attached it to a window.

pub mod context;
pub mod gpu_model;
pub mod pipelines;
pub mod settings;
pub mod surface;

use raw_window_handle::{HasDisplayHandle, HasWindowHandle};
use wgpu::util::DeviceExt;

use crate::errors::Result;
use crate::scene::{Camera, ModelKey, Scene};

use self::context::WgpuContext;
use self::gpu_model::GpuResources;
use self::pipelines::{FrameUniforms, ObjectUniforms, ScenePipelines};

pub use self::settings::RenderSettings;
pub use self::surface::{
    ExecuteContext, FrameRenderer, OutputSurface, PrepareContext, RenderNode, Viewport,
};

struct RendererState {
    wgpu_ctx: WgpuContext,
    pipelines: ScenePipelines,
    resources: GpuResources,

    frame_buffer: wgpu::Buffer,
    frame_bind_group: wgpu::BindGroup,

    grid: Option<(wgpu::Buffer, u32)>,
}

struct DrawItem {
    key: (ModelKey, usize),
    geometry: uuid::Uuid,
    material: uuid::Uuid,
    blended: bool,
}

pub struct Renderer {
    settings: RenderSettings,
    state: Option<RendererState>,
    draws: Vec<DrawItem>,
}

impl Renderer {
    #[must_use]
    pub fn new(settings: RenderSettings) -> Self {
        Self {
            settings,
            state: None,
            draws: Vec::new(),
        }
    }

    /// Creates the device and surface for `window` at a physical size.
    pub async fn init<W>(&mut self, window: W, width: u32, height: u32) -> Result<()>
    where
        W: HasWindowHandle + HasDisplayHandle + Send + Sync + 'static,
    {
        if self.state.is_some() {
            return Ok(());
        }

        let wgpu_ctx = WgpuContext::new(window, &self.settings, width, height).await?;
        let pipelines = ScenePipelines::new(
            &wgpu_ctx.device,
            wgpu_ctx.color_format(),
            wgpu_ctx.depth_format,
        );
        let resources = GpuResources::new(&wgpu_ctx.device, &wgpu_ctx.queue);

        let frame_buffer = wgpu_ctx.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Frame Uniforms"),
            size: std::mem::size_of::<FrameUniforms>() as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let frame_bind_group = wgpu_ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Frame BindGroup"),
            layout: &pipelines.frame_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: frame_buffer.as_entire_binding(),
            }],
        });

        log::info!(
            "Renderer ready: {:?} {}x{}",
            wgpu_ctx.color_format(),
            width,
            height
        );

        self.state = Some(RendererState {
            wgpu_ctx,
            pipelines,
            resources,
            frame_buffer,
            frame_bind_group,
            grid: None,
        });
        Ok(())
    }

    #[inline]
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.state.is_some()
    }

    #[must_use]
    pub fn settings(&self) -> &RenderSettings {
        &self.settings
    }

    pub fn device(&self) -> Option<&wgpu::Device> {
        self.state.as_ref().map(|s| &s.wgpu_ctx.device)
    }

    pub fn queue(&self) -> Option<&wgpu::Queue> {
        self.state.as_ref().map(|s| &s.wgpu_ctx.queue)
    }

    pub fn color_format(&self) -> Option<wgpu::TextureFormat> {
        self.state.as_ref().map(|s| s.wgpu_ctx.color_format())
    }

    /// Current drawing-buffer size in physical pixels.
    pub fn size(&self) -> Option<(u32, u32)> {
        self.state.as_ref().map(|s| s.wgpu_ctx.size())
    }
}

impl RendererState {
    fn upload(&mut self, scene: &Scene, camera: &Camera, draws: &mut Vec<DrawItem>) {
        let device = &self.wgpu_ctx.device;
        let queue = &self.wgpu_ctx.queue;

        let frame = FrameUniforms::new(scene, camera.view_projection_matrix());
        queue.write_buffer(&self.frame_buffer, 0, bytemuck::bytes_of(&frame));

        if self.grid.is_none()
            && let Some(grid) = &scene.grid
        {
            let vertices = grid.vertices();
            let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Grid Vertices"),
                contents: bytemuck::cast_slice(&vertices),
                usage: wgpu::BufferUsages::VERTEX,
            });
            self.grid = Some((buffer, vertices.len() as u32));
        }

        self.resources
            .retain_skeletons(|key| scene.skeletons.contains_key(key));
        self.resources.retain_models(|key| scene.models.contains_key(key));

        for (key, skeleton) in &scene.skeletons {
            self.resources
                .write_joints(device, queue, key, skeleton.joint_matrices());
        }

        draws.clear();
        for (model_key, model) in &scene.models {
            for (index, primitive) in model.primitives.iter().enumerate() {
                let Some(node) = scene.get_node(primitive.node) else {
                    continue;
                };
                if !node.visible {
                    continue;
                }

                let skinned = primitive.skeleton.is_some() && primitive.geometry.is_skinned();
                let model_matrix = if skinned {
                    glam::Mat4::IDENTITY
                } else {
                    glam::Mat4::from(*node.world_matrix())
                };

                self.resources.geometry(device, &primitive.geometry);
                let blended = self
                    .resources
                    .material(device, queue, &self.pipelines, &primitive.material)
                    .blended;
                self.resources.object(
                    device,
                    queue,
                    &self.pipelines,
                    (model_key, index),
                    primitive.skeleton.filter(|_| skinned),
                    &ObjectUniforms::new(model_matrix, skinned),
                );

                draws.push(DrawItem {
                    key: (model_key, index),
                    geometry: primitive.geometry.id,
                    material: primitive.material.id,
                    blended,
                });
            }
        }
        // Opaque first; the sort is stable so primitive order is kept.
        draws.sort_by_key(|d| d.blended);
    }

    fn draw_scene(
        &self,
        scene: &Scene,
        draws: &[DrawItem],
        view: &wgpu::TextureView,
        encoder: &mut wgpu::CommandEncoder,
    ) {
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Scene Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(scene.background.to_wgpu_linear()),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &self.wgpu_ctx.depth_texture_view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        pass.set_bind_group(0, &self.frame_bind_group, &[]);

        if let Some((buffer, count)) = &self.grid
            && scene.grid.is_some()
        {
            pass.set_pipeline(&self.pipelines.lines);
            pass.set_vertex_buffer(0, buffer.slice(..));
            pass.draw(0..*count, 0..1);
        }

        let mut blended_pipeline = false;
        pass.set_pipeline(&self.pipelines.opaque);
        for draw in draws {
            let (Some(geometry), Some(material), Some(object)) = (
                self.resources.get_geometry(&draw.geometry),
                self.resources.get_material(&draw.material),
                self.resources.get_object(&draw.key),
            ) else {
                continue;
            };

            if draw.blended && !blended_pipeline {
                pass.set_pipeline(&self.pipelines.transparent);
                blended_pipeline = true;
            }

            pass.set_bind_group(1, &object.bind_group, &[]);
            pass.set_bind_group(2, &material.bind_group, &[]);
            pass.set_vertex_buffer(0, geometry.vertex_buffer.slice(..));
            pass.set_index_buffer(geometry.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
            pass.draw_indexed(0..geometry.index_count, 0, 0..1);
        }
    }
}

impl FrameRenderer for Renderer {
    fn render(&mut self, scene: &Scene, camera: &Camera, overlays: &mut [&mut dyn RenderNode]) {
        let Some(state) = self.state.as_mut() else {
            return;
        };

        let output = match state.wgpu_ctx.surface.get_current_texture() {
            wgpu::CurrentSurfaceTexture::Success(output)
            | wgpu::CurrentSurfaceTexture::Suboptimal(output) => output,
            wgpu::CurrentSurfaceTexture::Lost | wgpu::CurrentSurfaceTexture::Outdated => {
                let (width, height) = state.wgpu_ctx.size();
                state.wgpu_ctx.resize(width, height);
                return;
            }
            wgpu::CurrentSurfaceTexture::Timeout | wgpu::CurrentSurfaceTexture::Occluded => return,
            wgpu::CurrentSurfaceTexture::Validation => {
                log::error!("Render error: surface texture acquisition failed validation");
                return;
            }
        };
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        state.upload(scene, camera, &mut self.draws);

        let mut prepare_ctx = PrepareContext {
            device: &state.wgpu_ctx.device,
            queue: &state.wgpu_ctx.queue,
            size: state.wgpu_ctx.size(),
        };
        for overlay in overlays.iter_mut() {
            overlay.prepare(&mut prepare_ctx);
        }

        let mut encoder = state
            .wgpu_ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Frame Encoder"),
            });

        state.draw_scene(scene, &self.draws, &view, &mut encoder);

        let execute_ctx = ExecuteContext { surface_view: &view };
        for overlay in overlays.iter() {
            overlay.run(&execute_ctx, &mut encoder);
        }

        state.wgpu_ctx.queue.submit(std::iter::once(encoder.finish()));
        output.present();
    }
}

impl OutputSurface for Renderer {
    fn resize(&mut self, width: u32, height: u32) {
        if let Some(state) = self.state.as_mut() {
            state.wgpu_ctx.resize(width, height);
        }
    }
}
