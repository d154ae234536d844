//! GPU-side copies of scene resources.
//!
//! Geometry, materials and textures are uploaded once and keyed by their
//! asset `Uuid`; per-primitive object blocks and joint palettes are keyed by
//! scene keys and rewritten every frame.

use std::sync::Arc;

use glam::Mat4;
use rustc_hash::FxHashMap;
use uuid::Uuid;
use wgpu::util::DeviceExt;

use crate::renderer::pipelines::{MaterialUniforms, ObjectUniforms, ScenePipelines};
use crate::resources::geometry::Geometry;
use crate::resources::material::{Material, TextureData};
use crate::scene::{ModelKey, SkeletonKey};

pub struct GpuGeometry {
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub index_count: u32,
}

pub struct GpuMaterial {
    pub bind_group: wgpu::BindGroup,
    pub blended: bool,
}

pub struct GpuObject {
    pub uniforms: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
    /// Joint buffer the bind group was built against.
    joint_buffer_id: Option<SkeletonKey>,
}

struct JointBuffer {
    buffer: wgpu::Buffer,
    capacity: usize,
}

/// Upload cache owned by the renderer.
pub struct GpuResources {
    geometries: FxHashMap<Uuid, GpuGeometry>,
    materials: FxHashMap<Uuid, GpuMaterial>,
    textures: FxHashMap<Uuid, wgpu::TextureView>,
    objects: FxHashMap<(ModelKey, usize), GpuObject>,
    joints: FxHashMap<SkeletonKey, JointBuffer>,

    sampler: wgpu::Sampler,
    white_texture: wgpu::TextureView,
    /// Bound in place of a palette for unskinned primitives.
    identity_joints: wgpu::Buffer,
}

impl GpuResources {
    pub fn new(device: &wgpu::Device, queue: &wgpu::Queue) -> Self {
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Base Color Sampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        let white = TextureData::new(Some("white".to_string()), 1, 1, vec![255; 4]);
        let white_texture = upload_texture(device, queue, &white);

        let identity_joints = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Identity Joints"),
            contents: bytemuck::cast_slice(&[Mat4::IDENTITY.to_cols_array()]),
            usage: wgpu::BufferUsages::STORAGE,
        });

        Self {
            geometries: FxHashMap::default(),
            materials: FxHashMap::default(),
            textures: FxHashMap::default(),
            objects: FxHashMap::default(),
            joints: FxHashMap::default(),
            sampler,
            white_texture,
            identity_joints,
        }
    }

    pub fn geometry(&mut self, device: &wgpu::Device, geometry: &Geometry) -> &GpuGeometry {
        self.geometries.entry(geometry.id).or_insert_with(|| {
            log::debug!("Uploading geometry {} ({} vertices)", geometry.id, geometry.vertices.len());
            GpuGeometry {
                vertex_buffer: device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("Vertex Buffer"),
                    contents: bytemuck::cast_slice(&geometry.vertices),
                    usage: wgpu::BufferUsages::VERTEX,
                }),
                index_buffer: device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("Index Buffer"),
                    contents: bytemuck::cast_slice(&geometry.indices),
                    usage: wgpu::BufferUsages::INDEX,
                }),
                index_count: geometry.index_count(),
            }
        })
    }

    pub fn material(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        pipelines: &ScenePipelines,
        material: &Arc<Material>,
    ) -> &GpuMaterial {
        if !self.materials.contains_key(&material.id) {
            let view = match &material.base_color_map {
                Some(texture) => {
                    let view = self
                        .textures
                        .entry(texture.id)
                        .or_insert_with(|| upload_texture(device, queue, texture));
                    view.clone()
                }
                None => self.white_texture.clone(),
            };

            let uniforms = MaterialUniforms::from(material.as_ref());
            let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Material Uniforms"),
                contents: bytemuck::bytes_of(&uniforms),
                usage: wgpu::BufferUsages::UNIFORM,
            });

            let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some(material.name.as_str()),
                layout: &pipelines.material_layout,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: buffer.as_entire_binding(),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: wgpu::BindingResource::TextureView(&view),
                    },
                    wgpu::BindGroupEntry {
                        binding: 2,
                        resource: wgpu::BindingResource::Sampler(&self.sampler),
                    },
                ],
            });

            self.materials.insert(
                material.id,
                GpuMaterial {
                    bind_group,
                    blended: uniforms.alpha_mode == 2,
                },
            );
        }
        &self.materials[&material.id]
    }

    /// Writes a skeleton's joint palette, growing the buffer when needed.
    pub fn write_joints(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        key: SkeletonKey,
        matrices: &[Mat4],
    ) {
        let needed = matrices.len().max(1);
        let stale = self.joints.get(&key).is_none_or(|j| j.capacity < needed);
        if stale {
            let buffer = device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("Joint Matrices"),
                size: (needed * std::mem::size_of::<Mat4>()) as wgpu::BufferAddress,
                usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            });
            self.joints.insert(
                key,
                JointBuffer {
                    buffer,
                    capacity: needed,
                },
            );
            // Objects bound to the old buffer rebuild on next use.
            self.objects.retain(|_, o| o.joint_buffer_id != Some(key));
        }
        if let Some(joints) = self.joints.get(&key)
            && !matrices.is_empty()
        {
            queue.write_buffer(&joints.buffer, 0, bytemuck::cast_slice(matrices));
        }
    }

    pub fn object(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        pipelines: &ScenePipelines,
        key: (ModelKey, usize),
        skeleton: Option<SkeletonKey>,
        uniforms: &ObjectUniforms,
    ) -> &GpuObject {
        let joint_buffer = skeleton
            .and_then(|k| self.joints.get(&k))
            .map_or(&self.identity_joints, |j| &j.buffer);
        let bound_to = skeleton.filter(|k| self.joints.contains_key(k));

        let object = self.objects.entry(key).or_insert_with(|| {
            let buffer = device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("Object Uniforms"),
                size: std::mem::size_of::<ObjectUniforms>() as wgpu::BufferAddress,
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            });
            let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("Object BindGroup"),
                layout: &pipelines.object_layout,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: buffer.as_entire_binding(),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: joint_buffer.as_entire_binding(),
                    },
                ],
            });
            GpuObject {
                uniforms: buffer,
                bind_group,
                joint_buffer_id: bound_to,
            }
        });
        queue.write_buffer(&object.uniforms, 0, bytemuck::bytes_of(uniforms));
        object
    }

    #[must_use]
    pub fn get_geometry(&self, id: &Uuid) -> Option<&GpuGeometry> {
        self.geometries.get(id)
    }

    #[must_use]
    pub fn get_material(&self, id: &Uuid) -> Option<&GpuMaterial> {
        self.materials.get(id)
    }

    #[must_use]
    pub fn get_object(&self, key: &(ModelKey, usize)) -> Option<&GpuObject> {
        self.objects.get(key)
    }

    /// Drops per-model entries for models no longer in the scene.
    pub fn retain_models(&mut self, alive: impl Fn(ModelKey) -> bool) {
        self.objects.retain(|(model, _), _| alive(*model));
    }

    pub fn retain_skeletons(&mut self, alive: impl Fn(SkeletonKey) -> bool) {
        self.joints.retain(|key, _| alive(*key));
    }
}

fn upload_texture(device: &wgpu::Device, queue: &wgpu::Queue, data: &TextureData) -> wgpu::TextureView {
    let size = wgpu::Extent3d {
        width: data.width.max(1),
        height: data.height.max(1),
        depth_or_array_layers: 1,
    };
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: data.name.as_deref(),
        size,
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: wgpu::TextureFormat::Rgba8UnormSrgb,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    });
    queue.write_texture(
        wgpu::TexelCopyTextureInfo {
            texture: &texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        &data.rgba,
        wgpu::TexelCopyBufferLayout {
            offset: 0,
            bytes_per_row: Some(4 * size.width),
            rows_per_image: Some(size.height),
        },
        size,
    );
    texture.create_view(&wgpu::TextureViewDescriptor::default())
}
