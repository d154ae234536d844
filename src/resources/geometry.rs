use bytemuck::{Pod, Zeroable};
use uuid::Uuid;

/// Interleaved vertex layout shared by every mesh primitive.
///
/// Unskinned vertices carry zero weights; the shader then falls back to the
/// node's model matrix.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
    pub joints: [u32; 4],
    pub weights: [f32; 4],
}

impl Vertex {
    pub const ATTRIBUTES: [wgpu::VertexAttribute; 5] = wgpu::vertex_attr_array![
        0 => Float32x3,
        1 => Float32x3,
        2 => Float32x2,
        3 => Uint32x4,
        4 => Float32x4,
    ];

    #[must_use]
    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Self>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

/// CPU-side triangle geometry.
///
/// The renderer uploads it once, keyed by `id`.
#[derive(Debug, Clone)]
pub struct Geometry {
    pub id: Uuid,
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

impl Geometry {
    #[must_use]
    pub fn new(vertices: Vec<Vertex>, indices: Vec<u32>) -> Self {
        Self {
            id: Uuid::new_v4(),
            vertices,
            indices,
        }
    }

    #[inline]
    #[must_use]
    pub fn is_skinned(&self) -> bool {
        self.vertices
            .iter()
            .any(|v| v.weights.iter().any(|&w| w > 0.0))
    }

    #[inline]
    #[must_use]
    pub fn index_count(&self) -> u32 {
        self.indices.len() as u32
    }
}
