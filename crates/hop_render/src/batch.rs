//! CPU-side quad batching and the GPU buffers it uploads into.
//!
//! Quads are emitted in draw order. Consecutive quads that sample the same
//! texture collapse into one [`DrawCall`], so a tile row of identical blocks
//! costs a single `draw_indexed`.

use crate::vertex::SpriteVertex;

/// Index into the host's texture table.
pub type TextureKey = u32;

/// One axis-aligned textured quad in world pixels, top-left anchored, y down.
#[derive(Debug, Clone, Copy)]
pub struct QuadSpec {
    pub texture: TextureKey,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    /// `[u0, v0, u1, v1]`. Swapping `u0` and `u1` mirrors horizontally.
    pub uv: [f32; 4],
    pub color: [f32; 4],
}

impl QuadSpec {
    pub const FULL_UV: [f32; 4] = [0.0, 0.0, 1.0, 1.0];
    pub const MIRRORED_UV: [f32; 4] = [1.0, 0.0, 0.0, 1.0];
    pub const WHITE: [f32; 4] = [1.0, 1.0, 1.0, 1.0];

    pub fn textured(texture: TextureKey, x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            texture,
            x,
            y,
            width,
            height,
            uv: Self::FULL_UV,
            color: Self::WHITE,
        }
    }

    pub fn mirrored(mut self, mirrored: bool) -> Self {
        self.uv = if mirrored {
            Self::MIRRORED_UV
        } else {
            Self::FULL_UV
        };
        self
    }
}

/// A contiguous run of indices that share one texture binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawCall {
    pub texture: TextureKey,
    pub index_start: u32,
    pub index_count: u32,
}

#[derive(Debug, Default)]
pub struct SpriteBatch {
    pub vertices: Vec<SpriteVertex>,
    pub indices: Vec<u32>,
    pub draw_calls: Vec<DrawCall>,
}

impl SpriteBatch {
    pub fn with_capacity(quads: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(quads * 4),
            indices: Vec::with_capacity(quads * 6),
            draw_calls: Vec::with_capacity(16),
        }
    }

    pub fn clear(&mut self) {
        self.vertices.clear();
        self.indices.clear();
        self.draw_calls.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn quad_count(&self) -> usize {
        self.vertices.len() / 4
    }

    pub fn push_quad(&mut self, quad: QuadSpec) {
        let [u0, v0, u1, v1] = quad.uv;
        let left = quad.x;
        let right = quad.x + quad.width;
        let top = quad.y;
        let bottom = quad.y + quad.height;
        let base_index = self.vertices.len() as u32;

        self.vertices.extend_from_slice(&[
            SpriteVertex {
                position: [left, top],
                tex_coords: [u0, v0],
                color: quad.color,
            },
            SpriteVertex {
                position: [right, top],
                tex_coords: [u1, v0],
                color: quad.color,
            },
            SpriteVertex {
                position: [right, bottom],
                tex_coords: [u1, v1],
                color: quad.color,
            },
            SpriteVertex {
                position: [left, bottom],
                tex_coords: [u0, v1],
                color: quad.color,
            },
        ]);

        let draw_start = self.indices.len() as u32;
        self.indices.extend_from_slice(&[
            base_index,
            base_index + 1,
            base_index + 2,
            base_index,
            base_index + 2,
            base_index + 3,
        ]);

        self.push_draw_call(quad.texture, draw_start, 6);
    }

    fn push_draw_call(&mut self, texture: TextureKey, index_start: u32, index_count: u32) {
        if let Some(last) = self.draw_calls.last_mut() {
            let contiguous = last.index_start + last.index_count == index_start;
            if last.texture == texture && contiguous {
                last.index_count += index_count;
                return;
            }
        }
        self.draw_calls.push(DrawCall {
            texture,
            index_start,
            index_count,
        });
    }
}

/// Vertex and index buffers that grow to the next power of two on demand.
pub struct GpuMesh {
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    vertex_capacity: usize,
    index_capacity: usize,
}

impl GpuMesh {
    pub fn new(device: &wgpu::Device, quad_capacity: usize) -> Self {
        let vertex_capacity = (quad_capacity * 4).max(1).next_power_of_two();
        let index_capacity = (quad_capacity * 6).max(1).next_power_of_two();
        Self {
            vertex_buffer: create_vertex_buffer(device, vertex_capacity),
            index_buffer: create_index_buffer(device, index_capacity),
            vertex_capacity,
            index_capacity,
        }
    }

    pub fn upload(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, batch: &SpriteBatch) {
        self.ensure_capacity(device, batch.vertices.len(), batch.indices.len());
        if !batch.vertices.is_empty() {
            queue.write_buffer(&self.vertex_buffer, 0, bytemuck::cast_slice(&batch.vertices));
        }
        if !batch.indices.is_empty() {
            queue.write_buffer(&self.index_buffer, 0, bytemuck::cast_slice(&batch.indices));
        }
    }

    fn ensure_capacity(&mut self, device: &wgpu::Device, vertex_count: usize, index_count: usize) {
        let needed_vertices = vertex_count.max(1);
        if needed_vertices > self.vertex_capacity {
            self.vertex_capacity = needed_vertices.next_power_of_two();
            self.vertex_buffer = create_vertex_buffer(device, self.vertex_capacity);
            log::debug!("Grew vertex buffer to {} vertices", self.vertex_capacity);
        }

        let needed_indices = index_count.max(1);
        if needed_indices > self.index_capacity {
            self.index_capacity = needed_indices.next_power_of_two();
            self.index_buffer = create_index_buffer(device, self.index_capacity);
            log::debug!("Grew index buffer to {} indices", self.index_capacity);
        }
    }
}

fn create_vertex_buffer(device: &wgpu::Device, vertex_capacity: usize) -> wgpu::Buffer {
    let byte_len = (vertex_capacity * std::mem::size_of::<SpriteVertex>()).max(1) as u64;
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Sprite Vertex Buffer"),
        size: byte_len,
        usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

fn create_index_buffer(device: &wgpu::Device, index_capacity: usize) -> wgpu::Buffer {
    let byte_len = (index_capacity * std::mem::size_of::<u32>()).max(1) as u64;
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Sprite Index Buffer"),
        size: byte_len,
        usage: wgpu::BufferUsages::INDEX | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quad_corners_are_top_left_anchored() {
        let mut batch = SpriteBatch::default();
        batch.push_quad(QuadSpec::textured(0, 10.0, 20.0, 32.0, 16.0));

        let positions: Vec<[f32; 2]> = batch.vertices.iter().map(|v| v.position).collect();
        assert_eq!(
            positions,
            vec![[10.0, 20.0], [42.0, 20.0], [42.0, 36.0], [10.0, 36.0]]
        );
        assert_eq!(batch.indices, vec![0, 1, 2, 0, 2, 3]);
        assert_eq!(batch.quad_count(), 1);
    }

    #[test]
    fn mirrored_quad_swaps_horizontal_uvs() {
        let mut batch = SpriteBatch::default();
        batch.push_quad(QuadSpec::textured(0, 0.0, 0.0, 8.0, 8.0).mirrored(true));
        assert_eq!(batch.vertices[0].tex_coords, [1.0, 0.0]);
        assert_eq!(batch.vertices[1].tex_coords, [0.0, 0.0]);
        assert_eq!(batch.vertices[2].tex_coords, [0.0, 1.0]);
    }

    #[test]
    fn consecutive_quads_with_same_texture_merge() {
        let mut batch = SpriteBatch::default();
        batch.push_quad(QuadSpec::textured(3, 0.0, 0.0, 32.0, 32.0));
        batch.push_quad(QuadSpec::textured(3, 32.0, 0.0, 32.0, 32.0));
        batch.push_quad(QuadSpec::textured(5, 64.0, 0.0, 32.0, 32.0));
        batch.push_quad(QuadSpec::textured(3, 96.0, 0.0, 32.0, 32.0));

        assert_eq!(
            batch.draw_calls,
            vec![
                DrawCall {
                    texture: 3,
                    index_start: 0,
                    index_count: 12
                },
                DrawCall {
                    texture: 5,
                    index_start: 12,
                    index_count: 6
                },
                DrawCall {
                    texture: 3,
                    index_start: 18,
                    index_count: 6
                },
            ]
        );
    }

    #[test]
    fn clear_empties_batch_for_reuse() {
        let mut batch = SpriteBatch::with_capacity(4);
        batch.push_quad(QuadSpec::textured(1, 0.0, 0.0, 1.0, 1.0));
        assert!(!batch.is_empty());
        batch.clear();
        assert!(batch.is_empty());
        assert!(batch.draw_calls.is_empty());

        batch.push_quad(QuadSpec::textured(2, 0.0, 0.0, 1.0, 1.0));
        assert_eq!(batch.draw_calls[0].index_start, 0);
    }
}
