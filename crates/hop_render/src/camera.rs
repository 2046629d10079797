use glam::{Mat4, Vec2};

#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    pub view_proj: [[f32; 4]; 4],
}

/// Screen-aligned 2D camera over a y-down pixel world.
///
/// `position` is the world point shown at the top-left corner of the
/// viewport, so a horizontal view offset `xo` maps to `position.x = -xo`.
pub struct Camera2D {
    pub position: Vec2,
    pub zoom: f32,
    pub viewport: (u32, u32),
}

impl Camera2D {
    pub fn new(viewport_width: u32, viewport_height: u32) -> Self {
        Self {
            position: Vec2::ZERO,
            zoom: 1.0,
            viewport: (viewport_width, viewport_height),
        }
    }

    /// Place the camera so that world point `p` appears at `p + offset` on screen.
    pub fn set_view_offset(&mut self, offset: Vec2) {
        self.position = -offset;
    }

    pub fn world_to_screen(&self, world: Vec2) -> Vec2 {
        (world - self.position) * self.zoom
    }

    pub fn build_uniform(&self) -> CameraUniform {
        let width = self.viewport.0 as f32 / self.zoom;
        let height = self.viewport.1 as f32 / self.zoom;

        let proj = Mat4::orthographic_rh(
            self.position.x,
            self.position.x + width,
            self.position.y + height,
            self.position.y,
            -1.0,
            1.0,
        );

        CameraUniform {
            view_proj: proj.to_cols_array_2d(),
        }
    }
}
