use glam::{Mat4, Vec3};

/// CPU-side geometry ready for upload. Flat arrays, three floats per
/// position and two per UV.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshData {
    pub positions: Vec<f32>,
    pub uvs: Vec<f32>,
    pub indices: Vec<u32>,
}

impl MeshData {
    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty() || self.positions.is_empty()
    }

    /// Fills missing UVs with zeros and missing indices with a plain
    /// triangle list, so every mesh uploads with the same layout.
    pub fn normalize_layout(&mut self) {
        let n = self.vertex_count();
        if self.uvs.len() != n * 2 {
            self.uvs = vec![0.0; n * 2];
        }
        if self.indices.is_empty() {
            self.indices = (0..n as u32).collect();
        }
    }

    /// Axis-aligned bounds of the positions after `transform`.
    pub fn bounds(&self, transform: &Mat4) -> Option<(Vec3, Vec3)> {
        let mut points = self
            .positions
            .chunks_exact(3)
            .map(|p| transform.transform_point3(Vec3::new(p[0], p[1], p[2])));
        let first = points.next()?;
        Some(points.fold((first, first), |(lo, hi), p| (lo.min(p), hi.max(p))))
    }
}

/// Square plane of side `size` lying in the XZ plane at y = 0, centred on
/// the origin and facing +Y.
pub fn floor_plane(size: f32) -> MeshData {
    let h = size * 0.5;
    MeshData {
        positions: vec![
            -h, 0.0, -h, //
            h, 0.0, -h, //
            -h, 0.0, h, //
            h, 0.0, h,
        ],
        uvs: vec![
            0.0, 1.0, //
            1.0, 1.0, //
            0.0, 0.0, //
            1.0, 0.0,
        ],
        indices: vec![0, 2, 1, 2, 3, 1],
    }
}
