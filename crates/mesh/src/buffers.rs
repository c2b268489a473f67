use std::sync::Arc;

use glam::{Vec2, Vec3};

use crate::face::QUAD_INDICES;

/// Flat render buffers of one sub-mesh, four vertices and six indices per face.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshBuffers {
    pub positions: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    pub uvs: Vec<Vec2>,
    pub indices: Vec<u32>,
}

impl MeshBuffers {
    /// Empty buffers with room for exactly `faces` quads.
    pub fn with_faces(faces: usize) -> Self {
        Self {
            positions: Vec::with_capacity(faces * 4),
            normals: Vec::with_capacity(faces * 4),
            uvs: Vec::with_capacity(faces * 4),
            indices: Vec::with_capacity(faces * 6),
        }
    }

    pub fn face_count(&self) -> usize {
        self.positions.len() / 4
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn push_quad(&mut self, corners: [Vec3; 4], normal: Vec3, uvs: [Vec2; 4]) {
        let base = self.positions.len() as u32;
        self.positions.extend_from_slice(&corners);
        self.normals.extend_from_slice(&[normal; 4]);
        self.uvs.extend_from_slice(&uvs);
        self.indices.extend(QUAD_INDICES.iter().map(|i| base + i));
    }
}

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn from_points(points: &[Vec3]) -> Option<Self> {
        let (first, rest) = points.split_first()?;
        let mut aabb = Self {
            min: *first,
            max: *first,
        };
        for p in rest {
            aabb.min = aabb.min.min(*p);
            aabb.max = aabb.max.max(*p);
        }
        Some(aabb)
    }

    pub fn contains(&self, p: Vec3) -> bool {
        p.cmpge(self.min).all() && p.cmple(self.max).all()
    }
}

/// Collision volume derived from a sub-mesh's committed buffers.
///
/// Shares the buffers with the render geometry instead of copying them.
#[derive(Debug, Clone)]
pub struct Collider {
    geometry: Arc<MeshBuffers>,
    bounds: Aabb,
}

impl Collider {
    /// `None` for empty geometry: an empty sub-mesh has nothing to collide with.
    pub fn from_geometry(geometry: Arc<MeshBuffers>) -> Option<Self> {
        let bounds = Aabb::from_points(&geometry.positions)?;
        Some(Self { geometry, bounds })
    }

    pub fn bounds(&self) -> Aabb {
        self.bounds
    }

    pub fn triangle_count(&self) -> usize {
        self.geometry.indices.len() / 3
    }

    pub fn triangles(&self) -> impl Iterator<Item = [Vec3; 3]> + '_ {
        let p = &self.geometry.positions;
        self.geometry
            .indices
            .chunks_exact(3)
            .map(move |t| [p[t[0] as usize], p[t[1] as usize], p[t[2] as usize]])
    }
}

/// One of the `W×W` partitions of a tile's geometry.
#[derive(Debug, Clone)]
pub struct SubMesh {
    index: usize,
    geometry: Arc<MeshBuffers>,
    collider: Option<Collider>,
}

impl SubMesh {
    pub fn new(index: usize) -> Self {
        Self {
            index,
            geometry: Arc::new(MeshBuffers::default()),
            collider: None,
        }
    }

    /// Row-major index inside the tile's partition.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn geometry(&self) -> &Arc<MeshBuffers> {
        &self.geometry
    }

    pub fn collider(&self) -> Option<&Collider> {
        self.collider.as_ref()
    }

    pub fn face_count(&self) -> usize {
        self.geometry.face_count()
    }

    /// Replace the geometry wholesale and rebuild the collider from it.
    pub fn commit(&mut self, buffers: MeshBuffers) {
        self.geometry = Arc::new(buffers);
        self.collider = Collider::from_geometry(Arc::clone(&self.geometry));
    }

    /// Drop all geometry (zero faces).
    pub fn clear(&mut self) {
        self.geometry = Arc::new(MeshBuffers::default());
        self.collider = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_quad() -> MeshBuffers {
        let mut b = MeshBuffers::with_faces(1);
        b.push_quad(
            [
                Vec3::new(0.0, 1.0, 0.0),
                Vec3::new(1.0, 1.0, 0.0),
                Vec3::new(1.0, 0.0, 0.0),
                Vec3::new(0.0, 0.0, 0.0),
            ],
            Vec3::NEG_Z,
            [Vec2::ONE, Vec2::Y, Vec2::ZERO, Vec2::X],
        );
        b
    }

    #[test]
    fn push_quad_offsets_indices() {
        let mut b = unit_quad();
        assert_eq!(b.indices, vec![3, 1, 0, 3, 2, 1]);
        b.push_quad([Vec3::ZERO; 4], Vec3::X, [Vec2::ZERO; 4]);
        assert_eq!(&b.indices[6..], &[7, 5, 4, 7, 6, 5]);
        assert_eq!(b.face_count(), 2);
    }

    #[test]
    fn exact_capacity_is_not_exceeded() {
        let b = unit_quad();
        assert_eq!(b.positions.len(), b.positions.capacity());
        assert_eq!(b.indices.len(), b.indices.capacity());
    }

    #[test]
    fn commit_replaces_and_builds_collider() {
        let mut sm = SubMesh::new(3);
        assert_eq!(sm.face_count(), 0);
        assert!(sm.collider().is_none());

        let before = Arc::clone(sm.geometry());
        sm.commit(unit_quad());
        assert!(!Arc::ptr_eq(&before, sm.geometry()));
        assert_eq!(sm.face_count(), 1);

        let collider = sm.collider().unwrap();
        assert_eq!(collider.triangle_count(), 2);
        assert_eq!(collider.bounds().min, Vec3::ZERO);
        assert_eq!(collider.bounds().max, Vec3::new(1.0, 1.0, 0.0));
        assert_eq!(collider.triangles().count(), 2);

        sm.clear();
        assert_eq!(sm.face_count(), 0);
        assert!(sm.collider().is_none());
    }

    #[test]
    fn aabb_contains() {
        let aabb = Aabb::from_points(&[Vec3::ZERO, Vec3::ONE]).unwrap();
        assert!(aabb.contains(Vec3::splat(0.5)));
        assert!(!aabb.contains(Vec3::new(0.5, 1.5, 0.5)));
        assert!(Aabb::from_points(&[]).is_none());
    }
}
