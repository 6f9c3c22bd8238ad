use fnv::{FnvHashMap, FnvHashSet};
use glam::Vec3;

#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SphereVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

/// Indexed line-list mesh: every pair in `indices` is one edge.
pub struct WireMesh {
    pub vertices: Vec<SphereVertex>,
    pub indices: Vec<u32>,
}

impl WireMesh {
    #[inline]
    pub fn edge_count(&self) -> usize {
        self.indices.len() / 2
    }
}

const ICO_FACES: [[usize; 3]; 20] = [
    [0, 11, 5],
    [0, 5, 1],
    [0, 1, 7],
    [0, 7, 10],
    [0, 10, 11],
    [1, 5, 9],
    [5, 11, 4],
    [11, 10, 2],
    [10, 7, 6],
    [7, 1, 8],
    [3, 9, 4],
    [3, 4, 2],
    [3, 2, 6],
    [3, 6, 8],
    [3, 8, 9],
    [4, 9, 5],
    [2, 4, 11],
    [6, 2, 10],
    [8, 6, 7],
    [9, 8, 1],
];

fn ico_corners() -> [Vec3; 12] {
    let t = (1.0 + 5.0_f32.sqrt()) / 2.0;
    [
        Vec3::new(-1.0, t, 0.0),
        Vec3::new(1.0, t, 0.0),
        Vec3::new(-1.0, -t, 0.0),
        Vec3::new(1.0, -t, 0.0),
        Vec3::new(0.0, -1.0, t),
        Vec3::new(0.0, 1.0, t),
        Vec3::new(0.0, -1.0, -t),
        Vec3::new(0.0, 1.0, -t),
        Vec3::new(t, 0.0, -1.0),
        Vec3::new(t, 0.0, 1.0),
        Vec3::new(-t, 0.0, -1.0),
        Vec3::new(-t, 0.0, 1.0),
    ]
}

// A subdivision point is an integer blend of up to three icosahedron corners.
// Sorting the (corner, weight) pairs gives the same key from every face that
// shares the point, so seams weld exactly.
type BlendKey = [(u32, u32); 3];

fn blend_key(parts: [(usize, u32); 3]) -> BlendKey {
    let mut key = [(u32::MAX, 0); 3];
    for (slot, (corner, weight)) in key.iter_mut().zip(parts) {
        if weight > 0 {
            *slot = (corner as u32, weight);
        }
    }
    key.sort_unstable();
    key
}

/// Subdivided icosahedron projected onto a sphere of `radius`.
///
/// Each face is split into `(detail + 1)^2` triangles. Vertices on shared
/// edges are welded and each edge appears once.
pub fn icosahedron(radius: f32, detail: u32) -> WireMesh {
    let corners = ico_corners();
    let cols = detail + 1;
    let mut lookup: FnvHashMap<BlendKey, u32> = FnvHashMap::default();
    let mut vertices = Vec::new();
    let mut seen: FnvHashSet<(u32, u32)> = FnvHashSet::default();
    let mut indices = Vec::new();

    for [a, b, c] in ICO_FACES {
        // grid[i][j]: row i walks from edge ab toward c, j walks from a-side to b-side
        let mut grid: Vec<Vec<u32>> = Vec::with_capacity(cols as usize + 1);
        for i in 0..=cols {
            let rows = cols - i;
            let mut row = Vec::with_capacity(rows as usize + 1);
            for j in 0..=rows {
                let key = blend_key([(a, rows - j), (b, j), (c, i)]);
                let id = *lookup.entry(key).or_insert_with(|| {
                    let p = (corners[a] * (rows - j) as f32
                        + corners[b] * j as f32
                        + corners[c] * i as f32)
                        / cols as f32;
                    let n = p.normalize();
                    vertices.push(SphereVertex {
                        position: (n * radius).to_array(),
                        normal: n.to_array(),
                    });
                    (vertices.len() - 1) as u32
                });
                row.push(id);
            }
            grid.push(row);
        }

        let mut edge = |p: u32, q: u32| {
            let e = (p.min(q), p.max(q));
            if seen.insert(e) {
                indices.extend_from_slice(&[e.0, e.1]);
            }
        };
        for i in 0..cols as usize {
            let rows = cols as usize - i;
            for j in 0..(2 * rows - 1) {
                let k = j / 2;
                let tri = if j % 2 == 0 {
                    [grid[i][k + 1], grid[i + 1][k], grid[i][k]]
                } else {
                    [grid[i][k + 1], grid[i + 1][k + 1], grid[i + 1][k]]
                };
                edge(tri[0], tri[1]);
                edge(tri[1], tri[2]);
                edge(tri[2], tri[0]);
            }
        }
    }

    WireMesh { vertices, indices }
}
