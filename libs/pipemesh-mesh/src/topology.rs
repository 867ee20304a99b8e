//! # Mesh Topology
//!
//! Face adjacency of a tetrahedral mesh: the boundary triangles, oriented
//! outward, and the face-connected components.

use std::collections::HashMap;

/// Outward faces of a positively oriented tetrahedron `(a, b, c, d)` as
/// local vertex triples.
const OUTWARD_FACES: [[usize; 3]; 4] = [[0, 2, 1], [0, 1, 3], [0, 3, 2], [1, 2, 3]];

/// Boundary and connectivity of a tetrahedral mesh.
#[derive(Debug, Clone, PartialEq)]
pub struct Topology {
    /// Faces used by exactly one tetrahedron, oriented outward, in order of
    /// their tetrahedron.
    pub boundary: Vec<[usize; 3]>,
    /// Number of face-connected components.
    pub components: usize,
}

fn find(parent: &mut [usize], mut i: usize) -> usize {
    while parent[i] != i {
        parent[i] = parent[parent[i]];
        i = parent[i];
    }
    i
}

/// Analyzes positively oriented tetrahedra.
pub fn analyze(tetrahedra: &[[usize; 4]]) -> Topology {
    // Sorted face -> (first tetrahedron, use count)
    let mut faces: HashMap<[usize; 3], (usize, usize)> =
        HashMap::with_capacity(tetrahedra.len() * 2);
    let mut parent: Vec<usize> = (0..tetrahedra.len()).collect();

    for (index, tet) in tetrahedra.iter().enumerate() {
        for local in OUTWARD_FACES {
            let mut key = local.map(|i| tet[i]);
            key.sort_unstable();
            let entry = faces.entry(key).or_insert((index, 0));
            entry.1 += 1;
            if entry.1 > 1 {
                let (a, b) = (find(&mut parent, entry.0), find(&mut parent, index));
                if a != b {
                    parent[a.max(b)] = a.min(b);
                }
            }
        }
    }

    let mut boundary = Vec::new();
    for tet in tetrahedra {
        for local in OUTWARD_FACES {
            let face = local.map(|i| tet[i]);
            let mut key = face;
            key.sort_unstable();
            if faces.get(&key).is_some_and(|(_, count)| *count == 1) {
                boundary.push(face);
            }
        }
    }

    let components = (0..tetrahedra.len())
        .filter(|&i| find(&mut parent, i) == i)
        .count();

    Topology {
        boundary,
        components,
    }
}

/// Flags the nodes that lie on a boundary face.
pub fn boundary_nodes(node_count: usize, boundary: &[[usize; 3]]) -> Vec<bool> {
    let mut flags = vec![false; node_count];
    for face in boundary {
        for &node in face {
            flags[node] = true;
        }
    }
    flags
}
