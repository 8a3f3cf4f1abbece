use std::collections::BTreeSet;

/// Identity of a node that can be attached to the scene
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum NodeKey {
    ImagePlane,
    Solid(usize),
    Particles,
    Light(usize),
}

/// Set of nodes composed for rendering
///
/// Components own their objects; the graph only records which of them are
/// currently part of the scene.
#[derive(Debug, Default)]
pub struct SceneGraph {
    attached: BTreeSet<NodeKey>,
}

impl SceneGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false if the node was already attached
    pub fn add(&mut self, key: NodeKey) -> bool {
        self.attached.insert(key)
    }

    /// Returns false if the node was not attached
    pub fn remove(&mut self, key: NodeKey) -> bool {
        self.attached.remove(&key)
    }

    pub fn contains(&self, key: NodeKey) -> bool {
        self.attached.contains(&key)
    }

    pub fn len(&self) -> usize {
        self.attached.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attached.is_empty()
    }

    pub fn lights(&self) -> impl Iterator<Item = usize> + '_ {
        self.attached.iter().filter_map(|key| match key {
            NodeKey::Light(i) => Some(*i),
            _ => None,
        })
    }
}
