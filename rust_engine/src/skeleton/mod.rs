//! 骨骼层级与重定位

mod node;
mod rebinder;
mod tree;

pub use node::{NodeId, TransformNode};
pub use rebinder::{RebindOptions, RebindReport, SkeletonRebinder};
pub use tree::TransformTree;

use glam::{Quat, Vec3};

/// 骨骼世界变换快照（用于备份与恢复）
#[derive(Clone, Debug)]
pub struct BoneSnapshot {
    pub node: NodeId,
    pub name: String,
    pub position: Vec3,
    pub rotation: Quat,
}

impl BoneSnapshot {
    pub fn capture(tree: &TransformTree, node: NodeId) -> Self {
        Self {
            node,
            name: tree.name(node).unwrap_or_default().to_string(),
            position: tree.world_position(node),
            rotation: tree.world_rotation(node),
        }
    }
}
