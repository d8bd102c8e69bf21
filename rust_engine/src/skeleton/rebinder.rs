//! 骨骼重定位与绑定姿势重建

use glam::Vec3;
use std::sync::Arc;

use super::{BoneSnapshot, NodeId, TransformTree};
use crate::config::{get_config, EngineConfig};
use crate::model::{Aabb, BodyMesh};
use crate::regressor::{
    joint_index_for_bone, regress, shape_blend_weights, BlendShapeWeight, JointSet,
    ShapeRegressionModel,
};
use crate::skinning::bake_mesh;
use crate::{Result, SmplError};

/// 单次重定位的选项
#[derive(Clone, Debug)]
pub struct RebindOptions {
    /// 重定位后平移盆骨，让最低顶点落在 y = 0
    pub feet_on_ground: bool,
    /// 覆盖自动推断的骨骼名前缀（如 "m_avg_"）
    pub bone_name_prefix: Option<String>,
}

impl RebindOptions {
    pub fn from_config(config: &EngineConfig) -> Self {
        Self {
            feet_on_ground: config.feet_on_ground,
            bone_name_prefix: None,
        }
    }
}

impl Default for RebindOptions {
    fn default() -> Self {
        Self::from_config(&get_config())
    }
}

/// 重定位结果
#[derive(Clone, Debug, Default)]
pub struct RebindReport {
    /// 找不到关节映射的骨骼（未移动）
    pub unmapped_bones: Vec<String>,
    /// 落地时盆骨的平移量（未落地为 0）
    pub height_offset: f32,
    /// 重定位后各骨骼的世界坐标，与 mesh.bones 对应
    pub bone_positions: Vec<Vec3>,
}

/// 骨骼重定位器
///
/// 初始化时备份所有骨骼的世界变换；之后每次重定位都从关节位置重新摆放骨骼，
/// 并以化身根节点为基准重算逆绑定矩阵。`restore` 恢复备份，避免多次实验之间
/// 残留被修改的骨架。
pub struct SkeletonRebinder {
    model: Option<Arc<ShapeRegressionModel>>,
    config: EngineConfig,
    bone_name_prefix: String,
    /// 盆骨在 mesh.bones 中的下标
    pelvis: Option<usize>,
    backup: Vec<BoneSnapshot>,
    bone_positions: Vec<Vec3>,
    initialized: bool,
    bones_modified: bool,
}

impl SkeletonRebinder {
    pub fn new() -> Self {
        Self::with_config(get_config())
    }

    pub fn with_config(config: EngineConfig) -> Self {
        Self {
            model: None,
            config,
            bone_name_prefix: String::new(),
            pelvis: None,
            backup: Vec::new(),
            bone_positions: Vec::new(),
            initialized: false,
            bones_modified: false,
        }
    }

    /// 绑定回归模型与网格：推断骨骼名前缀、定位盆骨、备份骨骼变换
    pub fn initialize(
        &mut self,
        model: Arc<ShapeRegressionModel>,
        tree: &TransformTree,
        mesh: &BodyMesh,
    ) -> Result<()> {
        mesh.validate(tree)?;

        let names: Vec<&str> = mesh
            .bones
            .iter()
            .map(|&bone| tree.name(bone).unwrap_or_default())
            .collect();

        // 根骨骼形如 "m_avg_root"，其前面部分即前缀
        self.bone_name_prefix = names
            .iter()
            .find_map(|name| name.strip_suffix(self.config.root_bone_name.as_str()))
            .unwrap_or_default()
            .to_string();

        self.pelvis = names
            .iter()
            .position(|name| name.ends_with(self.config.pelvis_bone_name.as_str()));

        self.backup = mesh
            .bones
            .iter()
            .map(|&bone| BoneSnapshot::capture(tree, bone))
            .collect();
        self.bone_positions = self.backup.iter().map(|s| s.position).collect();

        self.model = Some(model);
        self.initialized = true;
        self.bones_modified = false;

        log::info!(
            "骨骼重定位器初始化完成: {} 个骨骼, 前缀 '{}'",
            mesh.bones.len(),
            self.bone_name_prefix
        );
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn bone_name_prefix(&self) -> &str {
        &self.bone_name_prefix
    }

    /// 盆骨节点
    pub fn pelvis(&self, mesh: &BodyMesh) -> Option<NodeId> {
        self.pelvis.and_then(|i| mesh.bones.get(i).copied())
    }

    /// 最近一次重定位（或初始化）后的骨骼世界坐标
    pub fn bone_positions(&self) -> &[Vec3] {
        &self.bone_positions
    }

    pub fn backup(&self) -> &[BoneSnapshot] {
        &self.backup
    }

    /// 形状参数对应的 FBX 混合形状权重
    pub fn shape_blend_weights(&self, betas: &[f32]) -> Result<Vec<BlendShapeWeight>> {
        if !self.initialized {
            return Err(SmplError::UninitializedModel);
        }
        Ok(shape_blend_weights(betas, self.config.standard_deviations_fbx))
    }

    /// 由形状参数回归关节并重定位骨骼
    pub fn update_bone_positions(
        &mut self,
        tree: &mut TransformTree,
        mesh: &mut BodyMesh,
        betas: &[f32],
        options: &RebindOptions,
    ) -> Result<RebindReport> {
        let model = match (&self.model, self.initialized) {
            (Some(model), true) => Arc::clone(model),
            _ => return Err(SmplError::UninitializedModel),
        };
        let joints = regress(&model, betas)?;
        self.rebind(tree, mesh, &joints, options)
    }

    /// 按关节位置重定位骨骼并重建绑定姿势
    ///
    /// 所有前置检查都在第一次修改之前完成，失败时层级树与网格保持原样。
    pub fn rebind(
        &mut self,
        tree: &mut TransformTree,
        mesh: &mut BodyMesh,
        joints: &JointSet,
        options: &RebindOptions,
    ) -> Result<RebindReport> {
        if !self.initialized {
            return Err(SmplError::UninitializedModel);
        }
        let avatar_root = mesh.validate(tree)?;
        if mesh.bones.len() != self.backup.len() {
            return Err(SmplError::NoMesh(format!(
                "mesh '{}' has {} bones but {} were captured at initialization",
                mesh.name,
                mesh.bones.len(),
                self.backup.len()
            )));
        }

        let prefix = options
            .bone_name_prefix
            .as_deref()
            .unwrap_or(&self.bone_name_prefix);

        // 1. 骨骼名 → 关节索引
        let mut targets: Vec<(NodeId, usize)> = Vec::new();
        let mut unmapped_bones = Vec::new();
        for &bone in &mesh.bones {
            let full_name = tree.name(bone).unwrap_or_default();
            let name = full_name.strip_prefix(prefix).unwrap_or(full_name);
            if name == self.config.root_bone_name {
                continue;
            }
            match joint_index_for_bone(name) {
                Some(index) => targets.push((bone, index)),
                None => {
                    log::error!("No joint index for given bone name: {}", name);
                    unmapped_bones.push(full_name.to_string());
                }
            }
        }

        if let Some(required) = targets.iter().map(|&(_, index)| index + 1).max() {
            if joints.len() < required {
                return Err(SmplError::DimensionMismatch {
                    expected: required,
                    actual: joints.len(),
                });
            }
        }

        let pelvis = if options.feet_on_ground {
            let pelvis = self.pelvis(mesh).ok_or_else(|| {
                SmplError::MissingBone(format!(
                    "no '{}' bone to ground mesh '{}'",
                    self.config.pelvis_bone_name, mesh.name
                ))
            })?;
            if mesh.vertices.is_empty() {
                return Err(SmplError::NoMesh(format!(
                    "mesh '{}' has no vertices to ground",
                    mesh.name
                )));
            }
            Some(pelvis)
        } else {
            None
        };

        // 2. 世界坐标重定位（父骨骼先于子骨骼，避免父骨骼移动带偏已摆好的子骨骼）
        targets.sort_by_key(|&(bone, _)| tree.depth(bone));
        for &(bone, index) in &targets {
            if let Some(joint) = joints.get(index) {
                // 关节位置以原点为中心，变换到化身位置与朝向
                let world = tree.transform_point(avatar_root, joint);
                tree.set_world_position(bone, world);
            }
        }

        // 3. 重算所有骨骼的逆绑定矩阵
        set_bind_pose(tree, mesh, avatar_root);

        // 4. 落地
        let mut height_offset = 0.0;
        if let Some(pelvis) = pelvis {
            let baked = bake_mesh(tree, mesh);
            if let Some(bounds) = Aabb::from_points(&baked) {
                if self.config.debug_log {
                    log::debug!(
                        "MinMax: x[{},{}], y[{},{}], z[{},{}]",
                        bounds.min.x,
                        bounds.max.x,
                        bounds.min.y,
                        bounds.max.y,
                        bounds.min.z,
                        bounds.max.z
                    );
                }
                height_offset = -bounds.min.y;
                // 烘焙结果位于渲染器空间，平移量同样按渲染器的 up 方向换算到世界空间
                let offset = tree
                    .local_to_world_matrix(mesh.renderer)
                    .transform_vector3(Vec3::new(0.0, height_offset, 0.0));
                tree.translate_world(pelvis, offset);
            }
        }

        // 5. 记录骨骼位置（盆骨平移后子骨骼的世界坐标也已改变）
        self.bone_positions = mesh.bones.iter().map(|&bone| tree.world_position(bone)).collect();
        self.bones_modified = true;

        Ok(RebindReport {
            unmapped_bones,
            height_offset,
            bone_positions: self.bone_positions.clone(),
        })
    }

    /// 恢复初始化时备份的骨骼变换并重算绑定姿势
    ///
    /// 未初始化或骨骼未被修改时返回 false。
    pub fn restore(&mut self, tree: &mut TransformTree, mesh: &mut BodyMesh) -> Result<bool> {
        if !self.initialized || !self.bones_modified {
            return Ok(false);
        }
        let avatar_root = mesh.validate(tree)?;

        let mut snapshots: Vec<&BoneSnapshot> = self.backup.iter().collect();
        snapshots.sort_by_key(|s| tree.depth(s.node));
        for snapshot in snapshots {
            tree.set_world_position(snapshot.node, snapshot.position);
            tree.set_world_rotation(snapshot.node, snapshot.rotation);
        }

        set_bind_pose(tree, mesh, avatar_root);

        self.bone_positions = self.backup.iter().map(|s| s.position).collect();
        self.bones_modified = false;
        log::info!("已恢复网格 '{}' 的原始骨骼变换", mesh.name);
        Ok(true)
    }
}

impl Default for SkeletonRebinder {
    fn default() -> Self {
        Self::new()
    }
}

/// 逆绑定矩阵 = 骨骼 world→local * 化身根 local→world
///
/// 相对化身根节点而非单位矩阵，这样移动或旋转根节点时蒙皮仍然正确。
fn set_bind_pose(tree: &TransformTree, mesh: &mut BodyMesh, avatar_root: NodeId) {
    let root_matrix = tree.local_to_world_matrix(avatar_root);
    mesh.bind_poses = mesh
        .bones
        .iter()
        .map(|&bone| tree.world_to_local_matrix(bone) * root_matrix)
        .collect();
}
