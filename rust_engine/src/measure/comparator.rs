//! 网格对比

use glam::Vec3;

use super::MeasurementSpec;
use crate::config::{get_config, EngineConfig};
use crate::model::{Aabb, BodyMesh};
use crate::skeleton::TransformTree;
use crate::skinning::world_space_vertices;
use crate::{Result, SmplError};

/// 单项测量结果（距离单位：米）
#[derive(Clone, Debug, PartialEq)]
pub struct MeasurementRecord {
    pub point_a: String,
    pub point_b: String,
    pub measurement_name: String,
    pub distance1: f32,
    pub distance2: f32,
    /// |distance1 - distance2|，不表示方向
    pub discrepancy: f32,
}

impl MeasurementRecord {
    pub fn new(
        point_a: impl Into<String>,
        point_b: impl Into<String>,
        measurement_name: impl Into<String>,
        distance1: f32,
        distance2: f32,
    ) -> Self {
        Self {
            point_a: point_a.into(),
            point_b: point_b.into(),
            measurement_name: measurement_name.into(),
            distance1,
            distance2,
            discrepancy: (distance1 - distance2).abs(),
        }
    }
}

/// 一次对比的完整结果，末尾总是三条包围盒记录（宽、高、深）
#[derive(Clone, Debug, PartialEq)]
pub struct ComparisonResult {
    pub mesh_name_1: String,
    pub mesh_name_2: String,
    pub records: Vec<MeasurementRecord>,
}

/// 对比两组世界空间顶点，每次调用产生一个新的结果
///
/// 测量点名未定义时返回 `LookupFailure`，不跳过，否则报表各行会错位。
pub fn compare(
    mesh_name_1: &str,
    vertices_a: &[Vec3],
    mesh_name_2: &str,
    vertices_b: &[Vec3],
    spec: &MeasurementSpec,
) -> Result<ComparisonResult> {
    let bounds_a = Aabb::from_points(vertices_a)
        .ok_or_else(|| SmplError::NoMesh("first mesh has no vertices".to_string()))?;
    let bounds_b = Aabb::from_points(vertices_b)
        .ok_or_else(|| SmplError::NoMesh("second mesh has no vertices".to_string()))?;

    let mut records = Vec::with_capacity(spec.distances().len() + 3);
    for measurement in spec.distances() {
        let a = spec.vertex_index(&measurement.point_a)?;
        let b = spec.vertex_index(&measurement.point_b)?;
        let distance1 = vertex_distance(vertices_a, a, b)?;
        let distance2 = vertex_distance(vertices_b, a, b)?;
        records.push(MeasurementRecord::new(
            measurement.point_a.as_str(),
            measurement.point_b.as_str(),
            measurement.name.as_str(),
            distance1,
            distance2,
        ));
    }

    let size_a = bounds_a.size();
    let size_b = bounds_b.size();
    records.push(MeasurementRecord::new("BoundingBoxLeft", "BoundingBoxRight", "BoundingBoxWidth", size_a.x, size_b.x));
    records.push(MeasurementRecord::new("BoundingBoxTop", "BoundingBoxBottom", "BoundingBoxHeight", size_a.y, size_b.y));
    records.push(MeasurementRecord::new("BoundingBoxFront", "BoundingBoxBack", "BoundingBoxDepth", size_a.z, size_b.z));

    Ok(ComparisonResult {
        mesh_name_1: mesh_name_1.to_string(),
        mesh_name_2: mesh_name_2.to_string(),
        records,
    })
}

fn vertex_distance(vertices: &[Vec3], a: usize, b: usize) -> Result<f32> {
    let lookup = |index: usize| {
        vertices.get(index).copied().ok_or_else(|| {
            SmplError::LookupFailure(format!(
                "vertex {} is out of range for a mesh with {} vertices",
                index + 1,
                vertices.len()
            ))
        })
    };
    Ok(lookup(a)?.distance(lookup(b)?))
}

/// 网格对比器：持有两个网格的世界空间顶点快照与最近一次结果
pub struct MeshComparator {
    name1: String,
    vertices1: Vec<Vec3>,
    name2: String,
    vertices2: Vec<Vec3>,
    config: EngineConfig,
    current: Option<ComparisonResult>,
}

impl MeshComparator {
    pub fn new(
        name1: impl Into<String>,
        vertices1: Vec<Vec3>,
        name2: impl Into<String>,
        vertices2: Vec<Vec3>,
    ) -> Self {
        Self {
            name1: name1.into(),
            vertices1,
            name2: name2.into(),
            vertices2,
            config: get_config(),
            current: None,
        }
    }

    /// 从两个蒙皮网格的当前姿势创建（顶点转换到世界空间）
    pub fn from_meshes(tree: &TransformTree, mesh1: &BodyMesh, mesh2: &BodyMesh) -> Self {
        Self::new(
            mesh1.name.as_str(),
            world_space_vertices(tree, mesh1),
            mesh2.name.as_str(),
            world_space_vertices(tree, mesh2),
        )
    }

    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// 运行对比，结果替换上一次的结果
    pub fn compare(&mut self, spec: &MeasurementSpec) -> Result<&ComparisonResult> {
        let result = compare(&self.name1, &self.vertices1, &self.name2, &self.vertices2, spec)?;
        Ok(&*self.current.insert(result))
    }

    /// 最近一次结果
    pub fn result(&self) -> Option<&ComparisonResult> {
        self.current.as_ref()
    }

    /// 最近一次结果的 CSV 表示（厘米）
    pub fn csv_comparison(&self, leading_columns: &[&str]) -> Result<String> {
        let result = self.current.as_ref().ok_or(SmplError::EmptyResult)?;
        Ok(result.to_csv(leading_columns, &self.config.csv_separator, self.config.distance_scale))
    }

    /// 最近一次结果的 TXT 表示（厘米）
    pub fn text_comparison(&self, longest_mesh_name: usize) -> Result<String> {
        let result = self.current.as_ref().ok_or(SmplError::EmptyResult)?;
        Ok(result.to_text(longest_mesh_name, self.config.distance_scale))
    }
}
