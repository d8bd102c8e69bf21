//! 包围盒与摆放

use glam::{Quat, Vec3};

/// 轴对齐包围盒
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    /// 从点集计算包围盒，空点集返回 None
    ///
    /// 每个分量的 min/max 独立更新，单个顶点可以同时决定某轴的最小值和最大值。
    pub fn from_points(points: &[Vec3]) -> Option<Self> {
        let first = *points.first()?;
        let (min, max) = points
            .iter()
            .fold((first, first), |(min, max), &p| (min.min(p), max.max(p)));
        Some(Self { min, max })
    }

    /// 宽 (x)、高 (y)、深 (z)
    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }
}

/// 将身体居中到 XZ 平面原点并让脚底落在 y = 0 所需的平移
pub fn placement_offset(bounds: &Aabb) -> Vec3 {
    let center = bounds.center();
    Vec3::new(-center.x, -bounds.min.y, -center.z)
}

/// 绕 y 轴按 90° 步进旋转，使正面探针顶点朝向 +z
///
/// `probe` 为居中后探针顶点（如鼻尖）的位置。
pub fn facing_correction(probe: Vec3) -> Quat {
    let (ax, az) = (probe.x.abs(), probe.z.abs());
    let degrees: f32 = if ax > az && probe.x > 0.0 {
        270.0
    } else if az > ax && probe.z < 0.0 {
        180.0
    } else if ax > az && probe.x < 0.0 {
        90.0
    } else {
        0.0
    };
    Quat::from_rotation_y(degrees.to_radians())
}
