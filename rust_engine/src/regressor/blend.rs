//! 形状参数 → FBX 混合形状权重

/// 混合形状权重
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BlendShapeWeight {
    /// 混合形状索引：正向 beta 为 2i，负向为 2i+1
    pub index: usize,
    /// 权重（百分比）
    pub weight: f32,
}

/// 计算形状参数对应的混合形状权重
///
/// FBX 中每个 beta 拆成正负两个混合形状，均按 `standard_deviations` 个标准差制作，
/// 因此权重 = |beta| * 100 / standard_deviations。
pub fn shape_blend_weights(betas: &[f32], standard_deviations: f32) -> Vec<BlendShapeWeight> {
    betas
        .iter()
        .enumerate()
        .map(|(i, &beta)| BlendShapeWeight {
            index: if beta >= 0.0 { i * 2 } else { i * 2 + 1 },
            weight: beta.abs() * 100.0 / standard_deviations,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positive_and_negative_betas() {
        let weights = shape_blend_weights(&[2.5, -1.0, 0.0], 5.0);
        assert_eq!(weights.len(), 3);
        assert_eq!(weights[0].index, 0);
        assert!((weights[0].weight - 50.0).abs() < 1e-5);
        assert_eq!(weights[1].index, 3);
        assert!((weights[1].weight - 20.0).abs() < 1e-5);
        // 零值归入正向形状
        assert_eq!(weights[2].index, 4);
        assert_eq!(weights[2].weight, 0.0);
    }
}
