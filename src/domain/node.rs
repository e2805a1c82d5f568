// ==========================================
// 生鲜物资调配模拟系统 - 节点领域模型
// ==========================================
// 职责: 地理坐标 + 网络节点 (农场/仓库/公益组织)
// 红线: 坐标必须在构造时校验, 核心不得在 NaN 上计算
// ==========================================

use crate::domain::types::NodeRole;
use crate::engine::error::EngineError;
use serde::{Deserialize, Serialize};

// ==========================================
// LocationPoint - 地理坐标
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LocationPoint {
    pub lat: f64, // 纬度 (度)
    pub lon: f64, // 经度 (度)
}

impl LocationPoint {
    /// 构造并校验坐标
    ///
    /// # 规则
    /// - 两个分量必须有限 (拒绝 NaN / Infinity)
    /// - lat ∈ [-90, 90], lon ∈ [-180, 180]
    ///
    /// # 返回
    /// - `Ok(LocationPoint)`: 合法坐标
    /// - `Err(EngineError::InvalidCoordinate)`: 越界或非有限值
    pub fn new(lat: f64, lon: f64) -> Result<Self, EngineError> {
        if !lat.is_finite() || !lon.is_finite() || !(-90.0..=90.0).contains(&lat)
            || !(-180.0..=180.0).contains(&lon)
        {
            return Err(EngineError::InvalidCoordinate { lat, lon });
        }
        Ok(Self { lat, lon })
    }

    /// 校验已反序列化的坐标 (快照入口统一调用)
    pub fn validate(&self) -> Result<(), EngineError> {
        Self::new(self.lat, self.lon).map(|_| ())
    }
}

// ==========================================
// Node - 网络节点
// ==========================================
// 归属: 数据层拥有节点数据, 核心在单次运行内只读
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    pub id: String,
    pub name: String,
    pub role: NodeRole,
    pub location: LocationPoint,
}

impl Node {
    pub fn is_warehouse(&self) -> bool {
        self.role == NodeRole::Warehouse
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_coordinates() {
        assert!(LocationPoint::new(39.9, 116.4).is_ok());
        assert!(LocationPoint::new(-90.0, 180.0).is_ok());
        assert!(LocationPoint::new(0.0, 0.0).is_ok());
    }

    #[test]
    fn test_rejects_out_of_range() {
        assert!(LocationPoint::new(90.1, 0.0).is_err());
        assert!(LocationPoint::new(0.0, -180.5).is_err());
    }

    #[test]
    fn test_rejects_non_finite() {
        assert!(LocationPoint::new(f64::NAN, 0.0).is_err());
        assert!(LocationPoint::new(0.0, f64::INFINITY).is_err());
    }
}
