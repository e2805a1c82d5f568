// ==========================================
// 生鲜物资调配模拟系统 - 库存批次领域模型
// ==========================================
// 红线: 新鲜度是派生值, 不是权威状态;
//       输入快照中的 freshness 字段仅供参考,
//       决策一律由 FreshnessCore 重算
// ==========================================

use crate::domain::types::BatchStatus;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

// ==========================================
// Batch - 库存批次
// ==========================================
// 生命周期: 由数据层创建; 单次策略运行内 quantity_kg
// 单调递减, 归零后仅在该运行的池中消失, 不回写快照
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Batch {
    pub id: String,
    pub food_type: String,
    pub quantity_kg: f64,          // 剩余数量 (>= 0)
    pub original_quantity_kg: f64, // 入库数量
    pub current_node_id: String,
    pub status: BatchStatus,
    pub manufacture_time: Option<DateTime<Utc>>, // 缺失 => 视为"永不过期"并打标
    pub shelf_life_hours: f64,                   // 应 > 0, 非正值同样打标
    /// 数据层附带的参考新鲜度, 核心不使用
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub advisory_freshness_pct: Option<f64>,
}

impl Batch {
    /// 到期时刻 (manufacture_time + shelf_life_hours)
    ///
    /// # 返回
    /// - `Some(t)`: 正常批次
    /// - `None`: 生产时间缺失或保质期非正, 无法界定到期
    pub fn expiry_time(&self) -> Option<DateTime<Utc>> {
        if self.shelf_life_hours <= 0.0 {
            return None;
        }
        let manufacture = self.manufacture_time?;
        let minutes = (self.shelf_life_hours * 60.0).round() as i64;
        Some(manufacture + Duration::minutes(minutes))
    }

    /// 发货时刻的剩余保质期 (小时)
    ///
    /// 预测策略的"运输存活"检查基于此值, 而非新鲜度百分比。
    /// 无法界定到期的批次返回 `None`, 由调用方按"永不过期"处理。
    pub fn remaining_shelf_life_hours(&self, at: DateTime<Utc>) -> Option<f64> {
        let expiry = self.expiry_time()?;
        Some((expiry - at).num_seconds() as f64 / 3600.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn batch(shelf_life_hours: f64, manufacture: Option<DateTime<Utc>>) -> Batch {
        Batch {
            id: "B001".to_string(),
            food_type: "rice".to_string(),
            quantity_kg: 100.0,
            original_quantity_kg: 100.0,
            current_node_id: "W001".to_string(),
            status: BatchStatus::Stored,
            manufacture_time: manufacture,
            shelf_life_hours,
            advisory_freshness_pct: None,
        }
    }

    #[test]
    fn test_expiry_time() {
        let t0 = Utc.with_ymd_and_hms(2025, 6, 1, 8, 0, 0).unwrap();
        let b = batch(48.0, Some(t0));
        assert_eq!(b.expiry_time().unwrap(), t0 + Duration::hours(48));
    }

    #[test]
    fn test_unbounded_batch_has_no_expiry() {
        let t0 = Utc.with_ymd_and_hms(2025, 6, 1, 8, 0, 0).unwrap();
        assert!(batch(0.0, Some(t0)).expiry_time().is_none());
        assert!(batch(48.0, None).expiry_time().is_none());
    }

    #[test]
    fn test_remaining_shelf_life() {
        let t0 = Utc.with_ymd_and_hms(2025, 6, 1, 8, 0, 0).unwrap();
        let b = batch(48.0, Some(t0));
        let remaining = b.remaining_shelf_life_hours(t0 + Duration::hours(10)).unwrap();
        assert!((remaining - 38.0).abs() < 1e-9);
        // 已过期批次剩余为负
        let overdue = b.remaining_shelf_life_hours(t0 + Duration::hours(50)).unwrap();
        assert!(overdue < 0.0);
    }
}
