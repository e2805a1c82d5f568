// ==========================================
// 生鲜物资调配模拟系统 - 分配记录领域模型
// ==========================================
// 职责: 策略输出的逐项履约决策
// 红线: 零分配是一等结果, 不是错误
// ==========================================

use crate::domain::types::StrategyTag;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ==========================================
// BatchDraw - 单批次扣减明细
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchDraw {
    pub batch_id: String,
    pub quantity_kg: f64,
    pub freshness_at_dispatch_pct: f64, // 发货时刻新鲜度 (FreshnessCore 重算值)
}

// ==========================================
// AllocationRecord - 分配记录
// ==========================================
// 不变量: 0 <= allocated_kg <= required_kg;
//         同一批次在单次运行内的累计扣减不超过其期初数量
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationRecord {
    pub request_id: String,
    pub food_type: String,
    pub required_kg: f64,
    pub allocated_kg: f64,
    /// 供货仓库; 无任何合格仓库时为 None
    pub source_warehouse_id: Option<String>,
    /// 请求方到(候选)仓库的距离; 零分配记录仍可携带最近候选距离供报表使用
    pub distance_km: Option<f64>,
    pub dispatch_time: DateTime<Utc>,
    pub draws: Vec<BatchDraw>,
    pub strategy: StrategyTag,
    /// 预测策略的综合得分; 基线策略恒为 None
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}

impl AllocationRecord {
    /// 是否完全履约
    pub fn is_fully_allocated(&self) -> bool {
        self.allocated_kg + 1e-9 >= self.required_kg
    }

    /// 本记录扣减明细的平均新鲜度; 无扣减时为 None
    pub fn mean_draw_freshness_pct(&self) -> Option<f64> {
        if self.draws.is_empty() {
            return None;
        }
        let sum: f64 = self.draws.iter().map(|d| d.freshness_at_dispatch_pct).sum();
        Some(sum / self.draws.len() as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_mean_draw_freshness() {
        let record = AllocationRecord {
            request_id: "R001".to_string(),
            food_type: "rice".to_string(),
            required_kg: 50.0,
            allocated_kg: 50.0,
            source_warehouse_id: Some("W001".to_string()),
            distance_km: Some(10.0),
            dispatch_time: Utc.with_ymd_and_hms(2025, 6, 1, 20, 0, 0).unwrap(),
            draws: vec![
                BatchDraw { batch_id: "B1".to_string(), quantity_kg: 30.0, freshness_at_dispatch_pct: 90.0 },
                BatchDraw { batch_id: "B2".to_string(), quantity_kg: 20.0, freshness_at_dispatch_pct: 70.0 },
            ],
            strategy: StrategyTag::Regular,
            score: None,
        };
        assert!((record.mean_draw_freshness_pct().unwrap() - 80.0).abs() < 1e-9);
        assert!(record.is_fully_allocated());
    }

    #[test]
    fn test_zero_allocation_record() {
        let record = AllocationRecord {
            request_id: "R002".to_string(),
            food_type: "milk".to_string(),
            required_kg: 30.0,
            allocated_kg: 0.0,
            source_warehouse_id: None,
            distance_km: Some(8.0),
            dispatch_time: Utc.with_ymd_and_hms(2025, 6, 1, 20, 0, 0).unwrap(),
            draws: vec![],
            strategy: StrategyTag::Predictive,
            score: None,
        };
        assert!(record.mean_draw_freshness_pct().is_none());
        assert!(!record.is_fully_allocated());
    }
}
