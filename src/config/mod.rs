// ==========================================
// 生鲜物资调配模拟系统 - 配置层
// ==========================================
// 职责: 预测策略参数 (外部注入, 带参考默认值)
// 红线: 配置非法属于可报错场景 (对比运行唯一的错误来源)
// ==========================================

use crate::engine::error::EngineError;
use serde::{Deserialize, Serialize};

// ==========================================
// PredictiveConfig - 预测策略配置
// ==========================================
/// 参考行为默认值 (与演示系统一致):
/// 严格新鲜度门槛 55 / 宽松门槛 25 / Top-K 8 / 硬距离上限 450km /
/// 首选距离 250km / 距离衰减 35km / 余量缓冲 2h /
/// 新鲜度权重 0.6 / 距离权重 0.4 / 预测加成 1.2
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictiveConfig {
    /// 严格档: 送达新鲜度下限 (%)
    #[serde(default = "default_preferred_min_freshness")]
    pub preferred_min_delivered_freshness_pct: f64,

    /// 宽松档: 送达新鲜度下限 (%)
    #[serde(default = "default_relaxed_min_freshness")]
    pub relaxed_min_delivered_freshness_pct: f64,

    /// 候选仓库搜索宽度
    #[serde(default = "default_top_k")]
    pub top_k_warehouses: usize,

    /// 硬距离上限 (km), 超出即不候选
    #[serde(default = "default_hard_max_distance")]
    pub hard_max_distance_km: f64,

    /// 首选距离 (km); 配置契约保留项, 参考评分路径未消费
    #[serde(default = "default_preferred_max_distance")]
    pub preferred_max_distance_km: f64,

    /// 距离得分衰减常数 (km)
    #[serde(default = "default_distance_decay")]
    pub distance_decay_km: f64,

    /// 运输存活检查的保质期余量缓冲 (小时)
    #[serde(default = "default_min_remaining_buffer")]
    pub min_remaining_buffer_hours: f64,

    /// 新鲜度权重
    #[serde(default = "default_freshness_weight")]
    pub freshness_weight: f64,

    /// 距离权重
    #[serde(default = "default_distance_weight")]
    pub distance_weight: f64,

    /// 预测优先仓库的得分乘数
    #[serde(default = "default_forecast_priority_boost")]
    pub forecast_priority_boost: f64,
}

fn default_preferred_min_freshness() -> f64 {
    55.0
}
fn default_relaxed_min_freshness() -> f64 {
    25.0
}
fn default_top_k() -> usize {
    8
}
fn default_hard_max_distance() -> f64 {
    450.0
}
fn default_preferred_max_distance() -> f64 {
    250.0
}
fn default_distance_decay() -> f64 {
    35.0
}
fn default_min_remaining_buffer() -> f64 {
    2.0
}
fn default_freshness_weight() -> f64 {
    0.6
}
fn default_distance_weight() -> f64 {
    0.4
}
fn default_forecast_priority_boost() -> f64 {
    1.2
}

impl Default for PredictiveConfig {
    fn default() -> Self {
        Self {
            preferred_min_delivered_freshness_pct: default_preferred_min_freshness(),
            relaxed_min_delivered_freshness_pct: default_relaxed_min_freshness(),
            top_k_warehouses: default_top_k(),
            hard_max_distance_km: default_hard_max_distance(),
            preferred_max_distance_km: default_preferred_max_distance(),
            distance_decay_km: default_distance_decay(),
            min_remaining_buffer_hours: default_min_remaining_buffer(),
            freshness_weight: default_freshness_weight(),
            distance_weight: default_distance_weight(),
            forecast_priority_boost: default_forecast_priority_boost(),
        }
    }
}

impl PredictiveConfig {
    /// 配置校验
    ///
    /// # 规则
    /// - 两档新鲜度门槛 ∈ [0, 100], 且宽松档 <= 严格档
    /// - top_k >= 1
    /// - 距离上限 / 衰减常数 > 0
    /// - 权重 / 缓冲 / 加成为非负有限值
    pub fn validate(&self) -> Result<(), EngineError> {
        let pct_ok = |v: f64| v.is_finite() && (0.0..=100.0).contains(&v);
        if !pct_ok(self.preferred_min_delivered_freshness_pct) {
            return Err(invalid(
                "preferred_min_delivered_freshness_pct",
                "应在 [0, 100] 内",
            ));
        }
        if !pct_ok(self.relaxed_min_delivered_freshness_pct) {
            return Err(invalid(
                "relaxed_min_delivered_freshness_pct",
                "应在 [0, 100] 内",
            ));
        }
        if self.relaxed_min_delivered_freshness_pct > self.preferred_min_delivered_freshness_pct {
            return Err(invalid(
                "relaxed_min_delivered_freshness_pct",
                "宽松档门槛不得高于严格档",
            ));
        }
        if self.top_k_warehouses == 0 {
            return Err(invalid("top_k_warehouses", "应 >= 1"));
        }
        for (field, value) in [
            ("hard_max_distance_km", self.hard_max_distance_km),
            ("preferred_max_distance_km", self.preferred_max_distance_km),
            ("distance_decay_km", self.distance_decay_km),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(invalid(field, "应为正数"));
            }
        }
        for (field, value) in [
            ("min_remaining_buffer_hours", self.min_remaining_buffer_hours),
            ("freshness_weight", self.freshness_weight),
            ("distance_weight", self.distance_weight),
            ("forecast_priority_boost", self.forecast_priority_boost),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(invalid(field, "应为非负数"));
            }
        }
        Ok(())
    }
}

fn invalid(field: &str, message: &str) -> EngineError {
    EngineError::InvalidConfig {
        field: field.to_string(),
        message: message.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_reference_behavior() {
        let cfg = PredictiveConfig::default();
        assert_eq!(cfg.preferred_min_delivered_freshness_pct, 55.0);
        assert_eq!(cfg.relaxed_min_delivered_freshness_pct, 25.0);
        assert_eq!(cfg.top_k_warehouses, 8);
        assert_eq!(cfg.hard_max_distance_km, 450.0);
        assert_eq!(cfg.distance_decay_km, 35.0);
        assert_eq!(cfg.min_remaining_buffer_hours, 2.0);
        assert_eq!(cfg.freshness_weight, 0.6);
        assert_eq!(cfg.distance_weight, 0.4);
        assert_eq!(cfg.forecast_priority_boost, 1.2);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let cfg: PredictiveConfig = serde_json::from_str(r#"{"top_k_warehouses": 3}"#).unwrap();
        assert_eq!(cfg.top_k_warehouses, 3);
        assert_eq!(cfg.hard_max_distance_km, 450.0);
    }

    #[test]
    fn test_validate_rejects_malformed() {
        let mut cfg = PredictiveConfig::default();
        cfg.relaxed_min_delivered_freshness_pct = 80.0; // 高于严格档
        assert!(cfg.validate().is_err());

        let mut cfg = PredictiveConfig::default();
        cfg.top_k_warehouses = 0;
        assert!(cfg.validate().is_err());

        let mut cfg = PredictiveConfig::default();
        cfg.distance_decay_km = -1.0;
        assert!(cfg.validate().is_err());

        let mut cfg = PredictiveConfig::default();
        cfg.freshness_weight = f64::NAN;
        assert!(cfg.validate().is_err());
    }
}
