// ==========================================
// 生鲜物资调配模拟系统 - 新鲜度纯函数库
// ==========================================
// 职责: 批次 × 时刻 → 新鲜度百分比的衰减模型
// 红线: 无状态、无副作用、无 I/O 操作;
//       新鲜度永远重算, 不信任快照携带值
// ==========================================

use crate::domain::batch::Batch;
use chrono::{DateTime, Utc};

/// 默认环境温度 (摄氏度)
pub const DEFAULT_AMBIENT_TEMP_C: f64 = 25.0;

/// 风险阈值: 新鲜度低于此值视为"临期"
pub const AT_RISK_THRESHOLD_PCT: f64 = 20.0;

// ==========================================
// FreshnessEval - 新鲜度评估结果
// ==========================================
/// 评估结果带 `unbounded` 标记:
/// 保质期非正或生产时间缺失时按"永不过期"返回 100,
/// 但必须显式打标, 避免坏数据被 100 悄悄掩盖
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FreshnessEval {
    pub pct: f64,
    pub unbounded: bool,
}

// ==========================================
// FreshnessCore - 纯函数工具类
// ==========================================
pub struct FreshnessCore;

impl FreshnessCore {
    /// 计算指定时刻的新鲜度百分比
    ///
    /// # 规则
    /// - elapsed_hours = max(0, at - manufacture_time)
    /// - temp_factor = 1 + max(0, (ambient_temp_c - 20) / 10) * 0.5
    /// - raw = 100 - elapsed_hours / shelf_life_hours * 100 * temp_factor
    /// - 结果钳制到 [0, 100]
    ///
    /// # 特例
    /// shelf_life_hours <= 0 或 manufacture_time 缺失
    /// → pct=100, unbounded=true (宽松处理, 不报错)
    pub fn freshness_pct(batch: &Batch, at: DateTime<Utc>, ambient_temp_c: f64) -> FreshnessEval {
        let manufacture = match batch.manufacture_time {
            Some(t) if batch.shelf_life_hours > 0.0 => t,
            _ => return FreshnessEval { pct: 100.0, unbounded: true },
        };

        let elapsed_hours = ((at - manufacture).num_seconds() as f64 / 3600.0).max(0.0);
        let temp_factor = 1.0 + ((ambient_temp_c - 20.0) / 10.0).max(0.0) * 0.5;
        let raw = 100.0 - elapsed_hours / batch.shelf_life_hours * 100.0 * temp_factor;

        FreshnessEval {
            pct: raw.clamp(0.0, 100.0),
            unbounded: false,
        }
    }

    /// 默认温度 (25℃) 下的新鲜度
    pub fn freshness_pct_default(batch: &Batch, at: DateTime<Utc>) -> FreshnessEval {
        Self::freshness_pct(batch, at, DEFAULT_AMBIENT_TEMP_C)
    }

    /// 是否已变质 (新鲜度 <= 0)
    pub fn is_spoiled(batch: &Batch, at: DateTime<Utc>) -> bool {
        let eval = Self::freshness_pct_default(batch, at);
        !eval.unbounded && eval.pct <= 0.0
    }

    /// 是否临期 (0 < 新鲜度 < 20)
    pub fn is_at_risk(batch: &Batch, at: DateTime<Utc>) -> bool {
        let eval = Self::freshness_pct_default(batch, at);
        !eval.unbounded && eval.pct > 0.0 && eval.pct < AT_RISK_THRESHOLD_PCT
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::BatchStatus;
    use chrono::{Duration, TimeZone};

    fn batch(shelf_life_hours: f64, manufacture: Option<DateTime<Utc>>) -> Batch {
        Batch {
            id: "B001".to_string(),
            food_type: "milk".to_string(),
            quantity_kg: 40.0,
            original_quantity_kg: 40.0,
            current_node_id: "W001".to_string(),
            status: BatchStatus::Stored,
            manufacture_time: manufacture,
            shelf_life_hours,
            advisory_freshness_pct: None,
        }
    }

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 8, 0, 0).unwrap()
    }

    #[test]
    fn test_fresh_at_manufacture() {
        let b = batch(48.0, Some(t0()));
        let eval = FreshnessCore::freshness_pct_default(&b, t0());
        assert!((eval.pct - 100.0).abs() < 1e-9);
        assert!(!eval.unbounded);
    }

    #[test]
    fn test_decay_with_temp_factor() {
        // 25℃ → temp_factor = 1.25; 24h/48h → raw = 100 - 50*1.25 = 37.5
        let b = batch(48.0, Some(t0()));
        let eval = FreshnessCore::freshness_pct_default(&b, t0() + Duration::hours(24));
        assert!((eval.pct - 37.5).abs() < 1e-9);
    }

    #[test]
    fn test_cool_ambient_no_penalty() {
        // 20℃ 及以下无温度惩罚
        let b = batch(48.0, Some(t0()));
        let eval = FreshnessCore::freshness_pct(&b, t0() + Duration::hours(24), 18.0);
        assert!((eval.pct - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_clamped_to_zero() {
        let b = batch(48.0, Some(t0()));
        let eval = FreshnessCore::freshness_pct_default(&b, t0() + Duration::hours(500));
        assert_eq!(eval.pct, 0.0);
    }

    #[test]
    fn test_future_manufacture_clamped_to_full() {
        // at < manufacture_time → elapsed 按 0 处理
        let b = batch(48.0, Some(t0()));
        let eval = FreshnessCore::freshness_pct_default(&b, t0() - Duration::hours(5));
        assert!((eval.pct - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_unbounded_flag_on_bad_input() {
        let no_shelf = batch(0.0, Some(t0()));
        let eval = FreshnessCore::freshness_pct_default(&no_shelf, t0());
        assert!(eval.unbounded);
        assert_eq!(eval.pct, 100.0);

        let no_manufacture = batch(48.0, None);
        assert!(FreshnessCore::freshness_pct_default(&no_manufacture, t0()).unbounded);
    }

    #[test]
    fn test_monotone_non_increasing() {
        let b = batch(72.0, Some(t0()));
        let mut prev = f64::MAX;
        for h in 0..200 {
            let eval = FreshnessCore::freshness_pct_default(&b, t0() + Duration::hours(h));
            assert!(eval.pct <= prev + 1e-12, "h={} 时新鲜度回升", h);
            prev = eval.pct;
        }
    }

    #[test]
    fn test_classification() {
        let b = batch(48.0, Some(t0()));
        // 30h: raw = 100 - 62.5*1.25 = 21.875 → 正常
        assert!(!FreshnessCore::is_at_risk(&b, t0() + Duration::hours(30)));
        // 32h: raw = 100 - 66.7*1.25 ≈ 16.7 → 临期
        assert!(FreshnessCore::is_at_risk(&b, t0() + Duration::hours(32)));
        // 48h: raw = 100 - 125 → 变质
        assert!(FreshnessCore::is_spoiled(&b, t0() + Duration::hours(48)));
        // 无界批次不参与分类
        assert!(!FreshnessCore::is_spoiled(&batch(0.0, Some(t0())), t0()));
    }
}
