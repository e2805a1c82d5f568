// ==========================================
// 生鲜物资调配模拟系统 - 运输时间估算
// ==========================================
// 职责: 距离 → 行驶时长 / 送达时刻
// 红线: 核心统一使用 40 km/h 常量;
//       周边系统中 60 km/h 的变体属于排除组件, 不进核心
// ==========================================

use crate::engine::error::EngineError;
use chrono::{DateTime, Duration, Timelike, Utc};

/// 核心权威平均车速 (km/h)
pub const DEFAULT_AVG_SPEED_KMH: f64 = 40.0;

/// 默认休息间隔 (小时)
pub const DEFAULT_BREAK_INTERVAL_HOURS: f64 = 4.0;

/// 默认单次休息时长 (小时)
pub const DEFAULT_BREAK_DURATION_HOURS: f64 = 0.5;

// ==========================================
// TransportEstimator - 运输估算器
// ==========================================
pub struct TransportEstimator;

impl TransportEstimator {
    /// 行驶时长 (含强制休息)
    ///
    /// # 规则
    /// - base = distance_km / avg_speed_kmh
    /// - breaks = floor(base / break_interval) * break_duration
    /// - 结果 = base + breaks
    ///
    /// # 错误
    /// 距离为负或 NaN 属调用方错误, 返回 `EngineError::NegativeDistance`
    pub fn travel_hours_with(
        distance_km: f64,
        avg_speed_kmh: f64,
        break_interval_hours: f64,
        break_duration_hours: f64,
    ) -> Result<f64, EngineError> {
        if !distance_km.is_finite() || distance_km < 0.0 {
            return Err(EngineError::NegativeDistance(distance_km));
        }
        let base_hours = distance_km / avg_speed_kmh;
        let breaks = (base_hours / break_interval_hours).floor() * break_duration_hours;
        Ok(base_hours + breaks)
    }

    /// 行驶时长 (默认参数: 40 km/h, 每 4h 休息 0.5h)
    pub fn travel_hours(distance_km: f64) -> Result<f64, EngineError> {
        Self::travel_hours_with(
            distance_km,
            DEFAULT_AVG_SPEED_KMH,
            DEFAULT_BREAK_INTERVAL_HOURS,
            DEFAULT_BREAK_DURATION_HOURS,
        )
    }

    /// ETA 变体: 夜间 (20:00 - 06:00 发车) 基础时长乘以确定性减速系数
    ///
    /// 系数 ∈ [1.2, 1.4], 由 (路线键, 发车时间戳) 的稳定混合哈希导出:
    /// 相同输入必然复现相同输出 —— 这是特性化的确定性, 不是真随机。
    /// 休息时间不参与减速放大。
    pub fn eta_travel_hours(
        distance_km: f64,
        route_key: &str,
        dispatch_time: DateTime<Utc>,
    ) -> Result<f64, EngineError> {
        if !distance_km.is_finite() || distance_km < 0.0 {
            return Err(EngineError::NegativeDistance(distance_km));
        }
        let mut base_hours = distance_km / DEFAULT_AVG_SPEED_KMH;
        let hour = dispatch_time.hour();
        if hour >= 20 || hour < 6 {
            base_hours *= Self::night_slow_factor(route_key, dispatch_time);
        }
        let breaks = (base_hours / DEFAULT_BREAK_INTERVAL_HOURS).floor()
            * DEFAULT_BREAK_DURATION_HOURS;
        Ok(base_hours + breaks)
    }

    /// 送达时刻 = 发车时刻 + 行驶时长
    pub fn delivery_time(dispatch_time: DateTime<Utc>, travel_hours: f64) -> DateTime<Utc> {
        dispatch_time + Duration::seconds((travel_hours * 3600.0).round() as i64)
    }

    /// 夜间减速系数 ∈ [1.2, 1.4]
    ///
    /// 种子 = FNV-1a(32) over (route_key 字节 + 发车 unix 秒的小端字节),
    /// 再经 murmur3 32 位终混 (0x85ebca6b / 0xc2b2ae35, 位移 16/13/16)。
    /// 测试夹具依赖这些常量, 不得替换为语言内置 RNG。
    fn night_slow_factor(route_key: &str, dispatch_time: DateTime<Utc>) -> f64 {
        let mut h: u32 = 0x811c9dc5; // FNV offset basis
        for byte in route_key
            .as_bytes()
            .iter()
            .chain(dispatch_time.timestamp().to_le_bytes().iter())
        {
            h ^= u32::from(*byte);
            h = h.wrapping_mul(0x0100_0193); // FNV prime
        }
        // murmur3 fmix32
        h ^= h >> 16;
        h = h.wrapping_mul(0x85eb_ca6b);
        h ^= h >> 13;
        h = h.wrapping_mul(0xc2b2_ae35);
        h ^= h >> 16;

        1.2 + 0.2 * (f64::from(h) / f64::from(u32::MAX))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_short_trip_no_breaks() {
        // 10km / 40km/h = 0.25h, 不足一个休息间隔
        let hours = TransportEstimator::travel_hours(10.0).unwrap();
        assert!((hours - 0.25).abs() < 1e-9);
    }

    #[test]
    fn test_breaks_added() {
        // 200km / 40 = 5h → 1 次休息 → 5.5h
        let hours = TransportEstimator::travel_hours(200.0).unwrap();
        assert!((hours - 5.5).abs() < 1e-9);
        // 400km / 40 = 10h → 2 次休息 → 11h
        let hours = TransportEstimator::travel_hours(400.0).unwrap();
        assert!((hours - 11.0).abs() < 1e-9);
    }

    #[test]
    fn test_rejects_negative_and_nan() {
        assert!(TransportEstimator::travel_hours(-1.0).is_err());
        assert!(TransportEstimator::travel_hours(f64::NAN).is_err());
    }

    #[test]
    fn test_delivery_time() {
        let dispatch = Utc.with_ymd_and_hms(2025, 6, 1, 20, 0, 0).unwrap();
        let delivery = TransportEstimator::delivery_time(dispatch, 0.25);
        assert_eq!(delivery, Utc.with_ymd_and_hms(2025, 6, 1, 20, 15, 0).unwrap());
    }

    #[test]
    fn test_night_factor_deterministic_and_bounded() {
        let dispatch = Utc.with_ymd_and_hms(2025, 6, 1, 22, 0, 0).unwrap();
        let a = TransportEstimator::eta_travel_hours(100.0, "W001->N001", dispatch).unwrap();
        let b = TransportEstimator::eta_travel_hours(100.0, "W001->N001", dispatch).unwrap();
        assert_eq!(a, b);

        let base = 100.0 / DEFAULT_AVG_SPEED_KMH;
        assert!(a >= base * 1.2 - 1e-9);
        assert!(a <= base * 1.4 + DEFAULT_BREAK_DURATION_HOURS + 1e-9);
    }

    #[test]
    fn test_night_factor_varies_with_route_key() {
        let dispatch = Utc.with_ymd_and_hms(2025, 6, 1, 23, 0, 0).unwrap();
        let a = TransportEstimator::eta_travel_hours(100.0, "W001->N001", dispatch).unwrap();
        let b = TransportEstimator::eta_travel_hours(100.0, "W002->N001", dispatch).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_daytime_no_night_factor() {
        let dispatch = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
        let eta = TransportEstimator::eta_travel_hours(10.0, "W001->N001", dispatch).unwrap();
        assert!((eta - 0.25).abs() < 1e-9);
        // 边界: 06:00 已不属于夜间
        let dawn = Utc.with_ymd_and_hms(2025, 6, 1, 6, 0, 0).unwrap();
        let eta = TransportEstimator::eta_travel_hours(10.0, "W001->N001", dawn).unwrap();
        assert!((eta - 0.25).abs() < 1e-9);
    }
}
