// ==========================================
// 生鲜物资调配模拟系统 - 地理索引
// ==========================================
// 职责: 大圆距离 + 最近/Top-K 候选排序
// 红线: rank_by_distance 必须全函数化 ——
//       候选为空或全部超限时返回空表, 不报错
// ==========================================

use crate::domain::node::{LocationPoint, Node};

/// 地球平均半径 (km)
pub const EARTH_RADIUS_KM: f64 = 6371.0;

// ==========================================
// RankedCandidate - 距离排序候选
// ==========================================
#[derive(Debug, Clone)]
pub struct RankedCandidate<'a> {
    pub node: &'a Node,
    pub distance_km: f64,
}

// ==========================================
// GeoIndex - 地理索引
// ==========================================
pub struct GeoIndex;

impl GeoIndex {
    /// Haversine 大圆距离 (km)
    ///
    /// 对称, 非负, 同点为 0
    pub fn distance_km(a: &LocationPoint, b: &LocationPoint) -> f64 {
        let lat_a = a.lat.to_radians();
        let lat_b = b.lat.to_radians();
        let d_lat = (b.lat - a.lat).to_radians();
        let d_lon = (b.lon - a.lon).to_radians();

        let h = (d_lat / 2.0).sin().powi(2)
            + lat_a.cos() * lat_b.cos() * (d_lon / 2.0).sin().powi(2);
        2.0 * EARTH_RADIUS_KM * h.sqrt().asin()
    }

    /// 按距离升序排序候选节点
    ///
    /// # 规则
    /// - 过滤: 距离 <= hard_max_distance_km
    /// - 截断: 保留前 top_k 个
    /// - 并列: 稳定排序, 保持输入顺序
    pub fn rank_by_distance<'a>(
        origin: &LocationPoint,
        candidates: &'a [Node],
        hard_max_distance_km: f64,
        top_k: usize,
    ) -> Vec<RankedCandidate<'a>> {
        let mut ranked: Vec<RankedCandidate<'a>> = candidates
            .iter()
            .map(|node| RankedCandidate {
                node,
                distance_km: Self::distance_km(origin, &node.location),
            })
            .filter(|c| c.distance_km <= hard_max_distance_km)
            .collect();

        // sort_by 是稳定排序; 距离相等时保持输入顺序
        ranked.sort_by(|a, b| {
            a.distance_km
                .partial_cmp(&b.distance_km)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        ranked.truncate(top_k);
        ranked
    }

    /// 最近节点 (线性扫描, 并列取先出现者)
    ///
    /// 基线策略的选仓接口
    pub fn nearest<'a>(
        origin: &LocationPoint,
        candidates: &'a [Node],
    ) -> Option<RankedCandidate<'a>> {
        let mut best: Option<RankedCandidate<'a>> = None;
        for node in candidates {
            let distance_km = Self::distance_km(origin, &node.location);
            match &best {
                Some(current) if distance_km >= current.distance_km => {}
                _ => best = Some(RankedCandidate { node, distance_km }),
            }
        }
        best
    }
}
