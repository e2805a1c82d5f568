// ==========================================
// 生鲜物资调配模拟系统 - 需求请求领域模型
// ==========================================
// 红线: 请求项按输入顺序处理 (顺序影响稀缺库存归属),
//       核心不得对 items 做集合化/重排
// ==========================================

use crate::domain::types::RequestStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ==========================================
// RequestItem - 单项需求
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestItem {
    pub food_type: String,
    pub required_kg: f64, // 应 > 0
}

// ==========================================
// Request - 需求请求
// ==========================================
// 状态对核心只读; 输入的请求一律按 Pending 处理
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Request {
    pub id: String,
    pub requester_node_id: String,
    pub items: Vec<RequestItem>, // 有序
    pub created_at: DateTime<Utc>,
    pub required_before: Option<DateTime<Utc>>,
    pub status: RequestStatus,
}

impl Request {
    /// 请求总需求量 (千克)
    pub fn total_required_kg(&self) -> f64 {
        self.items.iter().map(|item| item.required_kg).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_total_required() {
        let req = Request {
            id: "R001".to_string(),
            requester_node_id: "N001".to_string(),
            items: vec![
                RequestItem { food_type: "rice".to_string(), required_kg: 50.0 },
                RequestItem { food_type: "milk".to_string(), required_kg: 20.0 },
            ],
            created_at: Utc.with_ymd_and_hms(2025, 6, 1, 8, 0, 0).unwrap(),
            required_before: None,
            status: RequestStatus::Pending,
        };
        assert!((req.total_required_kg() - 70.0).abs() < 1e-9);
    }
}
