// ==========================================
// 生鲜物资调配模拟系统 - 需求预测协作方契约
// ==========================================
// 职责: 定义外部预测服务 trait, 实现依赖倒置
// 说明: Engine 层定义 trait, 外围服务层实现适配器
// 红线: 预测失败 (超时/错误/畸形响应) 一律触发
//       预测策略的整次运行降级, 绝不逐项重试
// ==========================================

use crate::domain::node::{LocationPoint, Node};
use crate::domain::request::Request;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::error::Error;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// 预测优先仓库数量 (取预测需求最高的前 3 个)
pub const PRIORITY_WAREHOUSE_COUNT: usize = 3;

// ==========================================
// 线上契约 (消费方视角)
// ==========================================

/// 预测请求: 每次对比运行调用一次, 携带全量仓库与近期请求
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastRequest {
    pub reference_time: DateTime<Utc>,
    pub warehouses: Vec<WarehouseSummary>,
    pub recent_requests: Vec<Request>,
}

/// 仓库摘要 (线上契约字段: id / name / location)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WarehouseSummary {
    pub id: String,
    pub name: String,
    pub location: LocationPoint,
}

impl WarehouseSummary {
    pub fn from_node(node: &Node) -> Self {
        Self {
            id: node.id.clone(),
            name: node.name.clone(),
            location: node.location,
        }
    }
}

/// 预测响应: 仓库 id → 预测需求得分
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastResponse {
    pub predictions: HashMap<String, f64>,
}

// ==========================================
// 预测协作方 Trait
// ==========================================

/// 需求预测提供方
///
/// Engine 层定义, 外围服务层实现 (HTTP 客户端等)。
/// 任何失败路径对核心都等价: 整次预测运行降级为基线行为。
#[async_trait]
pub trait DemandForecastProvider: Send + Sync {
    /// 预测各仓库的需求得分
    async fn predict(
        &self,
        request: ForecastRequest,
    ) -> Result<ForecastResponse, Box<dyn Error + Send + Sync>>;
}

/// 空操作预测提供方
///
/// 恒定失败, 用于驱动降级路径 (单元测试/无预测服务部署)
#[derive(Debug, Clone, Default)]
pub struct NoOpForecastProvider;

#[async_trait]
impl DemandForecastProvider for NoOpForecastProvider {
    async fn predict(
        &self,
        _request: ForecastRequest,
    ) -> Result<ForecastResponse, Box<dyn Error + Send + Sync>> {
        Err("NoOpForecastProvider: 未配置预测服务".into())
    }
}

// ==========================================
// 运行级预测解析
// ==========================================

/// 调用预测服务并解析优先仓库列表
///
/// # 返回
/// - `Some(ids)`: 预测成功, 按得分降序 (并列按 id 升序) 的前 3 个仓库
/// - `None`: 超时 / 错误 / 空响应 → 调用方整次降级
///
/// 空 predictions 视同畸形响应, 与网络失败同等处理
pub async fn resolve_priority_warehouses(
    provider: &Arc<dyn DemandForecastProvider>,
    request: ForecastRequest,
    timeout: Duration,
) -> Option<Vec<String>> {
    let response = match tokio::time::timeout(timeout, provider.predict(request)).await {
        Ok(Ok(response)) => response,
        Ok(Err(e)) => {
            warn!(error = %e, "预测服务调用失败, 整次降级");
            return None;
        }
        Err(_) => {
            warn!(timeout_ms = timeout.as_millis() as u64, "预测服务超时, 整次降级");
            return None;
        }
    };

    if response.predictions.is_empty() {
        warn!("预测响应为空, 视同畸形响应, 整次降级");
        return None;
    }

    let ids = top_priority_ids(&response.predictions);
    debug!(priority_warehouses = ?ids, "预测优先仓库解析完成");
    Some(ids)
}

/// 从预测得分导出优先仓库 id 列表
///
/// 排序键: 得分降序, 并列按 id 升序 (确定性)
pub fn top_priority_ids(predictions: &HashMap<String, f64>) -> Vec<String> {
    let mut entries: Vec<(&String, f64)> =
        predictions.iter().map(|(id, score)| (id, *score)).collect();
    entries.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.0.cmp(b.0))
    });
    entries
        .into_iter()
        .take(PRIORITY_WAREHOUSE_COUNT)
        .map(|(id, _)| id.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    /// 固定得分的测试提供方
    struct FixedForecastProvider {
        predictions: HashMap<String, f64>,
    }

    #[async_trait]
    impl DemandForecastProvider for FixedForecastProvider {
        async fn predict(
            &self,
            _request: ForecastRequest,
        ) -> Result<ForecastResponse, Box<dyn Error + Send + Sync>> {
            Ok(ForecastResponse { predictions: self.predictions.clone() })
        }
    }

    fn forecast_request() -> ForecastRequest {
        ForecastRequest {
            reference_time: Utc.with_ymd_and_hms(2025, 6, 1, 8, 0, 0).unwrap(),
            warehouses: vec![],
            recent_requests: vec![],
        }
    }

    #[test]
    fn test_top_priority_ids_ordering() {
        let mut predictions = HashMap::new();
        predictions.insert("W3".to_string(), 0.7);
        predictions.insert("W1".to_string(), 0.9);
        predictions.insert("W2".to_string(), 0.9); // 与 W1 并列, 按 id 升序
        predictions.insert("W4".to_string(), 0.1);
        assert_eq!(top_priority_ids(&predictions), vec!["W1", "W2", "W3"]);
    }

    #[tokio::test]
    async fn test_resolve_success() {
        let mut predictions = HashMap::new();
        predictions.insert("W1".to_string(), 1.0);
        let provider: Arc<dyn DemandForecastProvider> =
            Arc::new(FixedForecastProvider { predictions });
        let ids =
            resolve_priority_warehouses(&provider, forecast_request(), Duration::from_secs(1))
                .await;
        assert_eq!(ids, Some(vec!["W1".to_string()]));
    }

    #[tokio::test]
    async fn test_resolve_failure_paths() {
        // 提供方报错
        let noop: Arc<dyn DemandForecastProvider> = Arc::new(NoOpForecastProvider);
        assert!(
            resolve_priority_warehouses(&noop, forecast_request(), Duration::from_secs(1))
                .await
                .is_none()
        );

        // 空响应视同畸形
        let empty: Arc<dyn DemandForecastProvider> =
            Arc::new(FixedForecastProvider { predictions: HashMap::new() });
        assert!(
            resolve_priority_warehouses(&empty, forecast_request(), Duration::from_secs(1))
                .await
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_resolve_timeout() {
        struct SlowProvider;

        #[async_trait]
        impl DemandForecastProvider for SlowProvider {
            async fn predict(
                &self,
                _request: ForecastRequest,
            ) -> Result<ForecastResponse, Box<dyn Error + Send + Sync>> {
                tokio::time::sleep(Duration::from_secs(60)).await;
                Ok(ForecastResponse { predictions: HashMap::new() })
            }
        }

        let provider: Arc<dyn DemandForecastProvider> = Arc::new(SlowProvider);
        let ids =
            resolve_priority_warehouses(&provider, forecast_request(), Duration::from_millis(20))
                .await;
        assert!(ids.is_none());
    }
}
