// ==========================================
// 生鲜物资调配模拟系统 - 领域类型定义
// ==========================================
// 职责: 节点角色 / 批次状态 / 请求状态 / 策略标签
// 红线: 核心层只读快照状态, 不做状态流转
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 节点角色 (Node Role)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeRole {
    Farm,      // 农场 (货源)
    Warehouse, // 仓库 (中转/存储)
    Ngo,       // 公益组织 (需求方)
}

impl NodeRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeRole::Farm => "farm",
            NodeRole::Warehouse => "warehouse",
            NodeRole::Ngo => "ngo",
        }
    }
}

impl fmt::Display for NodeRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ==========================================
// 批次状态 (Batch Status)
// ==========================================
// 红线: 核心只消费 Stored 批次, 其余状态仅透传
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchStatus {
    Stored,    // 在库
    Reserved,  // 已预留
    InTransit, // 运输中
    Expired,   // 已过期 (数据层标记, 核心不依赖)
}

impl BatchStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BatchStatus::Stored => "stored",
            BatchStatus::Reserved => "reserved",
            BatchStatus::InTransit => "in_transit",
            BatchStatus::Expired => "expired",
        }
    }
}

impl fmt::Display for BatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ==========================================
// 请求状态 (Request Status)
// ==========================================
// 核心层视所有输入请求为 Pending, 状态字段只读透传
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    Pending,
    PartiallyFulfilled,
    Fulfilled,
    Cancelled,
}

impl RequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::Pending => "pending",
            RequestStatus::PartiallyFulfilled => "partially_fulfilled",
            RequestStatus::Fulfilled => "fulfilled",
            RequestStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ==========================================
// 策略标签 (Strategy Tag)
// ==========================================
// 用途: 标记分配记录由哪个策略产生
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyTag {
    Regular,    // 基线策略: 最近仓库 + 先进先出
    Predictive, // 预测策略: 候选评分 + 新鲜度门槛
}

impl StrategyTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            StrategyTag::Regular => "regular",
            StrategyTag::Predictive => "predictive",
        }
    }

    pub fn title_cn(&self) -> &'static str {
        match self {
            StrategyTag::Regular => "基线方案",
            StrategyTag::Predictive => "预测方案",
        }
    }
}

impl Default for StrategyTag {
    fn default() -> Self {
        StrategyTag::Regular
    }
}

impl fmt::Display for StrategyTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for StrategyTag {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "regular" => Ok(StrategyTag::Regular),
            "predictive" => Ok(StrategyTag::Predictive),
            other => Err(format!("未知策略标签: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_strategy_tag_roundtrip() {
        assert_eq!(StrategyTag::from_str("regular").unwrap(), StrategyTag::Regular);
        assert_eq!(StrategyTag::from_str("Predictive").unwrap(), StrategyTag::Predictive);
        assert!(StrategyTag::from_str("greedy").is_err());
        assert_eq!(StrategyTag::Predictive.as_str(), "predictive");
    }

    #[test]
    fn test_serde_snake_case() {
        let json = serde_json::to_string(&BatchStatus::InTransit).unwrap();
        assert_eq!(json, "\"in_transit\"");
        let back: BatchStatus = serde_json::from_str(&json).unwrap();
        assert_eq!(back, BatchStatus::InTransit);
    }
}
