//! 评分结果数据模型
//!
//! LLM 返回的 JSON 使用印尼语字段名（`nama_file` / `nilai` / `kesalahan` /
//! `feedback`），这是产品约定的线上格式，导出文件也沿用该格式。

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// 单个文件的评分结果
///
/// 四个字段缺一不可，缺失任何一个都视为 LLM 输出格式错误。
/// `score` 不做 [0, 100] 范围裁剪，保持 LLM 的原始输出。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GradingRecord {
    /// 被评分的文件名（压缩包内的条目路径）
    #[serde(rename = "nama_file")]
    pub file_name: String,
    /// 分数，满分 100，按错误扣分
    #[serde(rename = "nilai", deserialize_with = "deserialize_score")]
    pub score: i64,
    /// 程序中发现的错误描述（可能为空）
    #[serde(rename = "kesalahan")]
    pub error_summary: String,
    /// 简短的建设性反馈
    #[serde(rename = "feedback")]
    pub feedback: String,
}

impl GradingRecord {
    /// 构造一条处理失败的占位记录
    ///
    /// 用于 LLM 重试耗尽或压缩包条目无法读取的场景，
    /// 保证结果表中每个文件都有一行。
    pub fn failed(file_name: impl Into<String>, feedback: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            score: 0,
            error_summary: "GAGAL proses".to_string(),
            feedback: feedback.into(),
        }
    }
}

/// 把 `nilai` 字段强制转换为整数
///
/// LLM 偶尔会返回数字字符串（"87"）或浮点数（87.5），
/// 这两种情况按原始实现的语义分别解析和截断；
/// 其他形式（非数字字符串、数组等）视为格式错误。
fn deserialize_score<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    match value {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(i)
            } else if let Some(f) = n.as_f64() {
                Ok(f as i64)
            } else {
                Err(serde::de::Error::custom("nilai 数值超出可表示范围"))
            }
        }
        Value::String(s) => s
            .trim()
            .parse::<i64>()
            .map_err(|_| serde::de::Error::custom(format!("nilai 不是数字: {:?}", s))),
        other => Err(serde::de::Error::custom(format!(
            "nilai 必须是数字，实际为: {}",
            other
        ))),
    }
}

/// 压缩包评分流中的事件
///
/// 序列化形状与原始实现的字典一致（`type` 作为标签）。
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GradingEvent {
    /// 即将处理第 `current`/`total` 个文件（1 起始）
    Progress {
        current: usize,
        total: usize,
        file_name: String,
    },
    /// 一个文件的评分结果
    Result { record: GradingRecord },
    /// 致命错误，流到此终止
    Error { message: String },
}
