//! 评分服务 - 业务能力层
//!
//! 只负责"单个文件评分"能力，不关心流程：
//! - 组装用户消息（文件名 + 代码）
//! - 调用聊天补全后端
//! - 校验并解析回复中的 JSON
//! - 输出格式错误时重试，重试耗尽后降级为占位记录
//!
//! LLM 输出格式错误永远不会以 `Err` 的形式离开本模块；
//! 网络 / 鉴权等传输层错误则原样向上传播，由编排层处理。

use std::future::Future;
use std::time::Duration;

use anyhow::Result;
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::LlmError;
use crate::models::GradingRecord;
use crate::services::extract::extract_json_block;
use crate::utils::truncate_text;

/// 失败反馈中保留的原始回复字符数
const RAW_OUTPUT_PREVIEW_CHARS: usize = 200;

/// 聊天补全后端
///
/// 评分服务通过该接口调用 LLM；测试中用脚本化的假后端替换，
/// 从而在不访问网络的情况下覆盖重试路径。
pub trait ChatBackend: Send + Sync {
    /// 发送一次 system + user 消息的聊天请求，返回回复正文
    fn complete(
        &self,
        system_prompt: &str,
        user_message: &str,
    ) -> impl Future<Output = Result<String>> + Send;
}

/// 评分服务
///
/// 职责：
/// - 对单个文件发起评分请求并校验输出
/// - 管理"格式错误 → 重试 → 降级"状态机
/// - 不出现压缩包和事件流的概念
pub struct GradingService<B: ChatBackend> {
    backend: B,
    /// 总尝试次数（含首次）
    max_attempts: u32,
    /// 两次尝试之间的等待时长
    retry_delay: Duration,
}

impl<B: ChatBackend> GradingService<B> {
    /// 按配置创建评分服务
    pub fn new(backend: B, config: &Config) -> Self {
        Self {
            backend,
            max_attempts: config.max_grading_attempts,
            retry_delay: Duration::from_secs(config.retry_delay_secs),
        }
    }

    /// 使用自定义重试参数创建（测试注入零延迟）
    pub fn with_retry(backend: B, max_attempts: u32, retry_delay: Duration) -> Self {
        Self {
            backend,
            max_attempts,
            retry_delay,
        }
    }

    /// 对单个文件评分
    ///
    /// # 参数
    /// - `system_prompt`: 整次运行共享的评分提示词
    /// - `file_name`: 文件名（进入用户消息，也用于占位记录）
    /// - `source_code`: 解码后的源代码文本
    ///
    /// # 返回
    /// 成功解析或重试耗尽都返回 `Ok(GradingRecord)`；
    /// 只有传输层失败才返回 `Err`。
    pub async fn grade(
        &self,
        system_prompt: &str,
        file_name: &str,
        source_code: &str,
    ) -> Result<GradingRecord> {
        let user_content = format!(
            "Nama File: {}\n\nKode Program:\n```\n{}\n```",
            file_name, source_code
        );

        let mut raw_output = String::new();

        for attempt in 1..=self.max_attempts {
            raw_output = self.backend.complete(system_prompt, &user_content).await?;

            match parse_grading_reply(&raw_output) {
                Ok(record) => {
                    debug!("文件 {} 第 {} 次尝试评分成功", file_name, attempt);
                    return Ok(record);
                }
                Err(e) => {
                    warn!(
                        "第 {}/{} 次尝试: 解析 {} 的评分输出失败: {}",
                        attempt, self.max_attempts, file_name, e
                    );
                    if attempt < self.max_attempts {
                        tokio::time::sleep(self.retry_delay).await;
                    }
                }
            }
        }

        Ok(GradingRecord::failed(
            file_name,
            format!(
                "GAGAL DIPROSES: Output dari AI bukan JSON yang valid setelah {} percobaan. Output mentah: {}",
                self.max_attempts,
                truncate_text(&raw_output, RAW_OUTPUT_PREVIEW_CHARS)
            ),
        ))
    }
}

/// 校验并解析一次 LLM 回复
///
/// 定位 JSON 块 → 按四字段结构解析（含 nilai 整数强转）。
/// 任何一步失败都算一次格式错误，由调用方决定是否重试。
pub fn parse_grading_reply(raw_reply: &str) -> Result<GradingRecord, LlmError> {
    let json_str = extract_json_block(raw_reply).ok_or(LlmError::JsonBlockMissing)?;
    serde_json::from_str(json_str).map_err(|e| LlmError::JsonParseFailed {
        source: Box::new(e),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;

    /// 按脚本依次吐出回复的假后端
    struct ScriptedBackend {
        replies: Mutex<VecDeque<Result<String, String>>>,
        calls: AtomicU32,
    }

    impl ScriptedBackend {
        fn new(replies: Vec<Result<String, String>>) -> Self {
            Self {
                replies: Mutex::new(replies.into()),
                calls: AtomicU32::new(0),
            }
        }

        fn call_count(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl ChatBackend for ScriptedBackend {
        fn complete(
            &self,
            _system_prompt: &str,
            _user_message: &str,
        ) -> impl Future<Output = Result<String>> + Send {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let next = self
                .replies
                .lock()
                .unwrap()
                .pop_front()
                .expect("脚本回复数量不足");
            async move { next.map_err(|msg| anyhow::anyhow!(msg)) }
        }
    }

    fn service_with(replies: Vec<Result<String, String>>) -> GradingService<ScriptedBackend> {
        GradingService::with_retry(ScriptedBackend::new(replies), 3, Duration::ZERO)
    }

    const VALID_REPLY: &str =
        r#"{"nama_file":"a.py","nilai":90,"kesalahan":"","feedback":"Baik"}"#;

    #[tokio::test]
    async fn test_valid_reply_short_circuits_retry() {
        let service = service_with(vec![Ok(VALID_REPLY.to_string())]);

        let record = service.grade("prompt", "a.py", "print(1)").await.unwrap();

        assert_eq!(record.file_name, "a.py");
        assert_eq!(record.score, 90);
        assert_eq!(service.backend.call_count(), 1);
    }

    #[tokio::test]
    async fn test_json_embedded_in_prose_is_accepted() {
        let reply = format!("Berikut hasilnya:\n```json\n{}\n```\nSelesai.", VALID_REPLY);
        let service = service_with(vec![Ok(reply)]);

        let record = service.grade("prompt", "a.py", "code").await.unwrap();

        assert_eq!(record.score, 90);
        assert_eq!(record.feedback, "Baik");
    }

    #[tokio::test]
    async fn test_numeric_string_score_is_coerced() {
        let reply = r#"{"nama_file":"a.py","nilai":"87","kesalahan":"x","feedback":"y"}"#;
        let service = service_with(vec![Ok(reply.to_string())]);

        let record = service.grade("prompt", "a.py", "code").await.unwrap();

        assert_eq!(record.score, 87);
    }

    #[tokio::test]
    async fn test_malformed_then_valid_succeeds_on_third_attempt() {
        let service = service_with(vec![
            Ok("bukan json".to_string()),
            Ok(r#"{"nama_file":"a.py","nilai":"bad","kesalahan":"","feedback":""}"#.to_string()),
            Ok(VALID_REPLY.to_string()),
        ]);

        let record = service.grade("prompt", "a.py", "code").await.unwrap();

        assert_eq!(record.score, 90);
        assert_eq!(service.backend.call_count(), 3);
    }

    #[tokio::test]
    async fn test_all_malformed_degrades_to_failure_record() {
        let service = service_with(vec![
            Ok("tidak ada json 1".to_string()),
            Ok("tidak ada json 2".to_string()),
            Ok("tidak ada json terakhir".to_string()),
        ]);

        let record = service.grade("prompt", "a.py", "code").await.unwrap();

        assert_eq!(record.file_name, "a.py");
        assert_eq!(record.score, 0);
        assert_eq!(record.error_summary, "GAGAL proses");
        assert!(record.feedback.starts_with("GAGAL DIPROSES"));
        // 诊断信息包含最后一次的原始回复
        assert!(record.feedback.contains("tidak ada json terakhir"));
        assert_eq!(service.backend.call_count(), 3);
    }

    #[tokio::test]
    async fn test_failure_feedback_truncates_raw_output() {
        let long_reply = "x".repeat(500);
        let service = service_with(vec![
            Ok(long_reply.clone()),
            Ok(long_reply.clone()),
            Ok(long_reply),
        ]);

        let record = service.grade("prompt", "a.py", "code").await.unwrap();

        // 只保留前 200 个字符
        assert!(record.feedback.contains(&"x".repeat(200)));
        assert!(!record.feedback.contains(&"x".repeat(201)));
    }

    #[tokio::test]
    async fn test_transport_error_propagates() {
        let service = service_with(vec![Err("connection refused".to_string())]);

        let result = service.grade("prompt", "a.py", "code").await;

        assert!(result.is_err());
        assert_eq!(service.backend.call_count(), 1);
    }

    #[test]
    fn test_parse_grading_reply_rejects_missing_field() {
        let raw = r#"{"nama_file":"a.py","nilai":90,"kesalahan":""}"#;
        assert!(parse_grading_reply(raw).is_err());
    }

    #[test]
    fn test_parse_grading_reply_rejects_plain_text() {
        assert!(matches!(
            parse_grading_reply("tidak ada blok"),
            Err(LlmError::JsonBlockMissing)
        ));
    }
}
