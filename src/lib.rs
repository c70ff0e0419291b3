//! # Penilai Otomatis
//!
//! 一个自动批改学生代码的 Rust 应用程序：上传题目、评分标准和
//! 学生作业压缩包，逐个调用 LLM 评分，实时推送结果并导出表格。
//!
//! ## 架构设计
//!
//! 本系统采用分层架构：
//!
//! ### ① 客户端层（Clients）
//! - `clients/` - 封装外部 API 调用
//! - `LlmClient` - chat-completion 客户端（兼容 OpenAI API，如 Groq）
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，只处理单个文件
//! - `prompt` - 构建评分 system prompt
//! - `extract` - 从 LLM 回复中定位 JSON 块
//! - `GradingService` - 单文件评分（校验 + 重试 + 降级）
//! - `ReportWriter` - 导出 xlsx / CSV 与统计
//!
//! ### ③ 编排层（Orchestration）
//! - `orchestrator/archive_processor` - 压缩包评分处理器，驱动事件流
//! - `orchestrator/app` - 应用运行器，消费事件流
//!
//! ## 事件流
//!
//! `grade_archive` 返回一个有界通道接收端，依次收到
//! `Progress` / `Result` 事件，压缩包级错误以单个 `Error` 事件终止流。

pub mod clients;
pub mod config;
pub mod error;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;

// 重新导出常用类型
pub use clients::LlmClient;
pub use config::Config;
pub use error::{AppError, AppResult};
pub use models::{GradingEvent, GradingRecord};
pub use orchestrator::{grade_archive, App};
pub use services::{ChatBackend, GradingService, GradingStats, ReportWriter};
