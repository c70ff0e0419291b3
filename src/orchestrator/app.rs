//! 应用运行器 - 编排层
//!
//! ## 职责
//!
//! 1. **启动检查**：确认 API key 已配置
//! 2. **读取输入**：压缩包、题目文本、可选的评分标准
//! 3. **消费事件流**：把 Progress / Result / Error 翻译成日志和结果集
//! 4. **收尾**：输出统计并导出 xlsx / CSV

use std::fs;
use std::sync::Arc;

use anyhow::Result;
use tracing::{error, info, warn};

use crate::clients::LlmClient;
use crate::config::Config;
use crate::error::{AppError, ConfigError};
use crate::models::GradingEvent;
use crate::orchestrator::archive_processor;
use crate::services::{GradingService, GradingStats, ReportWriter};

/// 应用主结构
pub struct App {
    config: Config,
}

impl App {
    /// 初始化应用
    ///
    /// API key 缺失时直接失败，避免跑到一半才发现鉴权错误。
    pub fn initialize(config: Config) -> Result<Self> {
        if config.llm_api_key.is_empty() {
            return Err(AppError::Config(ConfigError::EnvVarNotFound {
                var_name: "GROQ_API_KEY".to_string(),
            })
            .into());
        }
        Ok(Self { config })
    }

    /// 运行一次完整的评分
    ///
    /// # 参数
    /// - `zip_path`: 学生作业压缩包路径
    /// - `soal_path`: 题目文本文件路径
    /// - `kriteria_path`: 附加评分标准文件路径（可选）
    pub async fn run(
        &self,
        zip_path: &str,
        soal_path: &str,
        kriteria_path: Option<&str>,
    ) -> Result<()> {
        log_startup(&self.config);

        let zip_bytes =
            fs::read(zip_path).map_err(|e| AppError::file_read_failed(zip_path, e))?;
        let soal_text =
            fs::read_to_string(soal_path).map_err(|e| AppError::file_read_failed(soal_path, e))?;
        let kriteria_text = match kriteria_path {
            Some(path) => {
                fs::read_to_string(path).map_err(|e| AppError::file_read_failed(path, e))?
            }
            None => String::new(),
        };

        let client = LlmClient::new(&self.config);
        let service = Arc::new(GradingService::new(client, &self.config));
        let mut rx =
            archive_processor::grade_archive(service, zip_bytes, soal_text, kriteria_text);

        let mut records = Vec::new();
        while let Some(event) = rx.recv().await {
            match event {
                GradingEvent::Progress {
                    current,
                    total,
                    file_name,
                } => {
                    info!("📄 正在评分 {}/{}: {}", current, total, file_name);
                }
                GradingEvent::Result { record } => {
                    info!("✓ {} 得分: {}", record.file_name, record.score);
                    records.push(record);
                }
                GradingEvent::Error { message } => {
                    error!("❌ 评分中止: {}", message);
                    anyhow::bail!(message);
                }
            }
        }

        if records.is_empty() {
            warn!("⚠️ 压缩包中没有可评分的文件，程序结束");
            return Ok(());
        }

        let stats = GradingStats::from_records(&records);
        log_final_stats(&stats);

        let writer = ReportWriter::new(&self.config);
        let xlsx_path = writer.write_xlsx(&records, &self.config.llm_model_name)?;
        let csv_path = writer.write_csv(&records)?;
        info!("📁 结果已导出:");
        info!("   xlsx: {}", xlsx_path.display());
        info!("   csv:  {}", csv_path.display());

        Ok(())
    }
}

// ========== 日志辅助函数 ==========

fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 自动代码评分");
    info!("🤖 模型: {} (temperature {})", config.llm_model_name, config.llm_temperature);
    info!("🔁 每个文件最多尝试 {} 次", config.max_grading_attempts);
    info!("{}", "=".repeat(60));
}

fn log_final_stats(stats: &GradingStats) {
    info!("\n{}", "=".repeat(60));
    info!("📊 评分完成统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("📁 文件总数: {}", stats.total);
    info!("📈 平均分: {:.1}", stats.average);
    info!("🏆 最高分: {} / 📉 最低分: {}", stats.highest, stats.lowest);
    info!(
        "等级分布: A(85-100): {} | B(70-84): {} | C(50-69): {} | D(<50): {}",
        stats.grade_a, stats.grade_b, stats.grade_c, stats.grade_d
    );
    info!("{}", "=".repeat(60));
}
