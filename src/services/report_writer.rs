//! 结果导出服务 - 业务能力层
//!
//! 只负责"写结果文件"能力，不关心流程：
//! - 导出 xlsx（单工作表 "Hasil Penilaian"，列宽自适应）
//! - 导出 UTF-8 CSV（表头为线上字段名）
//! - 汇总评分统计
//!
//! 文件名带时间戳，xlsx 额外带模型短名。

use std::fs;
use std::path::PathBuf;

use anyhow::Result;
use rust_xlsxwriter::{Format, Workbook};
use tracing::debug;

use crate::config::Config;
use crate::error::AppError;
use crate::models::GradingRecord;

/// 导出文件的列顺序，与 GradingRecord 字段顺序一致
const COLUMNS: [&str; 4] = ["nama_file", "nilai", "kesalahan", "feedback"];

/// 结果导出服务
pub struct ReportWriter {
    export_dir: PathBuf,
    prefix: String,
}

impl ReportWriter {
    /// 按配置创建导出服务
    pub fn new(config: &Config) -> Self {
        Self {
            export_dir: PathBuf::from(&config.export_dir),
            prefix: config.export_prefix.clone(),
        }
    }

    /// 使用自定义目录和前缀创建
    pub fn with_dir(dir: impl Into<PathBuf>, prefix: impl Into<String>) -> Self {
        Self {
            export_dir: dir.into(),
            prefix: prefix.into(),
        }
    }

    /// 导出 xlsx 文件
    ///
    /// # 参数
    /// - `records`: 全部评分记录
    /// - `model_name`: 模型标识，取最后一段拼入文件名
    ///
    /// # 返回
    /// 返回写入的文件路径
    pub fn write_xlsx(&self, records: &[GradingRecord], model_name: &str) -> Result<PathBuf> {
        fs::create_dir_all(&self.export_dir)
            .map_err(|e| AppError::file_write_failed(self.export_dir.display().to_string(), e))?;

        let model_short = model_name.rsplit('/').next().unwrap_or(model_name);
        let path = self.export_dir.join(format!(
            "{}_{}_{}.xlsx",
            self.prefix,
            model_short,
            chrono::Local::now().format("%Y%m%d_%H%M%S")
        ));

        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        worksheet.set_name("Hasil Penilaian")?;

        let bold = Format::new().set_bold();
        for (col, header) in COLUMNS.iter().enumerate() {
            worksheet.write_with_format(0, col as u16, *header, &bold)?;
        }

        for (i, record) in records.iter().enumerate() {
            let row = (i + 1) as u32;
            worksheet.write_string(row, 0, &record.file_name)?;
            worksheet.write_number(row, 1, record.score as f64)?;
            worksheet.write_string(row, 2, &record.error_summary)?;
            worksheet.write_string(row, 3, &record.feedback)?;
        }

        worksheet.autofit();
        workbook.save(&path)?;

        debug!("xlsx 已写入: {}", path.display());
        Ok(path)
    }

    /// 导出 CSV 文件
    ///
    /// 表头直接来自 GradingRecord 的 serde 重命名（印尼语字段名）。
    pub fn write_csv(&self, records: &[GradingRecord]) -> Result<PathBuf> {
        fs::create_dir_all(&self.export_dir)
            .map_err(|e| AppError::file_write_failed(self.export_dir.display().to_string(), e))?;

        let path = self.export_dir.join(format!(
            "{}_{}.csv",
            self.prefix,
            chrono::Local::now().format("%Y%m%d_%H%M%S")
        ));

        let mut writer = csv::Writer::from_path(&path)?;
        for record in records {
            writer.serialize(record)?;
        }
        writer.flush()?;

        debug!("CSV 已写入: {}", path.display());
        Ok(path)
    }
}

/// 一次运行的评分统计
#[derive(Debug, Default, PartialEq)]
pub struct GradingStats {
    pub total: usize,
    pub average: f64,
    pub highest: i64,
    pub lowest: i64,
    /// 等级分布: A (85-100) / B (70-84) / C (50-69) / D (<50)
    pub grade_a: usize,
    pub grade_b: usize,
    pub grade_c: usize,
    pub grade_d: usize,
}

impl GradingStats {
    /// 汇总记录集合，空集合返回全零统计
    pub fn from_records(records: &[GradingRecord]) -> Self {
        if records.is_empty() {
            return Self::default();
        }

        let mut stats = Self {
            total: records.len(),
            highest: i64::MIN,
            lowest: i64::MAX,
            ..Self::default()
        };

        let mut sum = 0i64;
        for record in records {
            sum += record.score;
            stats.highest = stats.highest.max(record.score);
            stats.lowest = stats.lowest.min(record.score);
            match record.score {
                s if s >= 85 => stats.grade_a += 1,
                s if s >= 70 => stats.grade_b += 1,
                s if s >= 50 => stats.grade_c += 1,
                _ => stats.grade_d += 1,
            }
        }

        stats.average = sum as f64 / records.len() as f64;
        stats
    }
}
