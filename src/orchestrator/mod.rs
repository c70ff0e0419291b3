//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责批量处理和流程调度：
//!
//! - `archive_processor` - 压缩包评分处理器，驱动事件流
//! - `app` - 应用运行器，消费事件流并负责导出和统计
//!
//! ## 设计特点
//!
//! - **顶层编排**：不处理单个文件评分的细节
//! - **严格顺序**：一次只评一个文件，事件顺序与压缩包列出顺序一致
//! - **向下委托**：委托 services 层完成提示词、评分和导出

pub mod app;
pub mod archive_processor;

pub use app::App;
pub use archive_processor::grade_archive;
