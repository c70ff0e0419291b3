//! 压缩包评分处理器 - 编排层
//!
//! ## 职责
//!
//! 1. **构建提示词**：整次运行只构建一次 system prompt
//! 2. **枚举条目**：跳过目录和 `__MACOSX` 元数据条目
//! 3. **逐个评分**：严格按压缩包列出顺序，一次只评一个文件
//! 4. **事件流**：通过容量为 1 的有界通道向调用方推送
//!    Progress / Result / Error 事件，调用方不取下一个事件时生产端挂起
//!
//! ## 错误语义
//!
//! - 压缩包本身无法打开：发出一个 Error 事件后流结束
//! - 单个条目读取失败：发出一条占位失败记录，继续后面的条目
//! - 其他意外失败（含 LLM 传输层错误）：发出一个 Error 事件后流结束
//! - 调用方丢弃接收端：生产任务在下一次发送时退出，压缩包随之释放

use std::io::{Cursor, Read};
use std::sync::Arc;

use anyhow::Result;
use tokio::sync::mpsc;
use tracing::{error, warn};
use zip::ZipArchive;

use crate::error::ArchiveError;
use crate::models::{GradingEvent, GradingRecord};
use crate::services::{prompt, ChatBackend, GradingService};

/// 部分压缩工具写入的资源分支目录，不参与评分
const MACOS_METADATA_DIR: &str = "__MACOSX";

/// 对压缩包中的所有文件逐个评分，返回事件流的接收端
///
/// # 参数
/// - `service`: 评分服务（生产任务独占使用，评分并发度恒为 1）
/// - `zip_bytes`: 上传的压缩包字节
/// - `soal_text`: 题目内容
/// - `kriteria_text`: 附加评分标准（可为空）
///
/// # 返回
/// 有界事件通道的接收端；流结束（通道关闭）即处理完毕，
/// 没有显式的"完成"事件。每次调用都从头开始，不支持断点续评。
pub fn grade_archive<B>(
    service: Arc<GradingService<B>>,
    zip_bytes: Vec<u8>,
    soal_text: String,
    kriteria_text: String,
) -> mpsc::Receiver<GradingEvent>
where
    B: ChatBackend + 'static,
{
    let (tx, rx) = mpsc::channel(1);

    tokio::spawn(async move {
        if let Err(e) = run_grading(service, zip_bytes, &soal_text, &kriteria_text, &tx).await {
            error!("压缩包处理过程中发生意外错误: {}", e);
            let _ = tx
                .send(GradingEvent::Error {
                    message: format!("Terjadi error tak terduga: {}", e),
                })
                .await;
        }
    });

    rx
}

async fn run_grading<B: ChatBackend>(
    service: Arc<GradingService<B>>,
    zip_bytes: Vec<u8>,
    soal_text: &str,
    kriteria_text: &str,
    tx: &mpsc::Sender<GradingEvent>,
) -> Result<()> {
    let system_prompt = prompt::build_grading_prompt(soal_text, kriteria_text);

    let mut archive = match ZipArchive::new(Cursor::new(zip_bytes)) {
        Ok(archive) => archive,
        Err(e) => {
            let err = ArchiveError::InvalidContainer {
                source: Box::new(e),
            };
            warn!("{}", err);
            let _ = tx
                .send(GradingEvent::Error {
                    message: "File yang diupload bukan format .zip yang valid.".to_string(),
                })
                .await;
            return Ok(());
        }
    };

    // 先收集合法条目，total 在流开始前就固定下来。
    // 枚举只读中央目录，不打开条目本身，
    // 个别条目损坏要留到逐个读取时按"单条失败"处理，不能让整个流中止。
    let mut entries: Vec<(usize, String)> = Vec::new();
    for index in 0..archive.len() {
        let Some(name) = archive.name_for_index(index) else {
            continue;
        };
        if name.ends_with('/') || name.starts_with(MACOS_METADATA_DIR) {
            continue;
        }
        entries.push((index, name.to_string()));
    }
    let total = entries.len();

    for (current, (index, file_name)) in entries.into_iter().enumerate() {
        let sent = tx
            .send(GradingEvent::Progress {
                current: current + 1,
                total,
                file_name: file_name.clone(),
            })
            .await;
        if sent.is_err() {
            // 调用方放弃了流
            return Ok(());
        }

        let source_code = match read_entry(&mut archive, index) {
            Ok(bytes) => decode_source_text(&bytes),
            Err(e) => {
                let err = ArchiveError::EntryReadFailed {
                    entry_name: file_name.clone(),
                    source: Box::new(e),
                };
                warn!("{}", err);
                let record = GradingRecord::failed(
                    &file_name,
                    "ERROR: Tidak dapat membaca file. Mungkin file corrupt atau format tidak didukung.",
                );
                if tx.send(GradingEvent::Result { record }).await.is_err() {
                    return Ok(());
                }
                continue;
            }
        };

        // 传输层错误从这里冒出去，变成流终止的 Error 事件
        let record = service
            .grade(&system_prompt, &file_name, &source_code)
            .await?;

        if tx.send(GradingEvent::Result { record }).await.is_err() {
            return Ok(());
        }
    }

    Ok(())
}

/// 把单个条目完整读入内存
fn read_entry(
    archive: &mut ZipArchive<Cursor<Vec<u8>>>,
    index: usize,
) -> zip::result::ZipResult<Vec<u8>> {
    let mut file = archive.by_index(index)?;
    let mut buf = Vec::new();
    file.read_to_end(&mut buf)?;
    Ok(buf)
}

/// 把条目字节解码为文本
///
/// 优先 UTF-8，失败则退回 Latin-1。Latin-1 把每个字节映射为一个字符，
/// 因此该退路永远不会失败，二进制文件也会被强制解码而不是拒绝。
fn decode_source_text(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(_) => bytes.iter().map(|&b| b as char).collect(),
    }
}
