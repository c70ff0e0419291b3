//! LLM 回复清洗 - 业务能力层
//!
//! 只负责从自由文本中定位 JSON 块，不做 JSON 语法校验（校验在下游）。

use regex::Regex;
use std::sync::OnceLock;

/// 匹配第一个 `{` 到最后一个 `}` 的贪婪区间，(?s) 让 `.` 跨越换行
fn json_block_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)\{.*\}").expect("正则表达式字面量必然合法"))
}

/// 从 LLM 回复中提取 JSON 块
///
/// LLM 经常把 JSON 包在 ```json 代码块或说明文字里，
/// 这里尽力把被包裹的 JSON 原样取出来。
///
/// # 返回
/// 找到则返回 JSON 子串，否则返回 `None`
pub fn extract_json_block(raw_reply: &str) -> Option<&str> {
    json_block_regex()
        .find(raw_reply)
        .map(|m| m.as_str())
}
