/// 程序配置
#[derive(Clone, Debug)]
pub struct Config {
    // --- LLM 配置 ---
    pub llm_api_key: String,
    pub llm_api_base_url: String,
    pub llm_model_name: String,
    /// 温度较低时评分结果更稳定
    pub llm_temperature: f32,
    /// 单次回复的最大 token 数
    pub llm_max_tokens: u32,
    // --- 重试配置 ---
    /// 解析失败时的总尝试次数（含首次）
    pub max_grading_attempts: u32,
    /// 两次尝试之间的等待秒数
    pub retry_delay_secs: u64,
    // --- 导出配置 ---
    /// 结果文件输出目录
    pub export_dir: String,
    /// 导出文件名前缀
    pub export_prefix: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            llm_api_key: String::new(),
            llm_api_base_url: "https://api.groq.com/openai/v1".to_string(),
            llm_model_name: "llama-3.3-70b-versatile".to_string(),
            llm_temperature: 0.1,
            llm_max_tokens: 1024,
            max_grading_attempts: 3,
            retry_delay_secs: 2,
            export_dir: ".".to_string(),
            export_prefix: "HasilPenilaian".to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            llm_api_key: std::env::var("GROQ_API_KEY").unwrap_or(default.llm_api_key),
            llm_api_base_url: std::env::var("LLM_API_BASE_URL").unwrap_or(default.llm_api_base_url),
            llm_model_name: std::env::var("LLM_MODEL_NAME").unwrap_or(default.llm_model_name),
            llm_temperature: std::env::var("LLM_TEMPERATURE").ok().and_then(|v| v.parse().ok()).unwrap_or(default.llm_temperature),
            llm_max_tokens: std::env::var("LLM_MAX_TOKENS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.llm_max_tokens),
            max_grading_attempts: std::env::var("MAX_GRADING_ATTEMPTS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.max_grading_attempts),
            retry_delay_secs: std::env::var("RETRY_DELAY_SECS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.retry_delay_secs),
            export_dir: std::env::var("EXPORT_DIR").unwrap_or(default.export_dir),
            export_prefix: std::env::var("EXPORT_PREFIX").unwrap_or(default.export_prefix),
        }
    }
}
