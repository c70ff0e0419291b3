use anyhow::Result;
use penilai_otomatis::utils::logging;
use penilai_otomatis::{App, Config};

#[tokio::main]
async fn main() -> Result<()> {
    // 初始化日志
    logging::init();

    // 加载配置
    let config = Config::from_env();

    // 解析命令行参数: <作业压缩包.zip> <题目.txt> [评分标准.txt]
    let args: Vec<String> = std::env::args().collect();
    if args.len() < 3 {
        eprintln!(
            "用法: {} <作业压缩包.zip> <题目.txt> [评分标准.txt]",
            args.first().map(String::as_str).unwrap_or("penilai-otomatis")
        );
        std::process::exit(2);
    }

    // 初始化并运行应用
    App::initialize(config)?
        .run(&args[1], &args[2], args.get(3).map(String::as_str))
        .await?;

    Ok(())
}
