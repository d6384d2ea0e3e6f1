use anyhow::{Context, Result};
use sisat_tables::utils::logging;
use sisat_tables::{App, Config, HighlightRange, RunMode};
use std::io::{self, BufRead, Write};

#[tokio::main]
async fn main() -> Result<()> {
    // 加载配置
    let config = Config::load()?;

    // 初始化日志
    logging::init_log_file(&config.output_log_file)?;
    logging::init(&config)?;

    println!("按 Ctrl + C 退出程序\n");

    let answer = prompt("下载表格 (d) 还是只处理本地表格 (p)? ")?;
    let Some(mode) = RunMode::from_answer(&answer) else {
        println!("输入错误!");
        return Ok(());
    };

    let bounds_input = prompt("输入需要高亮的平均分范围 (最小值 最大值): ")?;
    let bounds = HighlightRange::parse(&bounds_input)?;
    println!("正在标注 {} 之间的平均分...", bounds);

    // 初始化并运行应用
    App::initialize(config)?.run(mode, bounds).await?;

    Ok(())
}

fn prompt(message: &str) -> Result<String> {
    print!("{}", message);
    io::stdout().flush()?;

    let mut line = String::new();
    io::stdin().lock().read_line(&mut line).context("无法读取输入")?;
    Ok(line.trim().to_string())
}
