use std::path::PathBuf;

use anyhow::{bail, Result};
use section7_formatter::models::Language;
use section7_formatter::orchestrator::format_single_file;
use section7_formatter::utils::logging;
use section7_formatter::{App, Config};

/// 命令行参数：`section7-formatter [FILE] [--lang fr|en]`
struct Args {
    file: Option<PathBuf>,
    language: Option<Language>,
}

fn parse_args() -> Result<Args> {
    let mut args = std::env::args().skip(1);
    let mut parsed = Args {
        file: None,
        language: None,
    };

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--lang" | "-l" => {
                let Some(code) = args.next() else {
                    bail!("--lang 需要参数 (fr|en)");
                };
                match Language::from_code(&code) {
                    Some(language) => parsed.language = Some(language),
                    None => bail!("不支持的语言: {}", code),
                }
            }
            other if other.starts_with('-') => bail!("未知参数: {}", other),
            other => parsed.file = Some(PathBuf::from(other)),
        }
    }

    Ok(parsed)
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = parse_args()?;

    // 加载配置
    let config = match std::env::var("SECTION7_CONFIG") {
        Ok(path) => Config::from_toml_file(path)?,
        Err(_) => Config::from_env()?,
    };

    // 初始化日志
    logging::init(config.verbose_logging);

    match args.file {
        Some(file) => {
            let json = format_single_file(&config, &file, args.language).await?;
            println!("{}", json);
        }
        None => {
            // 初始化并运行应用
            App::initialize(config).await?.run().await?;
        }
    }

    Ok(())
}
