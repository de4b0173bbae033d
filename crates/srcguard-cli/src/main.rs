use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use srcguard_core::{load_config, scan_and_write, OutputFormat, ScanOptions};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};

/// 命令行入口（基于 clap）
#[derive(Parser, Debug)]
#[command(name = "srcguard", version, about = "检测源码中的隐藏控制字符与 BiDi 重排（Trojan Source）")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// 扫描文件或目录
    Scan {
        /// 文件或目录；目录会递归遍历
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// 输出格式
        #[arg(long, value_enum, default_value_t = Format::Text)]
        format: Format,

        /// 输出文件（默认标准输出）
        #[arg(long)]
        output: Option<PathBuf>,

        /// 线程数（"auto"=CPU 核心数）
        #[arg(long, default_value = "auto")]
        threads: String,

        /// 最大扫描文件大小（单位字节）
        #[arg(long)]
        max_file_size: Option<u64>,

        /// 配置文件路径（TOML）
        #[arg(long)]
        config: Option<PathBuf>,

        /// 目录遍历时保留的扩展名，可重复；覆盖配置文件
        #[arg(long = "ext")]
        extensions: Vec<String>,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Format {
    Text,
    Json,
}

impl From<Format> for OutputFormat {
    fn from(f: Format) -> Self {
        match f {
            Format::Text => OutputFormat::Text,
            Format::Json => OutputFormat::Json,
        }
    }
}

fn main() -> ExitCode {
    // 初始化日志（支持通过 RUST_LOG 控制等级，例如 info、debug）
    init_tracing();
    let cli = Cli::parse();

    match run(cli) {
        Ok(true) => ExitCode::from(1),
        Ok(false) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err:#}");
            ExitCode::from(2)
        }
    }
}

/// 返回是否有命中
fn run(cli: Cli) -> Result<bool> {
    match cli.command {
        Commands::Scan { paths, format, output, threads, max_file_size, config, extensions } => {
            info!(?paths, ?output, "starting scan");

            // 默认值 → 配置文件 → 命令行参数，逐层覆盖
            let mut opts = ScanOptions { format: format.into(), ..ScanOptions::default() };
            if let Some(path) = &config {
                load_config(path)?.apply(&mut opts);
            }
            if !extensions.is_empty() {
                opts.extensions = extensions.iter().map(|e| e.trim_start_matches('.').to_string()).collect();
            }
            if max_file_size.is_some() {
                opts.max_file_size = max_file_size;
            }
            if let Some(n) = parse_threads(&threads) {
                opts.threads = Some(n);
            }

            let mut out: Box<dyn Write> = match &output {
                Some(p) => Box::new(BufWriter::new(File::create(p).context("create output file")?)),
                None => Box::new(BufWriter::new(io::stdout().lock())),
            };
            let stats = scan_and_write(&paths, &mut out, &opts).context("scan and write failed")?;
            if opts.format == OutputFormat::Json {
                writeln!(out)?;
            }
            out.flush()?;

            info!(
                files_scanned = stats.files_scanned,
                files_skipped = stats.files_skipped,
                findings = stats.findings_written,
                "scan finished"
            );
            Ok(stats.findings_written > 0)
        }
    }
}

fn init_tracing() {
    use tracing_subscriber::{EnvFilter, FmtSubscriber};
    // 日志写到 stderr，避免与 stdout 上的报告混在一起
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(io::stderr)
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);
}

/// 解析线程参数："auto" 或非法值返回 None（交给配置/默认值）
fn parse_threads(s: &str) -> Option<usize> {
    if s.eq_ignore_ascii_case("auto") {
        return None;
    }
    match s.parse::<usize>() {
        Ok(n) if n >= 1 => Some(n),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn threads_argument() {
        assert_eq!(parse_threads("auto"), None);
        assert_eq!(parse_threads("AUTO"), None);
        assert_eq!(parse_threads("3"), Some(3));
        assert_eq!(parse_threads("0"), None);
        assert_eq!(parse_threads("x"), None);
    }

    #[test]
    fn parses_scan_command() {
        let cli = Cli::try_parse_from([
            "srcguard", "scan", "src", "lib.py", "--format", "json", "--ext", "py", "--ext", ".pyi",
        ])
        .unwrap();
        match cli.command {
            Commands::Scan { paths, format, extensions, .. } => {
                assert_eq!(paths, vec![PathBuf::from("src"), PathBuf::from("lib.py")]);
                assert!(matches!(format, Format::Json));
                assert_eq!(extensions, vec!["py".to_string(), ".pyi".to_string()]);
            }
        }
    }

    #[test]
    fn scan_requires_paths() {
        assert!(Cli::try_parse_from(["srcguard", "scan"]).is_err());
    }

    #[test]
    fn run_reports_findings_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("a.py");
        std::fs::write(&src, "x = 1\x07\n").unwrap();
        let out = dir.path().join("report.txt");
        let args: Vec<std::ffi::OsString> = vec![
            "srcguard".into(),
            "scan".into(),
            src.clone().into_os_string(),
            "--output".into(),
            out.clone().into_os_string(),
            "--threads".into(),
            "1".into(),
        ];
        let cli = Cli::try_parse_from(args).unwrap();
        assert!(run(cli).unwrap());
        let report = std::fs::read_to_string(&out).unwrap();
        assert!(report.contains(":1:5: WARNING: control character U+0007"));
    }
}
