//! 扫描选项与统计信息（模块）

/// 默认参与目录遍历的源文件扩展名
pub const DEFAULT_EXTENSIONS: &[&str] = &[
    "c", "cc", "cpp", "cs", "go", "h", "hpp", "java", "js", "jsx", "kt", "py", "rb", "rs", "sh",
    "swift", "ts", "tsx",
];

/// 输出格式
/// - Text：`path:row:col: WARNING: ...`，每条命中一行
/// - Json：流式写出的 JSON 数组
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

/// 扫描选项
#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// 目录遍历时保留的扩展名（不含点）；命令行直接给出的文件不受限制
    pub extensions: Vec<String>,
    /// 最大文件大小（字节）；超过则跳过
    pub max_file_size: Option<u64>,
    /// 线程数：None 表示自动（等于 CPU 核数）；Some(1) 走串行
    pub threads: Option<usize>,
    pub format: OutputFormat,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            extensions: DEFAULT_EXTENSIONS.iter().map(|s| s.to_string()).collect(),
            max_file_size: None,
            threads: None,
            format: OutputFormat::Text,
        }
    }
}

/// 扫描统计信息（便于 CLI 打印）
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ScanStats {
    pub files_scanned: usize,
    pub files_skipped: usize,
    pub findings_written: usize,
}
