//! 配置文件加载（TOML）
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

use crate::options::ScanOptions;

/// `[scan]` 段（字段均可省略）
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ScanSection {
    #[serde(default)]
    pub extensions: Option<Vec<String>>,
    #[serde(default)]
    pub max_file_size: Option<u64>,
    #[serde(default)]
    pub threads: Option<usize>,
}

/// 顶层配置文件结构
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct ConfigFile {
    #[serde(default)]
    pub scan: ScanSection,
}

impl ConfigFile {
    /// 用配置覆盖默认选项（命令行参数再由调用方覆盖）
    pub fn apply(&self, opts: &mut ScanOptions) {
        if let Some(exts) = &self.scan.extensions {
            // 兼容 ".py" 与 "py" 两种写法
            opts.extensions = exts.iter().map(|e| e.trim_start_matches('.').to_string()).collect();
        }
        if self.scan.max_file_size.is_some() {
            opts.max_file_size = self.scan.max_file_size;
        }
        if let Some(n) = self.scan.threads.filter(|n| *n >= 1) {
            opts.threads = Some(n);
        }
    }
}

pub fn parse_config(txt: &str) -> Result<ConfigFile> {
    Ok(toml::from_str(txt)?)
}

/// 从 TOML 文件加载配置
pub fn load_config(path: &Path) -> Result<ConfigFile> {
    let txt = std::fs::read_to_string(path)
        .with_context(|| format!("read config {}", path.display()))?;
    parse_config(&txt).with_context(|| format!("parse config {}", path.display()))
}
