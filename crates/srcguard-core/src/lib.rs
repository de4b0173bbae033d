//! 源码文本安全扫描核心
//!
//! 设计要点：
//! - 以“码点下标”为唯一位置单位；所有遍历都经过 `CodepointWalker`。
//! - 控制字符分类：ASCII 走 128 项常量表（热路径），非 ASCII 查通用类别。
//! - BiDi：段落纯 LTR 时不产生映射；否则给出逻辑序 → 视觉序的位置映射，
//!   由宿主判断是否存在“Trojan Source”式的重排。
//! - `scan` 为纯函数、可重入；唯一共享状态是只读的 `DEFAULT_POLICY`。

mod bidi;
mod error;
mod findings;
mod policy;
mod scan;
mod source;

// 宿主侧：行列换算、报告、配置与批量扫描
mod batch;
mod config;
mod linemap;
mod options;
mod report;

pub use bidi::BidiPositionMap;
pub use error::ScanError;
pub use findings::{Nit, NitKind};
pub use policy::{CharClass, ControlCharPolicy, ALLOWED_CONTROL_CHARS, DEFAULT_POLICY};
pub use scan::{scan, scan_bytes, scan_source, scan_with_policy, ScanResult};
pub use source::{Codepoint, CodepointWalker, SourceText};

pub use batch::{collect_files, scan_and_write, scan_file};
pub use config::{load_config, parse_config, ConfigFile, ScanSection};
pub use linemap::LineMap;
pub use options::{OutputFormat, ScanOptions, ScanStats, DEFAULT_EXTENSIONS};
pub use report::{findings_for, Finding, FindingKind};
