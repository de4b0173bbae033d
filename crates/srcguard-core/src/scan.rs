//! 单段文本扫描主流程：解码 → 控制字符分类 → BiDi 分析
use serde::Serialize;
use tracing::trace;

use crate::bidi::{analyze, BidiPositionMap};
use crate::error::ScanError;
use crate::findings::{Nit, NitCollector};
use crate::policy::{ControlCharPolicy, DEFAULT_POLICY};
use crate::source::SourceText;

/// 扫描结果：命中列表 + 可选的 BiDi 位置映射
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScanResult {
    pub nits: Vec<Nit>,
    pub bidi_map: Option<BidiPositionMap>,
}

impl ScanResult {
    /// 无命中且无重排风险
    pub fn is_clean(&self) -> bool {
        self.nits.is_empty() && self.bidi_map.as_ref().map_or(true, BidiPositionMap::is_identity)
    }
}

/// 使用默认策略扫描文本
pub fn scan(text: &str) -> Result<ScanResult, ScanError> {
    scan_with_policy(text, &DEFAULT_POLICY)
}

/// 宿主入口：原始字节必须是 UTF-8，否则直接返回 `TypeMismatch`
pub fn scan_bytes(buf: &[u8]) -> Result<ScanResult, ScanError> {
    let src = SourceText::from_bytes(buf)?;
    scan_source(&src, &DEFAULT_POLICY)
}

/// 指定控制字符策略扫描文本
pub fn scan_with_policy(text: &str, policy: &ControlCharPolicy) -> Result<ScanResult, ScanError> {
    let src = SourceText::new(text)?;
    scan_source(&src, policy)
}

/// 扫描已解码的文本
///
/// 两个阶段互相独立；任一阶段失败则整体失败，不返回部分结果
pub fn scan_source(src: &SourceText<'_>, policy: &ControlCharPolicy) -> Result<ScanResult, ScanError> {
    let mut collector = NitCollector::new();
    for cp in src.walk() {
        if policy.is_disallowed(cp.ch) {
            collector.push_control_char(cp.index);
        }
    }
    let nits = collector.into_nits();
    let bidi_map = analyze(src)?;
    trace!(codepoints = src.len(), nits = nits.len(), bidi = bidi_map.is_some(), "scanned text");
    Ok(ScanResult { nits, bidi_map })
}
