//! BiDi 分析：逻辑序 → 视觉序位置映射
//!
//! 整段文本作为一个段落运行 UAX-9（`unicode-bidi`），段落方向由首个强字符决定，
//! 缺省为 LTR。所有层级均为 LTR 时直接返回 `None`，不做额外分配；
//! 否则先取按编码单元（UTF-8 字节）重排后的层级，再用 `CodepointWalker`
//! 压缩为每码点一项，最后求出每个逻辑码点的视觉位置。
use serde::Serialize;
use tracing::debug;
use unicode_bidi::{BidiInfo, Level, ParagraphBidiInfo};

use crate::error::{try_vec_with_capacity, ScanError};
use crate::source::SourceText;

/// 逻辑码点下标 → 视觉位置（码点单位）
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct BidiPositionMap(Vec<usize>);

impl BidiPositionMap {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// 第 `index` 个逻辑码点的视觉位置
    pub fn get(&self, index: usize) -> Option<usize> {
        self.0.get(index).copied()
    }

    pub fn as_slice(&self) -> &[usize] {
        &self.0
    }

    pub fn into_vec(self) -> Vec<usize> {
        self.0
    }

    pub fn is_identity(&self) -> bool {
        self.displaced().next().is_none()
    }

    /// 视觉位置与逻辑位置不同的码点：`(logical, visual)`
    pub fn displaced(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.0
            .iter()
            .enumerate()
            .filter(|(logical, visual)| *logical != **visual)
            .map(|(logical, visual)| (logical, *visual))
    }
}

/// 运行 BiDi 分析；纯 LTR 段落返回 `None`
pub(crate) fn analyze(src: &SourceText<'_>) -> Result<Option<BidiPositionMap>, ScanError> {
    // ASCII 中没有 R/AL/AN 与显式嵌入字符，不可能出现 RTL 层级
    if src.is_empty() || src.is_ascii() {
        return Ok(None);
    }
    let text = src.as_str();
    let para = ParagraphBidiInfo::new(text, None);
    if !para.levels.iter().any(|l| l.is_rtl()) {
        return Ok(None);
    }

    // 按字节的层级（已应用 L1），长度必须等于编码单元数
    let unit_levels = para.reordered_levels(0..text.len());
    if unit_levels.len() != text.len() {
        return Err(ScanError::BidiAnalysis(format!(
            "bidi produced {} levels for {} code units",
            unit_levels.len(),
            text.len()
        )));
    }

    // 压缩：取每个码点首个单元的层级
    let mut levels: Vec<Level> = try_vec_with_capacity("bidi levels", src.len())?;
    for cp in src.walk() {
        levels.push(unit_levels[cp.offset]);
    }
    if levels.len() != src.len() {
        return Err(ScanError::BidiAnalysis(format!(
            "compressed {} levels for {} codepoints",
            levels.len(),
            src.len()
        )));
    }
    drop(unit_levels);

    // reorder_visual 给出 visual → logical，这里取逆
    let visual_to_logical = BidiInfo::reorder_visual(&levels);
    if visual_to_logical.len() != levels.len() {
        return Err(ScanError::BidiAnalysis("visual order length mismatch".into()));
    }
    let mut map: Vec<usize> = try_vec_with_capacity("bidi map", src.len())?;
    map.resize(src.len(), usize::MAX);
    for (visual, &logical) in visual_to_logical.iter().enumerate() {
        match map.get_mut(logical) {
            Some(slot) => *slot = visual,
            None => {
                return Err(ScanError::BidiAnalysis(format!(
                    "logical index {logical} out of range"
                )))
            }
        }
    }

    debug!(codepoints = src.len(), "built bidi position map");
    Ok(Some(BidiPositionMap(map)))
}
