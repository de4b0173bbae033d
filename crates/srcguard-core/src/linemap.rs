//! 码点下标与 (行, 列) 的互相换算
//!
//! 行号从 1 开始，列号从 0 开始，均以码点计。换行规则与 Python `str.splitlines`
//! 一致：`\n` `\r` `\r\n` `\x0B` `\x0C` `\x1C` `\x1D` `\x1E` `\u{85}` `\u{2028}` `\u{2029}`。
use std::ops::Range;

/// 行起始下标表
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineMap {
    line_starts: Vec<usize>,
}

pub(crate) fn is_line_break(ch: char) -> bool {
    matches!(
        ch,
        '\n' | '\r' | '\x0B' | '\x0C' | '\x1C' | '\x1D' | '\x1E' | '\u{85}' | '\u{2028}' | '\u{2029}'
    )
}

impl LineMap {
    pub fn new(text: &str) -> Self {
        let mut line_starts = vec![0];
        let mut chars = text.chars().enumerate().peekable();
        while let Some((index, ch)) = chars.next() {
            if !is_line_break(ch) {
                continue;
            }
            let mut next_start = index + 1;
            if ch == '\r' {
                if let Some((_, '\n')) = chars.peek() {
                    chars.next();
                    next_start += 1;
                }
            }
            // 文本末尾的换行不开启新行
            if chars.peek().is_some() {
                line_starts.push(next_start);
            }
        }
        Self { line_starts }
    }

    /// 行数（空文本视为 1 行）
    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    pub fn index_to_row_col(&self, index: usize) -> (usize, usize) {
        let row = self.line_starts.partition_point(|&start| start <= index);
        (row, index - self.line_starts[row - 1])
    }

    /// 行号越界时返回 `None`
    pub fn row_col_to_index(&self, row: usize, col: usize) -> Option<usize> {
        let start = *self.line_starts.get(row.checked_sub(1)?)?;
        start.checked_add(col)
    }

    /// 各行的码点下标区间（含行尾换行符），`len` 为文本码点数
    pub fn line_ranges(&self, len: usize) -> impl Iterator<Item = Range<usize>> + '_ {
        self.line_starts.iter().enumerate().map(move |(i, &start)| {
            let end = self.line_starts.get(i + 1).copied().unwrap_or(len);
            start..end.max(start)
        })
    }
}
