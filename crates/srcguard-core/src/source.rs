//! 码点解码与遍历
//!
//! 全库统一以“码点下标”作为位置单位。`CodepointWalker` 是唯一的遍历器，
//! 控制字符分类与 BiDi 映射压缩都通过它前进，保证两边下标对齐。
use crate::error::ScanError;

/// 已解码的源文本（借用视图 + 码点数）
#[derive(Debug, Clone, Copy)]
pub struct SourceText<'a> {
    text: &'a str,
    len: usize,
}

impl<'a> SourceText<'a> {
    /// 由合法字符串构造
    pub fn new(text: &'a str) -> Result<Self, ScanError> {
        let len = CodepointWalker { text, offset: 0, index: 0 }.count();
        Ok(Self { text, len })
    }

    /// 宿主边界：原始字节必须是 UTF-8 文本，否则视为类型不符
    pub fn from_bytes(buf: &'a [u8]) -> Result<Self, ScanError> {
        let text = std::str::from_utf8(buf).map_err(|e| ScanError::TypeMismatch(e.to_string()))?;
        Self::new(text)
    }

    pub fn as_str(&self) -> &'a str {
        self.text
    }

    /// 码点数量
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// 码点数等于字节数即为纯 ASCII
    pub fn is_ascii(&self) -> bool {
        self.len == self.text.len()
    }

    pub fn walk(&self) -> CodepointWalker<'a> {
        CodepointWalker { text: self.text, offset: 0, index: 0 }
    }
}

/// 单个码点及其位置
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Codepoint {
    /// 码点下标
    pub index: usize,
    /// 首个编码单元（UTF-8 字节）的偏移
    pub offset: usize,
    pub ch: char,
}

impl Codepoint {
    /// 占用的编码单元数
    pub fn width(&self) -> usize {
        self.ch.len_utf8()
    }
}

/// 前向码点遍历器
#[derive(Debug, Clone)]
pub struct CodepointWalker<'a> {
    text: &'a str,
    offset: usize,
    index: usize,
}

impl<'a> Iterator for CodepointWalker<'a> {
    type Item = Codepoint;

    fn next(&mut self) -> Option<Codepoint> {
        let ch = self.text[self.offset..].chars().next()?;
        let cp = Codepoint { index: self.index, offset: self.offset, ch };
        self.offset += cp.width();
        self.index += 1;
        Some(cp)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let rest = self.text.len() - self.offset;
        ((rest + 3) / 4, Some(rest))
    }
}
