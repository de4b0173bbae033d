//! 报告记录（对外暴露）
//!
//! 把 `ScanResult` 转成带行列号的命中记录：每个控制字符一条，
//! 每个行内显示顺序与逻辑顺序不一致的行一条 `BidiReorder`。
//!
//! 位置映射针对整段文本；RTL 段落会把整行在视觉上整体挪动，
//! 所以逐行判断：行内码点按逻辑序排列时，视觉位置应当严格递增。
use serde::Serialize;
use std::fmt;

use crate::bidi::BidiPositionMap;
use crate::linemap::{is_line_break, LineMap};
use crate::scan::ScanResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FindingKind {
    ControlChar,
    BidiReorder,
}

/// 输出项结构（JSON 数组的单个元素）
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Finding {
    pub path: String,
    pub row: usize,
    pub col: usize,
    pub index: usize,
    pub kind: FindingKind,
    /// 仅控制字符：`U+XXXX`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub codepoint: Option<String>,
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}: WARNING: ", self.path, self.row, self.col)?;
        match (self.kind, &self.codepoint) {
            (FindingKind::ControlChar, Some(cp)) => {
                write!(f, "control character {cp} (possibly invisible and/or affecting nearby text)")
            }
            (FindingKind::ControlChar, None) => write!(f, "control character"),
            (FindingKind::BidiReorder, _) => {
                write!(f, "line is displayed in a different order than it is read by the compiler")
            }
        }
    }
}

/// 由扫描结果构建报告记录，按码点下标升序
pub fn findings_for(path: &str, text: &str, result: &ScanResult) -> Vec<Finding> {
    if result.nits.is_empty() && result.bidi_map.is_none() {
        return Vec::new();
    }
    let linemap = LineMap::new(text);
    let chars: Vec<char> = text.chars().collect();
    let mut out = Vec::with_capacity(result.nits.len());

    for nit in &result.nits {
        let (row, col) = linemap.index_to_row_col(nit.index);
        out.push(Finding {
            path: path.to_string(),
            row,
            col,
            index: nit.index,
            kind: FindingKind::ControlChar,
            codepoint: chars.get(nit.index).map(|c| format!("U+{:04X}", *c as u32)),
        });
    }

    if let Some(map) = &result.bidi_map {
        for (i, line) in linemap.line_ranges(chars.len()).enumerate() {
            let start = line.start;
            let Some(index) = first_reordered(map, &chars, line) else { continue };
            out.push(Finding {
                path: path.to_string(),
                row: i + 1,
                col: index - start,
                index,
                kind: FindingKind::BidiReorder,
                codepoint: None,
            });
        }
    }

    out.sort_by_key(|f| f.index);
    out
}

/// 行内第一个视觉位置不递增的码点
///
/// 行尾空白与换行符在 L1 中被重置为段落层级，不参与判断。
fn first_reordered(map: &BidiPositionMap, chars: &[char], line: std::ops::Range<usize>) -> Option<usize> {
    let mut end = line.end.min(chars.len());
    while end > line.start && (chars[end - 1].is_whitespace() || is_line_break(chars[end - 1])) {
        end -= 1;
    }
    let visual = map.as_slice().get(line.start..end)?;
    visual.windows(2).position(|w| w[0] > w[1]).map(|p| line.start + p)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scan::scan;

    #[test]
    fn clean_text_has_no_findings() {
        let text = "print('hi')\n";
        assert!(findings_for("a.py", text, &scan(text).unwrap()).is_empty());
    }

    #[test]
    fn control_char_line_and_column() {
        let text = "ok\nx\x02y\n";
        let found = findings_for("src/a.py", text, &scan(text).unwrap());
        assert_eq!(found.len(), 1);
        assert_eq!((found[0].row, found[0].col, found[0].index), (2, 1, 4));
        assert_eq!(found[0].codepoint.as_deref(), Some("U+0002"));
        assert_eq!(
            found[0].to_string(),
            "src/a.py:2:1: WARNING: control character U+0002 (possibly invisible and/or affecting nearby text)"
        );
    }

    #[test]
    fn one_reorder_finding_per_line() {
        let text = "a = 1\nb = \"אבג\" + \"דה\"\n";
        let found = findings_for("b.py", text, &scan(text).unwrap());
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].kind, FindingKind::BidiReorder);
        assert_eq!(found[0].row, 2);
    }

    #[test]
    fn rtl_first_line_does_not_flag_ascii_lines() {
        let text = "# שלום\nx = 1\ny = 2\n";
        let result = scan(text).unwrap();
        assert!(result.bidi_map.is_some());
        let found = findings_for("a.py", text, &result);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].kind, FindingKind::BidiReorder);
        assert_eq!(found[0].row, 1);
    }

    #[test]
    fn ltr_line_with_trailing_space_is_not_flagged() {
        let text = "# עברית \nvalue = 2 \n";
        let found = findings_for("a.py", text, &scan(text).unwrap());
        assert!(found.iter().all(|f| f.row == 1));
    }

    #[test]
    fn json_shape() {
        let f = Finding {
            path: "x.rs".into(),
            row: 1,
            col: 0,
            index: 0,
            kind: FindingKind::BidiReorder,
            codepoint: None,
        };
        assert_eq!(
            serde_json::to_string(&f).unwrap(),
            r#"{"path":"x.rs","row":1,"col":0,"index":0,"kind":"BidiReorder"}"#
        );
    }
}
