//! 控制字符分类（ASCII 查表 + 非 ASCII 通用类别）
use unicode_properties::{GeneralCategoryGroup, UnicodeGeneralCategory};

/// 允许出现的 ASCII 控制字符：\t \n \v \f \r
pub const ALLOWED_CONTROL_CHARS: &str = "\t\n\x0B\x0C\r";

/// 进程级默认策略（编译期构建，之后只读）
pub static DEFAULT_POLICY: ControlCharPolicy = ControlCharPolicy::new(ALLOWED_CONTROL_CHARS);

/// 单个码点的分类结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharClass {
    Allowed,
    DisallowedControl,
}

/// 控制字符策略
///
/// ASCII 范围查 128 项常量表；其余码点按通用类别判断，
/// Cc/Cf/Cs/Co/Cn（即 "Other" 大类）均视为不允许。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlCharPolicy {
    ascii_allowed: [bool; 128],
}

impl ControlCharPolicy {
    /// 由例外列表构建：0x20..=0x7E 一律允许，再加上 `exceptions` 中的 ASCII 字符
    pub const fn new(exceptions: &str) -> Self {
        let mut table = [false; 128];
        let mut c = 0x20;
        while c < 0x7F {
            table[c] = true;
            c += 1;
        }
        let bytes = exceptions.as_bytes();
        let mut i = 0;
        while i < bytes.len() {
            let b = bytes[i] as usize;
            // 非 ASCII 例外没有意义，在编译期拒绝
            assert!(b < 128, "control-char exceptions must be ASCII");
            table[b] = true;
            i += 1;
        }
        Self { ascii_allowed: table }
    }

    pub fn classify(&self, ch: char) -> CharClass {
        if self.is_disallowed(ch) {
            CharClass::DisallowedControl
        } else {
            CharClass::Allowed
        }
    }

    #[inline]
    pub fn is_disallowed(&self, ch: char) -> bool {
        let cp = ch as u32;
        if cp < 128 {
            return !self.ascii_allowed[cp as usize];
        }
        ch.general_category_group() == GeneralCategoryGroup::Other
    }
}

impl Default for ControlCharPolicy {
    fn default() -> Self {
        DEFAULT_POLICY.clone()
    }
}
