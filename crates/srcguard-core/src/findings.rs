//! 命中项（Nit）与收集器
use serde::Serialize;

/// 命中类型标签
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum NitKind {
    ControlChar,
}

impl NitKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NitKind::ControlChar => "ControlChar",
        }
    }
}

impl std::fmt::Display for NitKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 单条命中：类型 + 码点下标
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Nit {
    pub kind: NitKind,
    pub index: usize,
}

/// 按输入顺序累积命中项（不去重、不重排）
#[derive(Debug, Default)]
pub(crate) struct NitCollector {
    nits: Vec<Nit>,
}

impl NitCollector {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push_control_char(&mut self, index: usize) {
        debug_assert!(
            self.nits.last().map_or(true, |n| n.index < index),
            "nits must be collected in ascending index order"
        );
        self.nits.push(Nit { kind: NitKind::ControlChar, index });
    }

    pub(crate) fn into_nits(self) -> Vec<Nit> {
        self.nits
    }
}
