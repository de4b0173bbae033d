//! 扫描错误类型（对外暴露）
use thiserror::Error;

/// 单次扫描的错误分类
///
/// - 输入类错误：`TypeMismatch`（输入不是已解码文本）
/// - 内部故障：`Encoding` / `BidiAnalysis` / `AllocationFailure`
///
/// 任何错误都会中止整次调用，不返回部分结果。
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ScanError {
    /// 输入不是合法的 UTF-8 文本
    #[error("input is not decoded text: {0}")]
    TypeMismatch(String),

    /// 文本表示之间转换失败（合法输入下不应出现）
    #[error("internal encoding error: {0}")]
    Encoding(String),

    /// BiDi 算法阶段失败
    #[error("bidi analysis failed: {0}")]
    BidiAnalysis(String),

    /// 工作缓冲区申请失败
    #[error("failed to allocate {what} ({len} entries)")]
    AllocationFailure { what: &'static str, len: usize },
}

impl ScanError {
    /// 是否为调用方输入错误（否则视为工具内部故障）
    pub fn is_input_error(&self) -> bool {
        matches!(self, ScanError::TypeMismatch(_))
    }
}

/// 预留固定容量的缓冲区；失败时返回 `AllocationFailure`
pub(crate) fn try_vec_with_capacity<T>(what: &'static str, len: usize) -> Result<Vec<T>, ScanError> {
    let mut v = Vec::new();
    v.try_reserve_exact(len)
        .map_err(|_| ScanError::AllocationFailure { what, len })?;
    Ok(v)
}
