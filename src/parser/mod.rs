//! 标记与样式表解析器

pub mod css;
pub mod markup;

pub use css::StyleSheetParser;
pub use markup::{MarkupNode, MarkupNodeType, MarkupParser};

use thiserror::Error;

/// 解析错误
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("空标签名")]
    EmptyTagName,
    #[error("标签不匹配: <{open}> 对 </{close}>")]
    MismatchedTag { open: String, close: String },
    #[error("期望 '{expected}', 实际 '{found}'")]
    Unexpected { expected: char, found: char },
    #[error("标签未闭合就到达输入末尾")]
    UnexpectedEof,
    #[error("选择器 '{0}' 无法解析")]
    BadSelector(String),
}
