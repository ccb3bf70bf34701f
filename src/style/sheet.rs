//! 样式表数据结构

use super::value::PropertyValue;

/// 选择器
///
/// 结构组合器 (`Descendant`/`Child`/`Adjacent`/`Sibling`) 的第一个分量
/// 匹配结构上的"另一个"元素, 第二个分量匹配当前元素本身。
#[derive(Debug, Clone, PartialEq)]
pub enum Selector {
    /// `*`
    Universal,
    /// 标签选择器, 如 `view`
    Tag(String),
    /// `#id`
    Id(String),
    /// `.class`
    Class(String),
    /// `[name=value]`
    Attribute(String, String),
    /// 复合选择器, 如 `view.container#main`, 所有分量匹配同一元素
    Compound(Vec<Selector>),
    /// `A B` — 祖先 A 下的任意后代 B
    Descendant(Box<Selector>, Box<Selector>),
    /// `A > B` — 父元素 A 的直接子元素 B
    Child(Box<Selector>, Box<Selector>),
    /// `A + B` — 紧邻前兄弟 A 之后的 B
    Adjacent(Box<Selector>, Box<Selector>),
    /// `A ~ B` — 任意前兄弟 A 之后的 B
    Sibling(Box<Selector>, Box<Selector>),
}

/// 样式规则: 选择器 + 有序声明列表
///
/// 声明保持书写顺序, 同名属性后写的覆盖先写的。
#[derive(Debug, Clone, PartialEq)]
pub struct StyleRule {
    pub selector: Selector,
    pub declarations: Vec<(String, PropertyValue)>,
}

/// 样式表, 规则按出现顺序排列
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StyleSheet {
    pub rules: Vec<StyleRule>,
}

impl StyleSheet {
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }
}
