//! 级联引擎 - 选择器匹配与属性合并

use super::sheet::{Selector, StyleSheet};
use super::value::PropertyValue;
use crate::element::{ElementId, ElementTree};
use crate::properties::Properties;
use tracing::debug;

impl StyleSheet {
    /// 收集匹配某元素的全部声明, 按规则顺序展平
    ///
    /// 同名属性后面的规则覆盖前面的 (last-match-wins 由调用方的
    /// 顺序插入保证)。
    pub fn declarations_for(
        &self,
        tree: &ElementTree,
        element: ElementId,
    ) -> Vec<(String, PropertyValue)> {
        let mut declarations = Vec::new();

        for rule in &self.rules {
            if selector_matches(tree, element, &rule.selector) {
                declarations.extend(rule.declarations.iter().cloned());
            }
        }

        declarations
    }

}

/// 选择器对元素的匹配判定
///
/// 结构组合器经由竞技场的兄弟/祖先查询求值, 兄弟定位走 key 链相等。
pub fn selector_matches(tree: &ElementTree, element: ElementId, selector: &Selector) -> bool {
    match selector {
        Selector::Universal => true,
        Selector::Tag(tag) => tree.tag_name(element) == tag,
        Selector::Id(id) => {
            tree.properties(element).identifier.id.as_deref() == Some(id.as_str())
        }
        Selector::Class(class_name) => tree
            .properties(element)
            .identifier
            .class_names
            .iter()
            .any(|c| c == class_name),
        Selector::Attribute(name, value) => tree.properties(element).has(name, value),
        Selector::Compound(parts) => parts
            .iter()
            .all(|part| selector_matches(tree, element, part)),
        Selector::Descendant(ancestor, this) => {
            if !selector_matches(tree, element, this) {
                return false;
            }
            let mut current = tree.parent(element);
            while let Some(parent) = current {
                if selector_matches(tree, parent, ancestor) {
                    return true;
                }
                current = tree.parent(parent);
            }
            false
        }
        Selector::Child(parent_sel, this) => {
            selector_matches(tree, element, this)
                && tree
                    .parent(element)
                    .map(|parent| selector_matches(tree, parent, parent_sel))
                    .unwrap_or(false)
        }
        Selector::Adjacent(previous, this) => {
            selector_matches(tree, element, this)
                && tree
                    .direct_adjacent(element)
                    .map(|sibling| selector_matches(tree, sibling, previous))
                    .unwrap_or(false)
        }
        Selector::Sibling(previous, this) => {
            selector_matches(tree, element, this)
                && tree
                    .indirect_adjacents(element)
                    .iter()
                    .any(|sibling| selector_matches(tree, *sibling, previous))
        }
    }
}

impl ElementTree {
    /// 对整棵子树应用样式表, 必须在 build 之前完成
    ///
    /// 每个元素: 匹配声明展平成属性基底, 元素自身的显式属性合并
    /// 在上层 (显式永远赢), 然后整体替换该元素的属性。
    /// 不保证幂等: 重复应用会重新派生、重新合并。
    pub fn apply_style_sheet(&mut self, root: ElementId, sheet: &StyleSheet) {
        self.apply_to_element(root, sheet);
        debug!(element = root.0, rules = sheet.rules.len(), "样式表应用完成");
    }

    fn apply_to_element(&mut self, element: ElementId, sheet: &StyleSheet) {
        let declarations = sheet.declarations_for(self, element);
        if !declarations.is_empty() {
            let mut styled = Properties::from_declarations(&declarations);
            styled.merge(self.properties(element));
            self.set_properties(element, styled);
        }

        for child in self.children(element).to_vec() {
            self.apply_to_element(child, sheet);
        }
    }
}
