//! 属性包 - 元素的类型化配置

use crate::parser::css::{parse_declaration_value, parse_inline_style};
use crate::style::PropertyValue;
use serde_json::{Map as JsonMap, Value as JsonValue};
use std::collections::{BTreeMap, HashMap};

/// 元素标识: id / class 列表 / 兄弟间的 key
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Identifier {
    pub id: Option<String>,
    pub class_names: Vec<String>,
    pub key: Option<String>,
}

/// 属性包
///
/// 由无类型的字符串字典构造, 值解析为 [`PropertyValue`]。
/// `identifier` 承载 id/class/key, 其余进入 `values`。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Properties {
    pub identifier: Identifier,
    pub values: BTreeMap<String, PropertyValue>,
}

impl Properties {
    pub fn new() -> Self {
        Self::default()
    }

    /// 从原始字符串属性字典构造 (模板解析产物)
    ///
    /// `id`/`class`/`key` 进入 identifier; 其它属性逐个解析成
    /// 类型化的值; `style` 按内联样式展开, 固定在普通属性之后落位,
    /// 同名属性以内联样式为准 (字典迭代无序, 顺序必须显式定死)。
    pub fn from_attributes(attributes: &HashMap<String, String>) -> Self {
        let mut properties = Properties::new();

        for (name, value) in attributes {
            match name.as_str() {
                "id" => properties.identifier.id = Some(value.clone()),
                "key" => properties.identifier.key = Some(value.clone()),
                "class" => {
                    properties.identifier.class_names =
                        value.split_whitespace().map(|c| c.to_string()).collect();
                }
                "style" => {}
                _ => {
                    properties
                        .values
                        .insert(name.clone(), parse_declaration_value(name, value));
                }
            }
        }

        if let Some(style) = attributes.get("style") {
            for (prop, parsed) in parse_inline_style(style) {
                properties.values.insert(prop, parsed);
            }
        }

        properties
    }

    /// 从有序声明列表构造 (样式表匹配产物, 后写覆盖先写)
    pub fn from_declarations(declarations: &[(String, PropertyValue)]) -> Self {
        let mut properties = Properties::new();
        for (name, value) in declarations {
            properties.values.insert(name.clone(), value.clone());
        }
        properties
    }

    pub fn set(&mut self, name: &str, value: PropertyValue) {
        self.values.insert(name.to_string(), value);
    }

    pub fn with(mut self, name: &str, value: PropertyValue) -> Self {
        self.set(name, value);
        self
    }

    pub fn with_key(mut self, key: &str) -> Self {
        self.identifier.key = Some(key.to_string());
        self
    }

    pub fn with_id(mut self, id: &str) -> Self {
        self.identifier.id = Some(id.to_string());
        self
    }

    pub fn with_class(mut self, class_name: &str) -> Self {
        self.identifier.class_names.push(class_name.to_string());
        self
    }

    pub fn get(&self, name: &str) -> Option<&PropertyValue> {
        self.values.get(name)
    }

    /// 属性选择器匹配: `[name=value]`
    pub fn has(&self, attribute: &str, value: &str) -> bool {
        self.values
            .get(attribute)
            .map(|v| v.matches_text(value))
            .unwrap_or(false)
    }

    /// 合并另一个属性包, `other` 优先
    ///
    /// 级联方向: 样式表派生的属性作为基底, 元素显式属性合并在上层。
    pub fn merge(&mut self, other: &Properties) {
        if other.identifier.id.is_some() {
            self.identifier.id = other.identifier.id.clone();
        }
        if other.identifier.key.is_some() {
            self.identifier.key = other.identifier.key.clone();
        }
        if !other.identifier.class_names.is_empty() {
            self.identifier.class_names = other.identifier.class_names.clone();
        }
        for (name, value) in &other.values {
            self.values.insert(name.clone(), value.clone());
        }
    }

    /// 转成模板绑定数据 (属性名 -> JSON 值)
    pub fn to_json_map(&self) -> JsonMap<String, JsonValue> {
        let mut map = JsonMap::new();
        for (name, value) in &self.values {
            map.insert(name.clone(), value.to_json());
        }
        map
    }
}
