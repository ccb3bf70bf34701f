//! 模板 - 绑定属性与状态, 产出元素树

use crate::element::{ElementId, ElementKind, ElementTree};
use crate::node::registry;
use crate::parser::css::StyleSheetParser;
use crate::parser::markup::{MarkupNode, MarkupNodeType, MarkupParser};
use crate::parser::ParseError;
use crate::properties::Properties;
use crate::style::{PropertyValue, StyleSheet};
use crate::ComponentId;
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// 模板: 标记节点 + 可选的样式表
///
/// 模板是可复用的元素生产单元, 绑定组件当前的属性/状态后产出
/// 一次性的元素树。样式表在构建前对整棵树生效。
#[derive(Debug, Clone, Default)]
pub struct Template {
    pub nodes: Vec<MarkupNode>,
    pub sheet: Option<StyleSheet>,
}

impl Template {
    pub fn parse(markup: &str) -> Result<Self, ParseError> {
        Ok(Self {
            nodes: MarkupParser::new(markup).parse()?,
            sheet: None,
        })
    }

    pub fn parse_with_styles(markup: &str, css: &str) -> Result<Self, ParseError> {
        Ok(Self {
            nodes: MarkupParser::new(markup).parse()?,
            sheet: Some(StyleSheetParser::new(css).parse()?),
        })
    }

    /// 绑定数据, 在竞技场中产出元素树并应用样式表, 返回根元素
    ///
    /// 多个顶层节点会包进一个 `view` 根元素。
    pub fn bind(&self, tree: &mut ElementTree, data: &JsonValue) -> ElementId {
        let roots = bind_nodes(tree, &self.nodes, data);
        let root = if roots.len() == 1 {
            roots[0]
        } else {
            tree.element(ElementKind::View("view".to_string()), Properties::new(), roots)
        };

        if let Some(sheet) = &self.sheet {
            tree.apply_style_sheet(root, sheet);
        }

        root
    }
}

// ---------- 绑定 ----------

fn bind_nodes(tree: &mut ElementTree, nodes: &[MarkupNode], data: &JsonValue) -> Vec<ElementId> {
    let mut result = Vec::new();

    for node in nodes {
        match node.node_type {
            MarkupNodeType::Comment => {}
            MarkupNodeType::Text => {
                let text = interpolate(&node.text_content, data);
                if !text.trim().is_empty() {
                    let properties =
                        Properties::new().with("content", PropertyValue::String(text));
                    result.push(tree.element(
                        ElementKind::View("text".to_string()),
                        properties,
                        Vec::new(),
                    ));
                }
            }
            MarkupNodeType::Element => {
                // t:if 条件渲染
                if let Some(condition) = node.attributes.get("t:if") {
                    if !evaluate_condition(&extract_expression(condition), data) {
                        continue;
                    }
                }

                // t:for 列表渲染
                if let Some(for_expr) = node.attributes.get("t:for") {
                    result.extend(bind_for_loop(tree, node, for_expr, data));
                    continue;
                }

                result.push(bind_element(tree, node, data));
            }
        }
    }

    result
}

fn bind_element(tree: &mut ElementTree, node: &MarkupNode, data: &JsonValue) -> ElementId {
    let mut attributes = HashMap::new();
    for (name, value) in &node.attributes {
        if name.starts_with("t:") {
            continue;
        }
        attributes.insert(name.clone(), interpolate(value, data));
    }
    let mut properties = Properties::from_attributes(&attributes);

    // 纯文本内容收进 content 属性, 否则递归绑定子节点
    let only_text = !node.children.is_empty()
        && node
            .children
            .iter()
            .all(|child| child.node_type == MarkupNodeType::Text);
    let children = if only_text {
        let text: String = node
            .children
            .iter()
            .map(|child| interpolate(&child.text_content, data))
            .collect();
        properties.set("content", PropertyValue::String(text.trim().to_string()));
        Vec::new()
    } else {
        bind_nodes(tree, &node.children, data)
    };

    let kind = registry::component_kind(&node.tag_name)
        .map(ElementKind::Component)
        .unwrap_or_else(|| ElementKind::View(node.tag_name.clone()));

    tree.element(kind, properties, children)
}

fn bind_for_loop(
    tree: &mut ElementTree,
    node: &MarkupNode,
    for_expr: &str,
    data: &JsonValue,
) -> Vec<ElementId> {
    let mut result = Vec::new();

    let array_name = extract_expression(for_expr);
    let item_name = node
        .attributes
        .get("t:for-item")
        .map(|s| s.as_str())
        .unwrap_or("item");
    let index_name = node
        .attributes
        .get("t:for-index")
        .map(|s| s.as_str())
        .unwrap_or("index");

    if let Some(array) = get_value(&array_name, data).and_then(|v| v.as_array()) {
        for (index, item) in array.iter().enumerate() {
            // 循环上下文: 数据副本加上 item/index
            let mut loop_data = data.clone();
            if let Some(fields) = loop_data.as_object_mut() {
                fields.insert(item_name.to_string(), item.clone());
                fields.insert(index_name.to_string(), JsonValue::Number(index.into()));
            }
            result.push(bind_element(tree, node, &loop_data));
        }
    }

    result
}

// ---------- 表达式求值 ----------

/// 替换 {{expression}} 插值
fn interpolate(template: &str, data: &JsonValue) -> String {
    let mut result = template.to_string();
    let mut start = 0;

    while let Some(open) = result[start..].find("{{") {
        let open = start + open;
        if let Some(close) = result[open..].find("}}") {
            let close = open + close;
            let expr = result[open + 2..close].trim().to_string();
            let value = evaluate_expression(&expr, data);
            result = format!("{}{}{}", &result[..open], value, &result[close + 2..]);
            start = open + value.len();
        } else {
            break;
        }
    }

    result
}

/// 提取 {{}} 中的表达式
fn extract_expression(s: &str) -> String {
    let s = s.trim();
    if s.starts_with("{{") && s.ends_with("}}") {
        s[2..s.len() - 2].trim().to_string()
    } else {
        s.to_string()
    }
}

fn evaluate_expression(expr: &str, data: &JsonValue) -> String {
    let expr = expr.trim();

    // 三元表达式: condition ? true_val : false_val
    if let Some(q_pos) = expr.find('?') {
        if let Some(c_pos) = expr[q_pos..].find(':') {
            let condition = expr[..q_pos].trim();
            let true_val = expr[q_pos + 1..q_pos + c_pos].trim();
            let false_val = expr[q_pos + c_pos + 1..].trim();

            return if evaluate_condition(condition, data) {
                evaluate_expression(true_val, data)
            } else {
                evaluate_expression(false_val, data)
            };
        }
    }

    // 字符串字面量
    if (expr.starts_with('\'') && expr.ends_with('\'') && expr.len() >= 2)
        || (expr.starts_with('"') && expr.ends_with('"') && expr.len() >= 2)
    {
        return expr[1..expr.len() - 1].to_string();
    }

    // 数字字面量
    if expr.parse::<f64>().is_ok() {
        return expr.to_string();
    }

    // 变量访问
    if let Some(value) = get_value(expr, data) {
        return json_to_string(value);
    }

    expr.to_string()
}

fn evaluate_condition(expr: &str, data: &JsonValue) -> bool {
    let expr = expr.trim();

    // 否定
    if let Some(inner) = expr.strip_prefix('!') {
        return !evaluate_condition(inner, data);
    }

    // 比较运算
    for op in &["===", "!==", "==", "!=", ">=", "<=", ">", "<"] {
        if let Some(pos) = expr.find(op) {
            let left = evaluate_expression(&expr[..pos], data);
            let right = evaluate_expression(&expr[pos + op.len()..], data);

            return match *op {
                "===" | "==" => left == right,
                "!==" | "!=" => left != right,
                ">" => left.parse::<f64>().unwrap_or(0.0) > right.parse::<f64>().unwrap_or(0.0),
                "<" => left.parse::<f64>().unwrap_or(0.0) < right.parse::<f64>().unwrap_or(0.0),
                ">=" => left.parse::<f64>().unwrap_or(0.0) >= right.parse::<f64>().unwrap_or(0.0),
                "<=" => left.parse::<f64>().unwrap_or(0.0) <= right.parse::<f64>().unwrap_or(0.0),
                _ => false,
            };
        }
    }

    if let Some(value) = get_value(expr, data) {
        return is_truthy(value);
    }

    !expr.is_empty() && expr != "false" && expr != "0"
}

/// 按点路径取数据值, 支持数组下标 items[0]
fn get_value<'a>(path: &str, data: &'a JsonValue) -> Option<&'a JsonValue> {
    let mut current = data;

    for part in path.split('.') {
        if let Some(bracket_pos) = part.find('[') {
            let name = &part[..bracket_pos];
            // 残缺的下标 (缺 ']') 按查不到处理
            let index_str = part[bracket_pos + 1..].strip_suffix(']')?;

            if !name.is_empty() {
                current = current.get(name)?;
            }
            if let Ok(index) = index_str.parse::<usize>() {
                current = current.get(index)?;
            }
        } else {
            current = current.get(part)?;
        }
    }

    Some(current)
}

fn json_to_string(value: &JsonValue) -> String {
    match value {
        JsonValue::String(s) => s.clone(),
        JsonValue::Number(n) => n.to_string(),
        JsonValue::Bool(b) => b.to_string(),
        JsonValue::Null => String::new(),
        _ => value.to_string(),
    }
}

fn is_truthy(value: &JsonValue) -> bool {
    match value {
        JsonValue::Null => false,
        JsonValue::Bool(b) => *b,
        JsonValue::Number(n) => n.as_f64().unwrap_or(0.0) != 0.0,
        JsonValue::String(s) => !s.is_empty(),
        JsonValue::Array(a) => !a.is_empty(),
        JsonValue::Object(_) => true,
    }
}

// ---------- 模板服务 ----------

/// 模板注册表
///
/// 按位置存放已加载的模板, 并记录观察某位置的组件。
/// 资源层(文件监听等)在外部, 这里只管查表与观察者登记。
#[derive(Default)]
pub struct TemplateRegistry {
    templates: Mutex<HashMap<String, Template>>,
    observers: Mutex<HashMap<String, Vec<ComponentId>>>,
}

impl TemplateRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, location: &str, template: Template) {
        self.templates
            .lock()
            .unwrap()
            .insert(location.to_string(), template);
    }

    /// 取模板, 位置未注册属于树描述错误, 直接终止
    pub fn get(&self, location: &str) -> Template {
        self.templates
            .lock()
            .unwrap()
            .get(location)
            .cloned()
            .unwrap_or_else(|| panic!("位置 {} 没有注册模板", location))
    }

    /// 登记观察者, 模板重载时据此决定谁需要重建
    pub fn add_observer(&self, component: ComponentId, location: &str) {
        let mut observers = self.observers.lock().unwrap();
        let entry = observers.entry(location.to_string()).or_default();
        if !entry.contains(&component) {
            entry.push(component);
        }
    }

    pub fn observers(&self, location: &str) -> Vec<ComponentId> {
        self.observers
            .lock()
            .unwrap()
            .get(location)
            .cloned()
            .unwrap_or_default()
    }

    /// 替换模板, 返回需要作废重建的观察者
    pub fn reload(&self, location: &str, template: Template) -> Vec<ComponentId> {
        self.insert(location, template);
        self.observers(location)
    }
}

/// 环境上下文, 沿 build 显式向下传递
#[derive(Clone, Default)]
pub struct Context {
    pub templates: Arc<TemplateRegistry>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }
}
