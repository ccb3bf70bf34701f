//! 活动节点 - 元素描述实例化后的对象

use crate::component::{AnyComponent, ComponentId};
use crate::element::{ElementId, ElementTree};
use crate::properties::Properties;
use crate::template::Context;
use thiserror::Error;

/// 节点访问错误
#[derive(Debug, Error)]
pub enum NodeError {
    #[error("期望原生视图节点, 实际是组件 <{0}>")]
    NotAView(String),
    #[error("期望组件节点, 实际是原生视图 <{0}>")]
    NotAComponent(String),
}

/// 活动节点: 原生视图或组件实例
///
/// 元素每轮渲染都重建, 节点跨渲染存活, 只在类型/key 不匹配时被替换。
pub enum Node {
    View(ViewNode),
    Component(Box<dyn AnyComponent>),
}

impl Node {
    pub fn tag_name(&self) -> &str {
        match self {
            Node::View(view) => &view.tag,
            Node::Component(component) => component.name(),
        }
    }

    pub fn properties(&self) -> &Properties {
        match self {
            Node::View(view) => &view.properties,
            Node::Component(component) => component.properties(),
        }
    }

    /// 受检访问: 原生视图
    pub fn as_view(&self) -> Result<&ViewNode, NodeError> {
        match self {
            Node::View(view) => Ok(view),
            Node::Component(component) => Err(NodeError::NotAView(component.name().to_string())),
        }
    }

    pub fn as_view_mut(&mut self) -> Result<&mut ViewNode, NodeError> {
        match self {
            Node::View(view) => Ok(view),
            Node::Component(component) => Err(NodeError::NotAView(component.name().to_string())),
        }
    }

    /// 受检访问: 组件
    pub fn as_component_mut(&mut self) -> Result<&mut dyn AnyComponent, NodeError> {
        match self {
            Node::Component(component) => Ok(component.as_mut()),
            Node::View(view) => Err(NodeError::NotAComponent(view.tag.clone())),
        }
    }

    /// 节点树中是否存在该组件 (不触发惰性构建)
    pub fn contains_component(&self, id: ComponentId) -> bool {
        match self {
            Node::Component(component) => component.contains_component(id),
            Node::View(view) => view.children.iter().any(|child| child.contains_component(id)),
        }
    }

    /// 在节点树中按 id 查找组件 (不触发惰性构建)
    pub fn find_component_mut(&mut self, id: ComponentId) -> Option<&mut dyn AnyComponent> {
        match self {
            Node::Component(component) => component.find_component_mut(id),
            Node::View(view) => view
                .children
                .iter_mut()
                .find_map(|child| child.find_component_mut(id)),
        }
    }
}

/// 原生视图节点
///
/// `owner` 是构建它的组件 id, 纯粹的反向标识, 不持有任何东西。
pub struct ViewNode {
    pub tag: String,
    pub properties: Properties,
    pub children: Vec<Node>,
    pub owner: Option<ComponentId>,
    pub context: Option<Context>,
}

impl ViewNode {
    pub fn new(tag: &str, properties: Properties, owner: Option<ComponentId>) -> Self {
        Self {
            tag: tag.to_string(),
            properties,
            children: Vec::new(),
            owner,
            context: None,
        }
    }
}

/// 原生视图工厂: 从元素构建视图节点
pub type ViewFactory = fn(&ElementTree, ElementId, Option<ComponentId>) -> ViewNode;

/// 组件类型描述符: 名字 + 构造函数
#[derive(Clone, Copy)]
pub struct ComponentKind {
    pub name: &'static str,
    pub make: fn(
        Properties,
        Vec<Node>,
        Option<ComponentId>,
        Option<Context>,
    ) -> Box<dyn AnyComponent>,
}

impl PartialEq for ComponentKind {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.make as usize == other.make as usize
    }
}

impl std::fmt::Debug for ComponentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComponentKind").field("name", &self.name).finish()
    }
}

/// 标签注册表
pub mod registry {
    use super::*;
    use once_cell::sync::Lazy;
    use std::collections::HashMap;
    use std::sync::Mutex;

    static VIEW_FACTORIES: Lazy<Mutex<HashMap<String, ViewFactory>>> =
        Lazy::new(|| Mutex::new(HashMap::new()));

    static COMPONENT_KINDS: Lazy<Mutex<HashMap<&'static str, ComponentKind>>> =
        Lazy::new(|| Mutex::new(HashMap::new()));

    /// 注册原生视图工厂
    pub fn register_view(tag: &str, factory: ViewFactory) {
        VIEW_FACTORIES
            .lock()
            .unwrap()
            .insert(tag.to_string(), factory);
    }

    /// 注册组件类型, 模板里可以按名字使用
    pub fn register_component(kind: ComponentKind) {
        COMPONENT_KINDS.lock().unwrap().insert(kind.name, kind);
    }

    /// 查找视图工厂, 未注册的标签退化为通用视图
    pub fn view_factory(tag: &str) -> ViewFactory {
        VIEW_FACTORIES
            .lock()
            .unwrap()
            .get(tag)
            .copied()
            .unwrap_or(default_view_factory)
    }

    pub fn component_kind(tag: &str) -> Option<ComponentKind> {
        COMPONENT_KINDS.lock().unwrap().get(tag).copied()
    }

    /// 默认工厂: 标签 + 最终属性直接落成视图节点
    pub fn default_view_factory(
        tree: &ElementTree,
        element: ElementId,
        owner: Option<ComponentId>,
    ) -> ViewNode {
        ViewNode::new(tree.tag_name(element), tree.properties(element).clone(), owner)
    }
}
