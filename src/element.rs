//! 元素树 - 声明式 UI 节点描述
//!
//! 元素是"想要什么"的一次性描述, 存放在 [`ElementTree`] 竞技场里,
//! 父/子关系都是 [`ElementId`] 句柄, 所有权始终属于竞技场本身,
//! 反向引用不构成所有权, 也就不可能出现引用环。

use crate::node::{registry, ComponentKind, Node};
use crate::properties::Properties;
use crate::template::Context;
use crate::ComponentId;

/// 元素句柄 (竞技场下标)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ElementId(pub usize);

/// 元素类型描述符: 要构建哪种节点
#[derive(Debug, Clone, PartialEq)]
pub enum ElementKind {
    /// 原生视图, 按标签名经注册表构建
    View(String),
    /// 组件, 携带构造函数
    Component(ComponentKind),
}

impl ElementKind {
    pub fn tag_name(&self) -> &str {
        match self {
            ElementKind::View(tag) => tag,
            ElementKind::Component(kind) => kind.name,
        }
    }
}

/// 单个元素的数据
#[derive(Debug, Clone)]
pub struct ElementData {
    pub kind: ElementKind,
    pub properties: Properties,
    pub children: Vec<ElementId>,
    pub parent: Option<ElementId>,
}

/// 元素竞技场
///
/// 每轮渲染新建一棵, 渲染结束即废弃, 元素本身是廉价的值。
#[derive(Debug, Default)]
pub struct ElementTree {
    elements: Vec<ElementData>,
}

impl ElementTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// 创建一个元素, 子元素的 parent 与 key 在此回填
    ///
    /// 没有显式 key 的子元素拿到位置下标字符串作为 key。
    /// 同级出现重复 key 属于树描述错误, 直接 panic。
    pub fn element(
        &mut self,
        kind: ElementKind,
        properties: Properties,
        children: Vec<ElementId>,
    ) -> ElementId {
        let id = ElementId(self.elements.len());
        self.elements.push(ElementData {
            kind,
            properties,
            children: children.clone(),
            parent: None,
        });

        for (index, child) in children.iter().enumerate() {
            let data = &mut self.elements[child.0];
            data.parent = Some(id);
            if data.properties.identifier.key.is_none() {
                data.properties.identifier.key = Some(index.to_string());
            }
        }

        // 重复的同级 key 会让选择器匹配把不同兄弟当成同一个, 必须在构造时拒绝
        for (i, a) in children.iter().enumerate() {
            for b in &children[i + 1..] {
                if self.key(*a) == self.key(*b) {
                    panic!(
                        "元素 <{}> 的子元素出现重复 key: {:?}",
                        self.tag_name(id),
                        self.key(*a)
                    );
                }
            }
        }

        id
    }

    pub fn get(&self, id: ElementId) -> &ElementData {
        &self.elements[id.0]
    }

    pub fn properties(&self, id: ElementId) -> &Properties {
        &self.elements[id.0].properties
    }

    pub fn set_properties(&mut self, id: ElementId, properties: Properties) {
        self.elements[id.0].properties = properties;
    }

    pub fn tag_name(&self, id: ElementId) -> &str {
        self.elements[id.0].kind.tag_name()
    }

    pub fn key(&self, id: ElementId) -> Option<&str> {
        self.elements[id.0].properties.identifier.key.as_deref()
    }

    pub fn parent(&self, id: ElementId) -> Option<ElementId> {
        self.elements[id.0].parent
    }

    pub fn children(&self, id: ElementId) -> &[ElementId] {
        &self.elements[id.0].children
    }

    /// 沿 key 链的结构相等
    ///
    /// 两个元素相等 ⇔ key 相同, 且双方都是根或者双方的父元素相等。
    /// 不比较属性值, 也不看句柄是否相同 — 同 key 同链的两个实例可互换。
    pub fn equal(&self, a: ElementId, b: ElementId) -> bool {
        if self.key(a) != self.key(b) {
            return false;
        }
        match (self.parent(a), self.parent(b)) {
            (None, None) => true,
            (Some(pa), Some(pb)) => self.equal(pa, pb),
            _ => false,
        }
    }

    /// 紧邻的前一个兄弟, 第一个元素没有
    pub fn direct_adjacent(&self, of: ElementId) -> Option<ElementId> {
        let parent = self.parent(of)?;
        let index = self.position_in_parent(of)?;
        if index == 0 {
            return None;
        }
        Some(self.children(parent)[index - 1])
    }

    /// 严格在前的所有兄弟
    pub fn indirect_adjacents(&self, of: ElementId) -> Vec<ElementId> {
        match (self.parent(of), self.position_in_parent(of)) {
            (Some(parent), Some(index)) => self.children(parent)[..index].to_vec(),
            _ => Vec::new(),
        }
    }

    /// 严格在后的所有兄弟
    pub fn subsequent_adjacents(&self, of: ElementId) -> Vec<ElementId> {
        match (self.parent(of), self.position_in_parent(of)) {
            (Some(parent), Some(index)) => self.children(parent)[index + 1..].to_vec(),
            _ => Vec::new(),
        }
    }

    // 在父元素的子列表中定位, 按 key 链相等查找而不是句柄相等
    fn position_in_parent(&self, of: ElementId) -> Option<usize> {
        let parent = self.parent(of)?;
        self.children(parent)
            .iter()
            .position(|child| self.equal(*child, of))
    }

    /// 构建一个元素及其整棵子树为活动节点
    ///
    /// 原生视图经注册表的工厂构建, 组件经其构造函数实例化;
    /// 环境 [`Context`] 显式传递到每个产出的节点。
    /// 除样式应用之外, 构建过程不改动元素本身。
    pub fn build(&self, id: ElementId, owner: Option<ComponentId>, context: Option<&Context>) -> Node {
        match &self.get(id).kind {
            ElementKind::View(tag) => {
                let factory = registry::view_factory(tag);
                let mut view = factory(self, id, owner);
                view.context = context.cloned();
                view.children = self
                    .children(id)
                    .iter()
                    .map(|child| self.build(*child, owner, context))
                    .collect();
                Node::View(view)
            }
            ElementKind::Component(kind) => {
                let children = self
                    .children(id)
                    .iter()
                    .map(|child| self.build(*child, owner, context))
                    .collect();
                Node::Component((kind.make)(
                    self.properties(id).clone(),
                    children,
                    owner,
                    context.cloned(),
                ))
            }
        }
    }
}
