//! 组件 - 带状态的节点, 渲染模板产出元素树

use crate::element::ElementTree;
use crate::node::Node;
use crate::properties::Properties;
use crate::scheduler::{Completion, Scheduler};
use crate::template::{Context, Template};
use serde::Serialize;
use serde_json::Value as JsonValue;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

static COMPONENT_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// 组件 ID - 非持有的反向标识
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ComponentId(pub u64);

impl ComponentId {
    pub fn next() -> Self {
        Self(COMPONENT_ID_COUNTER.fetch_add(1, Ordering::SeqCst))
    }
}

/// 渲染作用域: render 时组件可见的环境
pub struct RenderScope<'a, S> {
    pub properties: &'a Properties,
    pub state: &'a S,
    context: Option<&'a Context>,
    component: ComponentId,
}

impl<'a, S> RenderScope<'a, S> {
    /// 按位置取模板, 同时登记为该位置的观察者
    ///
    /// 位置未注册模板属于树描述错误, 直接终止。
    pub fn template(&self, location: &str) -> Template {
        let context = self
            .context
            .unwrap_or_else(|| panic!("组件缺少 Context, 无法加载模板 {}", location));
        context.templates.add_observer(self.component, location);
        context.templates.get(location)
    }
}

/// 组件行为
///
/// `render` 必须由实现者提供, 默认实现视为未声明渲染逻辑, 首次
/// 访问 instance 时终止。
pub trait Render: 'static {
    type State: Default + Clone + PartialEq + Serialize + 'static;

    fn render(&self, _scope: &RenderScope<'_, Self::State>) -> Template {
        panic!("render() 必须由组件实现");
    }

    /// 初始状态, 默认取类型默认值
    fn get_initial_state(&self) -> Self::State {
        Self::State::default()
    }

    /// 是否需要重建, 默认: 属性或状态值不相等
    fn should_update(
        &self,
        properties: &Properties,
        next_properties: &Properties,
        state: &Self::State,
        next_state: &Self::State,
    ) -> bool {
        properties != next_properties || state != next_state
    }
}

/// instance 缓存槽
///
/// 显式三态, `Building` 兼作重入保护: 渲染过程中再次请求 instance
/// 说明渲染产生了环, 终止。
pub enum InstanceSlot {
    Absent,
    Building,
    Built(Node),
}

/// 组合组件: 行为 + 属性 + 惰性状态 + instance 缓存
pub struct Composite<R: Render> {
    id: ComponentId,
    behavior: R,
    properties: Properties,
    state: Option<R::State>,
    slot: InstanceSlot,
    owner: Option<ComponentId>,
    context: Option<Context>,
    children: Vec<Node>,
    renders: u32,
}

impl<R: Render> Composite<R> {
    pub fn new(behavior: R, properties: Properties) -> Self {
        Self::create(behavior, properties, Vec::new(), None, None)
    }

    pub fn create(
        behavior: R,
        properties: Properties,
        children: Vec<Node>,
        owner: Option<ComponentId>,
        context: Option<Context>,
    ) -> Self {
        Self {
            id: ComponentId::next(),
            behavior,
            properties,
            state: None,
            slot: InstanceSlot::Absent,
            owner,
            context,
            children,
            renders: 0,
        }
    }

    pub fn id(&self) -> ComponentId {
        self.id
    }

    pub fn owner(&self) -> Option<ComponentId> {
        self.owner
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    /// 当前状态, 首次访问时初始化
    pub fn state(&mut self) -> &R::State {
        self.ensure_state();
        self.state.as_ref().unwrap()
    }

    /// 已构建的 instance, 首次访问时渲染并构建
    pub fn instance(&mut self) -> &Node {
        self.ensure_built();
        match &self.slot {
            InstanceSlot::Built(node) => node,
            _ => unreachable!(),
        }
    }

    /// 应用状态变更, 必要时安排重建
    ///
    /// 变更在状态副本上同步执行后原子提交, 外部看不到中间状态。
    /// `should_update` 否决时变更照常提交但不重建, completion 立即执行;
    /// 否则作废 instance 并入队, completion 在重建之后执行。
    /// 两种路径 completion 都恰好执行一次。
    pub fn update_state<F>(
        &mut self,
        scheduler: &mut Scheduler,
        mutation: F,
        completion: Option<Completion>,
    ) where
        F: FnOnce(&mut R::State),
    {
        self.ensure_state();
        let current = self.state.clone().unwrap();
        let mut next = current.clone();
        mutation(&mut next);

        let rebuild =
            self.behavior
                .should_update(&self.properties, &self.properties, &current, &next);
        self.state = Some(next);

        if rebuild {
            self.invalidate();
            scheduler.schedule(self.id, completion);
        } else if let Some(done) = completion {
            done();
        }
    }

    /// 替换属性, 必要时安排重建
    pub fn update_properties(&mut self, scheduler: &mut Scheduler, next: Properties) {
        self.ensure_state();
        let state = self.state.clone().unwrap();
        let rebuild = self
            .behavior
            .should_update(&self.properties, &next, &state, &state);
        self.properties = next;

        if rebuild {
            self.invalidate();
            scheduler.schedule(self.id, None);
        }
    }

    /// 作废缓存的 instance
    pub fn invalidate(&mut self) {
        if matches!(self.slot, InstanceSlot::Built(_)) {
            self.slot = InstanceSlot::Absent;
        }
    }

    /// 已发生的渲染次数
    pub fn render_count(&self) -> u32 {
        self.renders
    }

    fn ensure_state(&mut self) {
        if self.state.is_none() {
            self.state = Some(self.behavior.get_initial_state());
        }
    }

    fn ensure_built(&mut self) {
        match self.slot {
            InstanceSlot::Built(_) => return,
            InstanceSlot::Building => {
                panic!(
                    "组件 <{}> 渲染过程中再次请求 instance",
                    std::any::type_name::<R>()
                )
            }
            InstanceSlot::Absent => {}
        }

        self.ensure_state();
        self.slot = InstanceSlot::Building;
        let node = self.force_render();
        self.slot = InstanceSlot::Built(node);
        self.renders += 1;
        debug!(component = self.id.0, renders = self.renders, "组件渲染完成");
    }

    // 渲染模板 → 绑定元素树 → 套样式表 → 构建节点
    fn force_render(&self) -> Node {
        let scope = RenderScope {
            properties: &self.properties,
            state: self.state.as_ref().unwrap(),
            context: self.context.as_ref(),
            component: self.id,
        };
        let template = self.behavior.render(&scope);

        let data = binding_data(&self.properties, self.state.as_ref().unwrap());
        let mut tree = ElementTree::new();
        let root = template.bind(&mut tree, &data);
        tree.build(root, Some(self.id), self.context.as_ref())
    }
}

/// 组件绑定数据: 属性值打底, 状态字段覆盖在上
fn binding_data<S: Serialize>(properties: &Properties, state: &S) -> JsonValue {
    let mut map = properties.to_json_map();
    if let Ok(JsonValue::Object(fields)) = serde_json::to_value(state) {
        for (name, value) in fields {
            map.insert(name, value);
        }
    }
    JsonValue::Object(map)
}

/// 类型擦除的组件接口, 节点树按它持有任意组件
pub trait AnyComponent {
    fn id(&self) -> ComponentId;
    fn name(&self) -> &str;
    fn properties(&self) -> &Properties;
    fn set_context(&mut self, context: Context);
    /// 强制构建并返回 instance
    fn instance_mut(&mut self) -> &mut Node;
    /// 仅当已构建时返回 instance
    fn built_instance_mut(&mut self) -> Option<&mut Node>;
    fn invalidate(&mut self);
    /// 作废并立即重新渲染
    fn rebuild(&mut self);
    fn render_count(&self) -> u32;
    /// 自身或已构建的子树中是否存在该组件
    fn contains_component(&self, id: ComponentId) -> bool;
    /// 按 id 查找组件, 含自身与已构建的子树
    fn find_component_mut(&mut self, id: ComponentId) -> Option<&mut dyn AnyComponent>;
}

impl<R: Render> AnyComponent for Composite<R> {
    fn id(&self) -> ComponentId {
        self.id
    }

    fn name(&self) -> &str {
        std::any::type_name::<R>()
    }

    fn properties(&self) -> &Properties {
        &self.properties
    }

    fn set_context(&mut self, context: Context) {
        self.context = Some(context);
    }

    fn instance_mut(&mut self) -> &mut Node {
        self.ensure_built();
        match &mut self.slot {
            InstanceSlot::Built(node) => node,
            _ => unreachable!(),
        }
    }

    fn built_instance_mut(&mut self) -> Option<&mut Node> {
        match &mut self.slot {
            InstanceSlot::Built(node) => Some(node),
            _ => None,
        }
    }

    fn invalidate(&mut self) {
        Composite::invalidate(self);
    }

    fn rebuild(&mut self) {
        self.invalidate();
        self.ensure_built();
        debug!(component = self.id.0, "组件重建完成");
    }

    fn render_count(&self) -> u32 {
        self.renders
    }

    fn contains_component(&self, id: ComponentId) -> bool {
        if self.id == id {
            return true;
        }
        if let InstanceSlot::Built(node) = &self.slot {
            if node.contains_component(id) {
                return true;
            }
        }
        self.children.iter().any(|child| child.contains_component(id))
    }

    fn find_component_mut(&mut self, id: ComponentId) -> Option<&mut dyn AnyComponent> {
        if self.id == id {
            return Some(self);
        }
        // 先只读定位, 再走唯一一条可变路径
        let in_instance = matches!(&self.slot, InstanceSlot::Built(node) if node.contains_component(id));
        if in_instance {
            match &mut self.slot {
                InstanceSlot::Built(node) => node.find_component_mut(id),
                _ => unreachable!(),
            }
        } else {
            self.children
                .iter_mut()
                .find_map(|child| child.find_component_mut(id))
        }
    }
}
