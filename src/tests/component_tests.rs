//! 组件单元测试
//! 测试惰性构建、状态更新门控、调度重建

use crate::{
    AnyComponent, ComponentId, Composite, Node, Properties, PropertyValue, Render, RenderScope,
    Scheduler, Template, ViewNode,
};
use serde::Serialize;
use std::cell::Cell;
use std::rc::Rc;

/// 计数器组件
#[derive(Default)]
struct Counter;

#[derive(Debug, Default, Clone, PartialEq, Serialize)]
struct CounterState {
    count: u32,
}

impl Render for Counter {
    type State = CounterState;

    fn render(&self, _scope: &RenderScope<'_, CounterState>) -> Template {
        Template::parse(r#"<view class="counter"><text>{{count}}</text></view>"#).unwrap()
    }
}

/// 没有实现 render 的组件
#[derive(Default)]
struct Hollow;

#[derive(Debug, Default, Clone, PartialEq, Serialize)]
struct EmptyState;

impl Render for Hollow {
    type State = EmptyState;
}

/// 辅助函数：读出 counter 实例里的文本内容
fn counter_text(component: &mut Composite<Counter>) -> String {
    let root = component.instance_mut().as_view_mut().unwrap();
    let text = root.children[0].as_view().unwrap();
    match text.properties.get("content") {
        Some(PropertyValue::String(s)) => s.clone(),
        other => panic!("意外的 content: {:?}", other),
    }
}

/// 默认初始状态等于类型默认值
#[test]
fn test_default_initial_state() {
    let mut component = Composite::new(Counter, Properties::new());
    assert_eq!(component.state(), &CounterState::default());
}

/// 相同属性与状态下默认 should_update 返回 false
#[test]
fn test_should_update_false_on_identical() {
    let properties = Properties::new();
    let state = CounterState::default();
    assert!(!Counter.should_update(&properties, &properties, &state, &state));
}

/// 属性或状态任一变化即返回 true
#[test]
fn test_should_update_true_on_difference() {
    let properties = Properties::new();
    let changed = Properties::new().with("width", PropertyValue::Number(1.0));
    let state = CounterState::default();
    let next = CounterState { count: 1 };

    assert!(Counter.should_update(&properties, &changed, &state, &state));
    assert!(Counter.should_update(&properties, &properties, &state, &next));
}

/// instance 惰性构建且只构建一次
#[test]
fn test_instance_built_at_most_once() {
    let mut component = Composite::new(Counter, Properties::new());
    assert_eq!(component.render_count(), 0);

    component.instance();
    component.instance();
    assert_eq!(component.render_count(), 1);
}

/// instance 的内容来自模板绑定当前状态
#[test]
fn test_instance_reflects_state() {
    let mut component = Composite::new(Counter, Properties::new());
    assert_eq!(counter_text(&mut component), "0");
}

/// 场景: 无变化的状态更新 — 提交但不重建, completion 执行一次
#[test]
fn test_vetoed_update_commits_without_rebuild() {
    let mut component = Composite::new(Counter, Properties::new());
    let mut scheduler = Scheduler::new();
    component.instance();

    let calls = Rc::new(Cell::new(0u32));
    let observed = calls.clone();
    component.update_state(
        &mut scheduler,
        |_state| {},
        Some(Box::new(move || observed.set(observed.get() + 1))),
    );

    assert_eq!(calls.get(), 1);
    assert!(scheduler.is_idle());
    assert_eq!(component.render_count(), 1);
}

/// 有效的状态更新: 作废 instance, 入队, flush 后重建且 completion 执行一次
#[test]
fn test_state_update_schedules_rebuild() {
    let mut component = Composite::new(Counter, Properties::new());
    let mut scheduler = Scheduler::new();
    component.instance();

    let calls = Rc::new(Cell::new(0u32));
    let observed = calls.clone();
    component.update_state(
        &mut scheduler,
        |state| state.count += 1,
        Some(Box::new(move || observed.set(observed.get() + 1))),
    );

    // 变更同步提交, 重建推迟到 flush
    assert_eq!(component.state(), &CounterState { count: 1 });
    assert_eq!(calls.get(), 0);
    assert_eq!(scheduler.pending_count(), 1);

    let handled = scheduler.flush(&mut component);
    assert_eq!(handled, 1);
    assert_eq!(calls.get(), 1);
    assert_eq!(component.render_count(), 2);
    assert_eq!(counter_text(&mut component), "1");
}

/// 连续两次更新, completion 各执行一次
#[test]
fn test_multiple_updates_each_complete_once() {
    let mut component = Composite::new(Counter, Properties::new());
    let mut scheduler = Scheduler::new();
    component.instance();

    let calls = Rc::new(Cell::new(0u32));
    for _ in 0..2 {
        let observed = calls.clone();
        component.update_state(
            &mut scheduler,
            |state| state.count += 1,
            Some(Box::new(move || observed.set(observed.get() + 1))),
        );
    }

    scheduler.flush(&mut component);
    assert_eq!(calls.get(), 2);
    assert_eq!(component.state(), &CounterState { count: 2 });
}

/// 属性替换走同样的门控
#[test]
fn test_update_properties_gates_on_should_update() {
    let mut component = Composite::new(Counter, Properties::new());
    let mut scheduler = Scheduler::new();
    component.instance();

    // 相同属性: 不入队
    component.update_properties(&mut scheduler, Properties::new());
    assert!(scheduler.is_idle());

    // 不同属性: 入队
    component.update_properties(
        &mut scheduler,
        Properties::new().with("width", PropertyValue::Number(1.0)),
    );
    assert_eq!(scheduler.pending_count(), 1);
}

/// 场景: render 未实现, 首次访问 instance 终止
#[test]
#[should_panic(expected = "render() 必须由组件实现")]
fn test_missing_render_is_fatal() {
    let mut component = Composite::new(Hollow, Properties::new());
    component.instance();
}

/// 已卸载组件的 completion 照常执行
#[test]
fn test_orphaned_completion_still_runs() {
    let mut component = Composite::new(Counter, Properties::new());
    let mut scheduler = Scheduler::new();
    component.instance();

    let calls = Rc::new(Cell::new(0u32));
    let observed = calls.clone();
    scheduler.schedule(
        crate::ComponentId(u64::MAX),
        Some(Box::new(move || observed.set(observed.get() + 1))),
    );

    let handled = scheduler.flush(&mut component);
    assert_eq!(handled, 1);
    assert_eq!(calls.get(), 1);
}

/// create 记录宿主组件与传入的子节点
#[test]
fn test_create_records_owner_and_children() {
    let host = ComponentId::next();
    let slot = Node::View(ViewNode::new("text", Properties::new(), Some(host)));
    let component = Composite::create(Counter, Properties::new(), vec![slot], Some(host), None);

    assert_eq!(component.owner(), Some(host));
    assert_eq!(component.children().len(), 1);
}

/// 按 id 在组件树下查找组件
#[test]
fn test_find_component_by_id() {
    let mut component = Composite::new(Counter, Properties::new());
    let id = component.id();
    component.instance();

    assert!(component.contains_component(id));
    assert!(component.find_component_mut(id).is_some());
    assert!(component.find_component_mut(crate::ComponentId(u64::MAX)).is_none());
}
