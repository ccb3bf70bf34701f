//! 调度器 - 单线程协作式重建队列

use crate::component::{AnyComponent, ComponentId};
use std::collections::VecDeque;
use tracing::{debug, warn};

/// 更新完成回调, 恰好执行一次
pub type Completion = Box<dyn FnOnce()>;

/// 一次挂起的组件重建
struct ScheduledUpdate {
    component: ComponentId,
    completion: Option<Completion>,
}

/// 协作式调度器
///
/// 状态变更同步提交, 重建推迟到宿主循环的下一次 `flush`。
/// 没有取消机制: 入队的更新一定会被处理, completion 一定会执行。
#[derive(Default)]
pub struct Scheduler {
    pending: VecDeque<ScheduledUpdate>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// 入队一次重建
    pub fn schedule(&mut self, component: ComponentId, completion: Option<Completion>) {
        self.pending.push_back(ScheduledUpdate {
            component,
            completion,
        });
    }

    pub fn is_idle(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// 处理队列中的全部更新, 返回处理条数
    ///
    /// 组件按 id 在根组件树下定位后重建; 已经卸载的组件跳过重建,
    /// 其 completion 照常执行。
    pub fn flush(&mut self, root: &mut dyn AnyComponent) -> usize {
        let mut handled = 0;

        while let Some(update) = self.pending.pop_front() {
            match root.find_component_mut(update.component) {
                Some(component) => {
                    component.rebuild();
                    debug!(component = update.component.0, "调度重建完成");
                }
                None => {
                    warn!(component = update.component.0, "调度目标已不在树中, 跳过重建");
                }
            }
            if let Some(done) = update.completion {
                done();
            }
            handled += 1;
        }

        handled
    }
}
