//! Mini Template Engine - 声明式 UI 内核
//! 元素树描述、组件状态驱动重渲染、CSS 式样式级联

mod color;
pub use color::Color;

// 元素树
pub mod element;
pub use element::{ElementData, ElementId, ElementKind, ElementTree};

// 活动节点
pub mod node;
pub use node::{registry, ComponentKind, Node, NodeError, ViewFactory, ViewNode};

// 属性包
pub mod properties;
pub use properties::{Identifier, Properties};

// 组件系统
pub mod component;
pub use component::{AnyComponent, ComponentId, Composite, InstanceSlot, Render, RenderScope};

// 模板
pub mod template;
pub use template::{Context, Template, TemplateRegistry};

// 样式系统
pub mod style;
pub use style::{rpx_to_px, LengthUnit, PropertyValue, Selector, StyleRule, StyleSheet};

// 标记/样式表解析器
pub mod parser;
pub use parser::{MarkupNode, MarkupNodeType, MarkupParser, ParseError, StyleSheetParser};

// 更新调度
pub mod scheduler;
pub use scheduler::{Completion, Scheduler};

// 单元测试
#[cfg(test)]
mod tests;
