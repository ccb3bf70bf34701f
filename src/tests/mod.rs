//! 单元测试模块
//! 覆盖元素树、样式级联、组件状态、模板绑定等功能

pub mod component_tests;
pub mod element_tests;
