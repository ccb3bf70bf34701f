//! 样式系统: 值类型、样式表、级联引擎

mod cascade;
mod sheet;
mod value;

pub use cascade::selector_matches;
pub use sheet::{Selector, StyleRule, StyleSheet};
pub use value::{rpx_to_px, LengthUnit, PropertyValue};
