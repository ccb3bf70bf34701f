//! 样式值类型

use crate::Color;
use serde_json::Value as JsonValue;

/// 样式值
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    Length(f32, LengthUnit),
    Color(Color),
    String(String),
    Number(f32),
    Bool(bool),
    Auto,
    None,
}

/// 长度单位
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LengthUnit {
    Px,
    Rpx, // 响应式像素
    Percent,
    Em,
    Rem,
}

impl PropertyValue {
    /// 转成模板绑定数据用的 JSON 值
    pub fn to_json(&self) -> JsonValue {
        match self {
            PropertyValue::Length(num, unit) => JsonValue::String(format!(
                "{}{}",
                num,
                match unit {
                    LengthUnit::Px => "px",
                    LengthUnit::Rpx => "rpx",
                    LengthUnit::Percent => "%",
                    LengthUnit::Em => "em",
                    LengthUnit::Rem => "rem",
                }
            )),
            PropertyValue::Color(c) => {
                if c.a == 255 {
                    JsonValue::String(format!("#{:02X}{:02X}{:02X}", c.r, c.g, c.b))
                } else {
                    JsonValue::String(format!("#{:02X}{:02X}{:02X}{:02X}", c.r, c.g, c.b, c.a))
                }
            }
            PropertyValue::String(s) => JsonValue::String(s.clone()),
            PropertyValue::Number(n) => serde_json::Number::from_f64(*n as f64)
                .map(JsonValue::Number)
                .unwrap_or(JsonValue::Null),
            PropertyValue::Bool(b) => JsonValue::Bool(*b),
            PropertyValue::Auto => JsonValue::String("auto".to_string()),
            PropertyValue::None => JsonValue::String("none".to_string()),
        }
    }

    /// 属性选择器用的字符串比较
    pub fn matches_text(&self, text: &str) -> bool {
        match self {
            PropertyValue::String(s) => s == text,
            PropertyValue::Bool(b) => b.to_string() == text,
            PropertyValue::Number(n) => n.to_string() == text,
            PropertyValue::Auto => text == "auto",
            PropertyValue::None => text == "none",
            _ => self.to_json().as_str().map(|s| s == text).unwrap_or(false),
        }
    }
}

/// rpx 转 px (基于 750 设计稿)
pub fn rpx_to_px(rpx: f32, screen_width: f32) -> f32 {
    rpx * screen_width / 750.0
}
