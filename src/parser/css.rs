//! 样式表解析器

use super::ParseError;
use crate::style::{LengthUnit, PropertyValue, Selector, StyleRule, StyleSheet};
use crate::Color;

/// 样式表解析器
pub struct StyleSheetParser {
    input: Vec<char>,
    pos: usize,
}

impl StyleSheetParser {
    pub fn new(input: &str) -> Self {
        Self {
            input: input.chars().collect(),
            pos: 0,
        }
    }

    pub fn parse(&mut self) -> Result<StyleSheet, ParseError> {
        let mut stylesheet = StyleSheet::new();

        while self.pos < self.input.len() {
            self.skip_whitespace_and_comments();

            if self.pos >= self.input.len() {
                break;
            }

            self.parse_rule(&mut stylesheet)?;
        }

        Ok(stylesheet)
    }

    // 一段规则块; 逗号分组的选择器按出现顺序展开成多条规则
    fn parse_rule(&mut self, stylesheet: &mut StyleSheet) -> Result<(), ParseError> {
        self.skip_whitespace_and_comments();

        let selector_text = self.parse_selector_text();
        if selector_text.is_empty() {
            return Ok(());
        }

        self.skip_whitespace_and_comments();

        if self.current_char() != '{' {
            return Err(ParseError::Unexpected {
                expected: '{',
                found: self.current_char(),
            });
        }
        self.advance();

        let declarations = self.parse_declarations();

        self.skip_whitespace_and_comments();
        if self.current_char() == '}' {
            self.advance();
        }

        for group in selector_text.split(',') {
            let selector = parse_selector(group)?;
            stylesheet.rules.push(StyleRule {
                selector,
                declarations: declarations.clone(),
            });
        }

        Ok(())
    }

    fn parse_selector_text(&mut self) -> String {
        let mut selector = String::new();

        while self.pos < self.input.len() {
            let c = self.current_char();
            if c == '{' || c == '}' {
                break;
            }
            selector.push(c);
            self.advance();
        }

        selector.trim().to_string()
    }

    // 声明保持书写顺序
    fn parse_declarations(&mut self) -> Vec<(String, PropertyValue)> {
        let mut declarations = Vec::new();

        loop {
            self.skip_whitespace_and_comments();

            if self.pos >= self.input.len() || self.current_char() == '}' {
                break;
            }

            let name = self.parse_property_name();
            if name.is_empty() {
                break;
            }

            self.skip_whitespace();

            if self.current_char() != ':' {
                continue;
            }
            self.advance();

            self.skip_whitespace();

            let value = self.parse_property_value();

            if self.current_char() == ';' {
                self.advance();
            }

            let parsed = parse_declaration_value(&name, &value);
            declarations.push((name, parsed));
        }

        declarations
    }

    fn parse_property_name(&mut self) -> String {
        let mut name = String::new();

        while self.pos < self.input.len() {
            let c = self.current_char();
            if c.is_alphanumeric() || c == '-' || c == '_' {
                name.push(c);
                self.advance();
            } else {
                break;
            }
        }

        name
    }

    fn parse_property_value(&mut self) -> String {
        let mut value = String::new();
        let mut paren_depth = 0;

        while self.pos < self.input.len() {
            let c = self.current_char();

            if c == '(' {
                paren_depth += 1;
            } else if c == ')' {
                paren_depth -= 1;
            }

            if paren_depth == 0 && (c == ';' || c == '}') {
                break;
            }

            value.push(c);
            self.advance();
        }

        value.trim().to_string()
    }

    fn current_char(&self) -> char {
        if self.pos < self.input.len() {
            self.input[self.pos]
        } else {
            '\0'
        }
    }

    fn advance(&mut self) {
        self.pos += 1;
    }

    fn skip_whitespace(&mut self) {
        while self.pos < self.input.len() && self.current_char().is_whitespace() {
            self.advance();
        }
    }

    fn skip_whitespace_and_comments(&mut self) {
        loop {
            self.skip_whitespace();

            if self.starts_with("/*") {
                self.skip_comment();
            } else {
                break;
            }
        }
    }

    fn skip_comment(&mut self) {
        self.advance();
        self.advance();

        while self.pos < self.input.len() && !self.starts_with("*/") {
            self.advance();
        }

        if self.pos < self.input.len() {
            self.advance();
            self.advance();
        }
    }

    fn starts_with(&self, s: &str) -> bool {
        for (i, c) in s.chars().enumerate() {
            if self.pos + i >= self.input.len() || self.input[self.pos + i] != c {
                return false;
            }
        }
        true
    }
}

// ---------- 选择器 ----------

enum SelectorToken {
    Compound(String),
    Child,    // >
    Adjacent, // +
    Sibling,  // ~
}

/// 解析单个选择器 (不含逗号分组)
pub fn parse_selector(input: &str) -> Result<Selector, ParseError> {
    let tokens = tokenize_selector(input);
    if tokens.is_empty() {
        return Err(ParseError::BadSelector(input.to_string()));
    }

    let mut iter = tokens.into_iter();
    let mut selector = match iter.next() {
        Some(SelectorToken::Compound(text)) => parse_compound(&text)?,
        _ => return Err(ParseError::BadSelector(input.to_string())),
    };

    // 左结合: a b > c 解析为 Child(Descendant(a, b), c)
    while let Some(token) = iter.next() {
        match token {
            SelectorToken::Compound(text) => {
                let right = parse_compound(&text)?;
                selector = Selector::Descendant(Box::new(selector), Box::new(right));
            }
            combinator => {
                let right = match iter.next() {
                    Some(SelectorToken::Compound(text)) => parse_compound(&text)?,
                    _ => return Err(ParseError::BadSelector(input.to_string())),
                };
                selector = match combinator {
                    SelectorToken::Child => {
                        Selector::Child(Box::new(selector), Box::new(right))
                    }
                    SelectorToken::Adjacent => {
                        Selector::Adjacent(Box::new(selector), Box::new(right))
                    }
                    SelectorToken::Sibling => {
                        Selector::Sibling(Box::new(selector), Box::new(right))
                    }
                    SelectorToken::Compound(_) => unreachable!(),
                };
            }
        }
    }

    Ok(selector)
}

fn tokenize_selector(input: &str) -> Vec<SelectorToken> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_brackets = false;

    for c in input.trim().chars() {
        match c {
            '[' => {
                in_brackets = true;
                current.push(c);
            }
            ']' => {
                in_brackets = false;
                current.push(c);
            }
            '>' | '+' | '~' if !in_brackets => {
                if !current.is_empty() {
                    tokens.push(SelectorToken::Compound(std::mem::take(&mut current)));
                }
                tokens.push(match c {
                    '>' => SelectorToken::Child,
                    '+' => SelectorToken::Adjacent,
                    _ => SelectorToken::Sibling,
                });
            }
            c if c.is_whitespace() && !in_brackets => {
                if !current.is_empty() {
                    tokens.push(SelectorToken::Compound(std::mem::take(&mut current)));
                }
            }
            _ => current.push(c),
        }
    }

    if !current.is_empty() {
        tokens.push(SelectorToken::Compound(current));
    }

    tokens
}

// 复合选择器: 可选标签名后跟 #id / .class / [attr=value]
fn parse_compound(input: &str) -> Result<Selector, ParseError> {
    if input == "*" {
        return Ok(Selector::Universal);
    }

    let chars: Vec<char> = input.chars().collect();
    let mut pos = 0;
    let mut parts = Vec::new();

    let mut tag = String::new();
    while pos < chars.len() && (chars[pos].is_alphanumeric() || chars[pos] == '-' || chars[pos] == '_') {
        tag.push(chars[pos]);
        pos += 1;
    }
    if !tag.is_empty() {
        parts.push(Selector::Tag(tag));
    }

    while pos < chars.len() {
        match chars[pos] {
            '#' | '.' => {
                let marker = chars[pos];
                pos += 1;
                let mut name = String::new();
                while pos < chars.len()
                    && (chars[pos].is_alphanumeric() || chars[pos] == '-' || chars[pos] == '_')
                {
                    name.push(chars[pos]);
                    pos += 1;
                }
                if name.is_empty() {
                    return Err(ParseError::BadSelector(input.to_string()));
                }
                parts.push(if marker == '#' {
                    Selector::Id(name)
                } else {
                    Selector::Class(name)
                });
            }
            '[' => {
                pos += 1;
                let mut body = String::new();
                while pos < chars.len() && chars[pos] != ']' {
                    body.push(chars[pos]);
                    pos += 1;
                }
                if pos >= chars.len() {
                    return Err(ParseError::BadSelector(input.to_string()));
                }
                pos += 1; // skip ']'

                let (name, value) = match body.find('=') {
                    Some(eq) => (
                        body[..eq].trim().to_string(),
                        body[eq + 1..]
                            .trim()
                            .trim_matches(|c| c == '"' || c == '\'')
                            .to_string(),
                    ),
                    None => return Err(ParseError::BadSelector(input.to_string())),
                };
                parts.push(Selector::Attribute(name, value));
            }
            _ => return Err(ParseError::BadSelector(input.to_string())),
        }
    }

    match parts.len() {
        0 => Err(ParseError::BadSelector(input.to_string())),
        1 => Ok(parts.pop().unwrap()),
        _ => Ok(Selector::Compound(parts)),
    }
}

// ---------- 样式值 ----------

/// 解析单个声明值
pub fn parse_declaration_value(_name: &str, value: &str) -> PropertyValue {
    let value = value.trim();

    // 颜色值
    if value.starts_with('#') {
        if let Some(color) = Color::parse_hex(value) {
            return PropertyValue::Color(color);
        }
    }

    if value.starts_with("rgb") {
        if let Some(color) = Color::parse_rgb(value) {
            return PropertyValue::Color(color);
        }
    }

    // 长度值
    if let Some((num, unit)) = parse_length(value) {
        return PropertyValue::Length(num, unit);
    }

    // 特殊值
    match value {
        "auto" => return PropertyValue::Auto,
        "none" => return PropertyValue::None,
        "true" => return PropertyValue::Bool(true),
        "false" => return PropertyValue::Bool(false),
        _ => {}
    }

    // 数字
    if let Ok(num) = value.parse::<f32>() {
        return PropertyValue::Number(num);
    }

    PropertyValue::String(value.to_string())
}

/// 解析内联样式串 `a: b; c: d`
pub fn parse_inline_style(style_str: &str) -> Vec<(String, PropertyValue)> {
    let mut styles = Vec::new();

    for part in style_str.split(';') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }

        if let Some(colon_pos) = part.find(':') {
            let name = part[..colon_pos].trim().to_string();
            let value_str = part[colon_pos + 1..].trim();

            let value = parse_declaration_value(&name, value_str);
            styles.push((name, value));
        }
    }

    styles
}

fn parse_length(value: &str) -> Option<(f32, LengthUnit)> {
    let value = value.trim();

    if value.ends_with("rpx") {
        let num = value.trim_end_matches("rpx").parse().ok()?;
        return Some((num, LengthUnit::Rpx));
    }

    if value.ends_with("px") {
        let num = value.trim_end_matches("px").parse().ok()?;
        return Some((num, LengthUnit::Px));
    }

    if value.ends_with('%') {
        let num = value.trim_end_matches('%').parse().ok()?;
        return Some((num, LengthUnit::Percent));
    }

    if value.ends_with("rem") {
        let num = value.trim_end_matches("rem").parse().ok()?;
        return Some((num, LengthUnit::Rem));
    }

    if value.ends_with("em") {
        let num = value.trim_end_matches("em").parse().ok()?;
        return Some((num, LengthUnit::Em));
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_combinator_selector() {
        let selector = parse_selector("view .a + .b").unwrap();
        match selector {
            Selector::Adjacent(left, right) => {
                assert_eq!(
                    *left,
                    Selector::Descendant(
                        Box::new(Selector::Tag("view".to_string())),
                        Box::new(Selector::Class("a".to_string()))
                    )
                );
                assert_eq!(*right, Selector::Class("b".to_string()));
            }
            other => panic!("意外的选择器: {:?}", other),
        }
    }

    #[test]
    fn test_parse_compound_selector() {
        let selector = parse_selector("text.title#main").unwrap();
        assert_eq!(
            selector,
            Selector::Compound(vec![
                Selector::Tag("text".to_string()),
                Selector::Class("title".to_string()),
                Selector::Id("main".to_string()),
            ])
        );
    }

    #[test]
    fn test_parse_attribute_selector() {
        let selector = parse_selector("input[disabled=true]").unwrap();
        assert_eq!(
            selector,
            Selector::Compound(vec![
                Selector::Tag("input".to_string()),
                Selector::Attribute("disabled".to_string(), "true".to_string()),
            ])
        );
    }
}
