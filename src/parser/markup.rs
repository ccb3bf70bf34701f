//! 模板标记解析器

use super::ParseError;
use std::collections::HashMap;

/// 标记节点类型
#[derive(Debug, Clone, PartialEq)]
pub enum MarkupNodeType {
    Element,
    Text,
    Comment,
}

/// 标记节点
#[derive(Debug, Clone)]
pub struct MarkupNode {
    pub node_type: MarkupNodeType,
    pub tag_name: String,
    pub attributes: HashMap<String, String>,
    pub children: Vec<MarkupNode>,
    pub text_content: String,
}

impl MarkupNode {
    pub fn new_element(tag_name: &str) -> Self {
        Self {
            node_type: MarkupNodeType::Element,
            tag_name: tag_name.to_string(),
            attributes: HashMap::new(),
            children: Vec::new(),
            text_content: String::new(),
        }
    }

    pub fn new_text(content: &str) -> Self {
        Self {
            node_type: MarkupNodeType::Text,
            tag_name: String::new(),
            attributes: HashMap::new(),
            children: Vec::new(),
            text_content: content.to_string(),
        }
    }

    pub fn get_attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(|s| s.as_str())
    }
}

/// 标记解析器
pub struct MarkupParser {
    input: Vec<char>,
    pos: usize,
}

impl MarkupParser {
    pub fn new(input: &str) -> Self {
        Self {
            input: input.chars().collect(),
            pos: 0,
        }
    }

    pub fn parse(&mut self) -> Result<Vec<MarkupNode>, ParseError> {
        let mut nodes = Vec::new();

        while self.pos < self.input.len() {
            self.skip_whitespace();
            if self.pos >= self.input.len() {
                break;
            }

            if self.starts_with("<!--") {
                self.parse_comment();
            } else if self.current_char() == '<' {
                if self.starts_with("</") {
                    break; // 结束标签，返回上层
                }
                if let Some(node) = self.parse_element()? {
                    nodes.push(node);
                }
            } else if let Some(text) = self.parse_text() {
                if !text.text_content.trim().is_empty() {
                    nodes.push(text);
                }
            }
        }

        Ok(nodes)
    }

    fn parse_element(&mut self) -> Result<Option<MarkupNode>, ParseError> {
        self.expect('<')?;

        let tag_name = self.parse_tag_name();
        if tag_name.is_empty() {
            return Err(ParseError::EmptyTagName);
        }

        let mut node = MarkupNode::new_element(&tag_name);

        // 解析属性; 标签内遇到输入末尾是结构错误
        loop {
            self.skip_whitespace();
            if self.pos >= self.input.len() {
                return Err(ParseError::UnexpectedEof);
            }
            if self.current_char() == '>' || self.starts_with("/>") {
                break;
            }

            let (name, value) = self.parse_attribute()?;
            node.attributes.insert(name, value);
        }

        // 自闭合标签
        if self.starts_with("/>") {
            self.advance();
            self.advance();
            return Ok(Some(node));
        }

        self.expect('>')?;

        // 解析子节点
        node.children = self.parse()?;

        // 解析结束标签
        self.skip_whitespace();
        if self.starts_with("</") {
            self.advance();
            self.advance();
            let end_tag = self.parse_tag_name();
            if end_tag != tag_name {
                return Err(ParseError::MismatchedTag {
                    open: tag_name,
                    close: end_tag,
                });
            }
            self.skip_whitespace();
            self.expect('>')?;
        }

        Ok(Some(node))
    }

    fn parse_tag_name(&mut self) -> String {
        let mut name = String::new();
        while self.pos < self.input.len() {
            let c = self.current_char();
            if c.is_alphanumeric() || c == '-' || c == '_' || c == ':' {
                name.push(c);
                self.advance();
            } else {
                break;
            }
        }
        name
    }

    fn parse_attribute(&mut self) -> Result<(String, String), ParseError> {
        let name = self.parse_attribute_name();
        // 名字为空说明当前字符不属于任何属性, 不消费它会原地打转
        if name.is_empty() {
            return Err(ParseError::Unexpected {
                expected: '>',
                found: self.current_char(),
            });
        }

        self.skip_whitespace();

        if self.current_char() != '=' {
            return Ok((name, String::new()));
        }

        self.advance(); // skip '='
        self.skip_whitespace();

        let value = self.parse_attribute_value();

        Ok((name, value))
    }

    fn parse_attribute_name(&mut self) -> String {
        let mut name = String::new();
        while self.pos < self.input.len() {
            let c = self.current_char();
            if c.is_alphanumeric() || c == '-' || c == '_' || c == ':' || c == '.' {
                name.push(c);
                self.advance();
            } else {
                break;
            }
        }
        name
    }

    fn parse_attribute_value(&mut self) -> String {
        let quote = self.current_char();
        if quote != '"' && quote != '\'' {
            // 无引号值
            let mut value = String::new();
            while self.pos < self.input.len() {
                let c = self.current_char();
                if c.is_whitespace() || c == '>' || c == '/' {
                    break;
                }
                value.push(c);
                self.advance();
            }
            return value;
        }

        self.advance(); // skip opening quote

        let mut value = String::new();
        while self.pos < self.input.len() && self.current_char() != quote {
            value.push(self.current_char());
            self.advance();
        }

        if self.pos < self.input.len() {
            self.advance(); // skip closing quote
        }

        value
    }

    fn parse_text(&mut self) -> Option<MarkupNode> {
        let mut text = String::new();
        while self.pos < self.input.len() && self.current_char() != '<' {
            text.push(self.current_char());
            self.advance();
        }

        if text.is_empty() {
            None
        } else {
            Some(MarkupNode::new_text(&text))
        }
    }

    fn parse_comment(&mut self) {
        // Skip <!--
        for _ in 0..4 {
            self.advance();
        }

        while self.pos < self.input.len() && !self.starts_with("-->") {
            self.advance();
        }

        // Skip -->
        for _ in 0..3 {
            if self.pos < self.input.len() {
                self.advance();
            }
        }
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

    fn starts_with(&self, s: &str) -> bool {
        for (i, c) in s.chars().enumerate() {
            if self.pos + i >= self.input.len() || self.input[self.pos + i] != c {
                return false;
            }
        }
        true
    }

    fn expect(&mut self, c: char) -> Result<(), ParseError> {
        if self.current_char() == c {
            self.advance();
            Ok(())
        } else {
            Err(ParseError::Unexpected {
                expected: c,
                found: self.current_char(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple() {
        let markup = r#"<view class="container"><text>Hello</text></view>"#;
        let mut parser = MarkupParser::new(markup);
        let nodes = parser.parse().unwrap();

        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].tag_name, "view");
        assert_eq!(nodes[0].get_attr("class"), Some("container"));
    }

    #[test]
    fn test_parse_self_closing_and_template_attrs() {
        let markup = r#"<view t:if="{{visible}}"><image src="a.png" /></view>"#;
        let nodes = MarkupParser::new(markup).parse().unwrap();

        assert_eq!(nodes[0].get_attr("t:if"), Some("{{visible}}"));
        assert_eq!(nodes[0].children[0].tag_name, "image");
    }

    #[test]
    fn test_mismatched_tag_is_error() {
        let markup = "<view><text>abc</view></text>";
        assert!(MarkupParser::new(markup).parse().is_err());
    }

    /// 标签内截断的输入必须返回错误而不是原地循环
    #[test]
    fn test_truncated_tag_is_error() {
        assert!(MarkupParser::new("<view").parse().is_err());
        assert!(MarkupParser::new("<view foo").parse().is_err());
        assert!(MarkupParser::new(r#"<view foo="a"#).parse().is_err());
    }

    #[test]
    fn test_stray_char_in_tag_is_error() {
        assert!(MarkupParser::new("<view !></view>").parse().is_err());
    }
}
