//! 元素定位方式
//!
//! 供应商页面上有以数字开头的 ID（不是合法的 CSS `#id`），
//! 也有只能用 XPath 表达的按钮，所以统一转成 JS 表达式来查找。

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Locator {
    Id(String),
    Name(String),
    Css(String),
    XPath(String),
}

impl Locator {
    pub fn id(id: impl Into<String>) -> Self {
        Locator::Id(id.into())
    }

    pub fn name(name: impl Into<String>) -> Self {
        Locator::Name(name.into())
    }

    pub fn css(selector: impl Into<String>) -> Self {
        Locator::Css(selector.into())
    }

    pub fn xpath(expr: impl Into<String>) -> Self {
        Locator::XPath(expr.into())
    }

    /// 求值结果为元素或 `null` 的 JS 表达式
    pub fn js_expr(&self) -> String {
        match self {
            Locator::Id(id) => format!("document.getElementById({})", js_string(id)),
            Locator::Name(name) => {
                format!("(document.getElementsByName({})[0] || null)", js_string(name))
            }
            Locator::Css(selector) => format!("document.querySelector({})", js_string(selector)),
            Locator::XPath(expr) => format!(
                "document.evaluate({}, document, null, XPathResult.FIRST_ORDERED_NODE_TYPE, null).singleNodeValue",
                js_string(expr)
            ),
        }
    }

    /// 等价的 CSS 选择器（XPath 没有）
    pub fn as_css(&self) -> Option<String> {
        match self {
            Locator::Id(id) => Some(format!("[id={}]", js_string(id))),
            Locator::Name(name) => Some(format!("[name={}]", js_string(name))),
            Locator::Css(selector) => Some(selector.clone()),
            Locator::XPath(_) => None,
        }
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Locator::Id(id) => write!(f, "id={}", id),
            Locator::Name(name) => write!(f, "name={}", name),
            Locator::Css(selector) => write!(f, "css={}", selector),
            Locator::XPath(expr) => write!(f, "xpath={}", expr),
        }
    }
}

/// 转成带引号、已转义的 JS 字符串字面量
pub fn js_string(s: &str) -> String {
    serde_json::Value::from(s).to_string()
}
