//! 页面驱动 - 基础设施层
//!
//! 持有一个会话的 Page，只暴露"等元素、点、填、选、读"这些能力

use std::time::Duration;

use chromiumoxide::Page;
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;
use tokio::time::{sleep, Instant};
use tracing::debug;

use crate::error::{AppError, AppResult};
use crate::infrastructure::locator::{js_string, Locator};

/// 轮询间隔
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// 页面驱动
///
/// 职责：
/// - 持有唯一的 Page 资源
/// - 所有元素操作都带超时等待
/// - 不认识账号 / 场地 / 表单
#[derive(Clone)]
pub struct PageDriver {
    page: Page,
    timeout: Duration,
}

impl PageDriver {
    /// 创建新的页面驱动
    pub fn new(page: Page, timeout: Duration) -> Self {
        Self { page, timeout }
    }

    /// 获取 page 的引用
    pub fn page(&self) -> &Page {
        &self.page
    }

    /// 执行 JS 代码并返回 JSON 结果
    pub async fn eval(&self, js_code: impl Into<String>) -> AppResult<JsonValue> {
        let result = self.page.evaluate(js_code.into()).await?;
        let json_value = result.into_value()?;
        Ok(json_value)
    }

    /// 执行 JS 代码并反序列化为指定类型
    pub async fn eval_as<T: DeserializeOwned>(&self, js_code: impl Into<String>) -> AppResult<T> {
        let json_value = self.eval(js_code).await?;
        let typed_value = serde_json::from_value(json_value)?;
        Ok(typed_value)
    }

    /// 导航到指定 URL
    pub async fn goto(&self, url: &str) -> AppResult<()> {
        debug!("导航到: {}", url);
        self.page.goto(url).await?;
        Ok(())
    }

    /// 当前 URL（读不到时返回 None）
    pub async fn current_url(&self) -> Option<String> {
        self.page.url().await.ok().flatten()
    }

    /// 读取页面标题（心跳用）
    pub async fn title(&self) -> AppResult<Option<String>> {
        Ok(self.page.get_title().await?)
    }

    /// 等待元素出现且可点击（可见、未禁用）
    pub async fn wait_clickable(&self, locator: &Locator) -> AppResult<()> {
        self.wait_clickable_for(locator, self.timeout).await
    }

    /// 同上，自定义超时
    pub async fn wait_clickable_for(&self, locator: &Locator, timeout: Duration) -> AppResult<()> {
        let script = format!(
            r#"(() => {{
                const el = {};
                if (!el || el.disabled) return false;
                const r = el.getBoundingClientRect();
                return r.width > 0 || r.height > 0 || el.type === 'checkbox';
            }})()"#,
            locator.js_expr()
        );
        self.poll_until(&script, timeout)
            .await?
            .then_some(())
            .ok_or_else(|| AppError::element_timeout(locator, timeout.as_millis() as u64))
    }

    /// 等待元素出现在 DOM 中（不要求可见）
    pub async fn wait_present(&self, locator: &Locator, timeout: Duration) -> AppResult<()> {
        let script = format!("({}) !== null", locator.js_expr());
        self.poll_until(&script, timeout)
            .await?
            .then_some(())
            .ok_or_else(|| AppError::element_timeout(locator, timeout.as_millis() as u64))
    }

    /// 等待元素消失或不可见，超时返回 false
    pub async fn wait_gone(&self, locator: &Locator, timeout: Duration) -> AppResult<bool> {
        let script = format!(
            r#"(() => {{
                const el = {};
                if (!el) return true;
                const r = el.getBoundingClientRect();
                return r.width === 0 && r.height === 0;
            }})()"#,
            locator.js_expr()
        );
        self.poll_until(&script, timeout).await
    }

    /// 等待后用 JS 点击（绕过遮罩层）
    pub async fn click(&self, locator: &Locator) -> AppResult<()> {
        self.wait_clickable(locator).await?;
        self.js_click(locator).await
    }

    /// 不等待，直接用 JS 点击
    pub async fn js_click(&self, locator: &Locator) -> AppResult<()> {
        let script = format!(
            "(() => {{ const el = {}; if (!el) return false; el.click(); return true; }})()",
            locator.js_expr()
        );
        if self.eval_as::<bool>(script).await? {
            Ok(())
        } else {
            Err(AppError::UnexpectedPage(format!("点击时元素不存在: {}", locator)))
        }
    }

    /// 输入文本（真实键盘事件；XPath 定位时退回到直接赋值）
    pub async fn type_text(&self, locator: &Locator, text: &str) -> AppResult<()> {
        self.wait_clickable(locator).await?;
        match locator.as_css() {
            Some(selector) => {
                let element = self.page.find_element(selector).await?;
                element.click().await?;
                element.type_str(text).await?;
            }
            None => {
                let script = format!(
                    r#"(() => {{
                        const el = {};
                        el.value = {};
                        el.dispatchEvent(new Event('input', {{ bubbles: true }}));
                        el.dispatchEvent(new Event('change', {{ bubbles: true }}));
                        return true;
                    }})()"#,
                    locator.js_expr(),
                    js_string(text)
                );
                self.eval(script).await?;
            }
        }
        Ok(())
    }

    /// 下拉框按可见文本选择
    pub async fn select_by_text(&self, locator: &Locator, text: &str) -> AppResult<()> {
        self.select_option(locator, "o.text.trim()", text).await
    }

    /// 下拉框按 value 选择
    pub async fn select_by_value(&self, locator: &Locator, value: &str) -> AppResult<()> {
        self.select_option(locator, "o.value", value).await
    }

    async fn select_option(&self, locator: &Locator, key_expr: &str, wanted: &str) -> AppResult<()> {
        self.wait_clickable(locator).await?;
        let script = format!(
            r#"(() => {{
                const sel = {};
                const wanted = {};
                const opt = Array.from(sel.options).find(o => {} === wanted);
                if (!opt) return false;
                sel.value = opt.value;
                sel.dispatchEvent(new Event('change', {{ bubbles: true }}));
                return true;
            }})()"#,
            locator.js_expr(),
            js_string(wanted),
            key_expr
        );
        if self.eval_as::<bool>(script).await? {
            Ok(())
        } else {
            Err(AppError::UnexpectedPage(format!(
                "下拉框 {} 中没有选项 '{}'",
                locator, wanted
            )))
        }
    }

    /// 确保复选框已勾选
    pub async fn ensure_checked(&self, locator: &Locator) -> AppResult<()> {
        self.wait_clickable(locator).await?;
        let script = format!(
            "(() => {{ const el = {}; if (!el.checked) el.click(); return el.checked === true; }})()",
            locator.js_expr()
        );
        if self.eval_as::<bool>(script).await? {
            Ok(())
        } else {
            Err(AppError::UnexpectedPage(format!("复选框未能勾选: {}", locator)))
        }
    }

    /// 点击 body（触发日期校验）
    pub async fn click_body(&self) -> AppResult<()> {
        self.eval("(() => { document.body.click(); return true; })()").await?;
        Ok(())
    }

    /// 滚动到页面底部
    pub async fn scroll_to_bottom(&self) -> AppResult<()> {
        self.eval("(() => { window.scrollTo(0, document.body.scrollHeight); return true; })()")
            .await?;
        Ok(())
    }

    /// 反复执行返回布尔值的脚本，直到为 true 或超时
    async fn poll_until(&self, script: &str, timeout: Duration) -> AppResult<bool> {
        let deadline = Instant::now() + timeout;
        loop {
            if self.eval_as::<bool>(script).await.unwrap_or(false) {
                return Ok(true);
            }
            if Instant::now() >= deadline {
                return Ok(false);
            }
            sleep(POLL_INTERVAL).await;
        }
    }
}
