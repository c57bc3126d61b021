//! 供应商页面上的固定元素标识
//!
//! 页面改版时只需要改这里。

/// 登录页
pub const LOGIN_EMAIL_ID: &str = "loginEmail";
pub const LOGIN_PASSWORD_ID: &str = "loginPassword";
pub const LOGIN_BUTTON_XPATH: &str = "//form[@id=\"login\"]/div/table/tbody/tr/td/button";

/// 控制台上的 "New Permit" 按钮（登录成功的标志）
pub const NEW_PERMIT_XPATH: &str = "//a[@href=\"/Permits/New\" and @class=\"button\"]";

/// 页面加载时的遮罩层
pub const BLOCK_OVERLAY_CSS: &str = "div.blockUI.blockOverlay";

/// 申请表第一页
pub const ACTIVITY_ID: &str = "activity";
pub const ACTIVITY_TEXT: &str = "Tennis Match";
pub const SITE_SELECT_ID: &str = "site";
pub const ADD_FACILITY_ID: &str = "addFacilitySet";
pub const EVENT_DATE_ID: &str = "event0";
pub const START_HOUR_NAME: &str = "startHour";
pub const END_HOUR_NAME: &str = "endHour";
pub const CONTINUE_BUTTON_CSS: &str = ".controlArea button";

/// 申请表问题页：文本框 (元素 ID, 填写内容)
pub const PERMIT_TEXT_ANSWERS: &[(&str, &str)] = &[
    ("11e79e5d3daf4712b9e6418d2691b976", "Playing tennis"),
    ("af8966101be44676b4ee564b052e1e87", "2"),
    ("f28f0dbea8b5438495778b0bb0ddcd93", "No"),
    ("d46cb434558845fb9e0318ab6832e427", "No"),
    ("1221940f5cca4abdb5288cfcbe284820", "None"),
    ("0ce54956c4b14746ae5d364507da1e85", "None"),
    ("6b1dda4172f840c7879662bcab1819db", "None"),
    ("a31f4297075e4dab8c0ef154f2b9b1c1", "None"),
];

/// 申请表问题页：下拉框 (元素 ID, 可见文本)
pub const PERMIT_DROPDOWN_ANSWERS: &[(&str, &str)] = &[
    ("3754dcef7216446b9cc4bf1cd0f12a2e", "No"),
    ("06b3f73192a84fd6b88758e56a64c3ad", "No"),
];

pub const ACCEPT_TERMS_ID: &str = "acceptTerms";

/// 最终提交按钮：取消按钮前面的那个按钮
pub const FINAL_SUBMIT_XPATH: &str =
    "//button[@id='cancelNewPermitRequest']/preceding-sibling::button";
