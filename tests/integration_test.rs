use std::time::Duration;

use chrono::Local;
use court_permit_booker::browser::headless::{remove_profile_dir, session_profile_dir};
use court_permit_booker::config::Config;
use court_permit_booker::models::Account;
use court_permit_booker::services::{check_network, GmailMailbox, LoginService, Mailbox};
use court_permit_booker::utils::logging;
use court_permit_booker::{launch_session_browser, PageDriver};

#[tokio::test]
#[ignore] // 默认忽略，需要手动运行：cargo test -- --ignored
async fn test_browser_launch_and_close() {
    // 初始化日志
    let _ = logging::init_console(true);

    let mut config = Config::from_env();
    config.headless = true;

    let (session, page) = launch_session_browser(&config, 90).await.expect("启动浏览器失败");
    let driver = PageDriver::new(page, config.element_timeout);
    driver.goto("about:blank").await.expect("打开空白页失败");
    assert_eq!(driver.current_url().await.as_deref(), Some("about:blank"));

    let profile = session.profile_dir().to_path_buf();
    assert!(profile.exists(), "会话应有自己的用户数据目录");

    session.close().await.expect("关闭浏览器失败");
    assert!(!profile.exists(), "关闭后应删除用户数据目录");
}

#[tokio::test]
async fn test_remove_profile_dir() {
    let dir = session_profile_dir(4242);
    assert_ne!(dir, session_profile_dir(4243));

    tokio::fs::create_dir_all(dir.join("Default")).await.unwrap();
    tokio::fs::write(dir.join("Default").join("Preferences"), "{}").await.unwrap();

    remove_profile_dir(&dir).await;
    assert!(!dir.exists());

    // 已经不存在时什么也不做
    remove_profile_dir(&dir).await;
}

#[tokio::test]
#[ignore]
async fn test_preflight_reaches_login_page() {
    let _ = logging::init_console(true);
    let config = Config::from_env();

    let result = check_network(&config.preflight_url, Duration::from_secs(10)).await;
    assert!(result.is_ok(), "应该能访问预约网站: {:?}", result.err());
}

#[tokio::test]
#[ignore]
async fn test_login_with_env_account() {
    let _ = logging::init_console(true);

    // 需要设置 TEST_ACCOUNT_EMAIL / TEST_ACCOUNT_PASSWORD
    let account = Account {
        email: std::env::var("TEST_ACCOUNT_EMAIL").expect("缺少 TEST_ACCOUNT_EMAIL"),
        password: std::env::var("TEST_ACCOUNT_PASSWORD").expect("缺少 TEST_ACCOUNT_PASSWORD"),
        priorities: Vec::new(),
    };

    let config = Config::from_env();
    let (session, page) = launch_session_browser(&config, 91).await.expect("启动浏览器失败");
    let driver = PageDriver::new(page, config.element_timeout);

    let result = LoginService::new(config.login_url.clone())
        .login(&driver, &account)
        .await;
    session.close().await.expect("关闭浏览器失败");

    assert!(result.is_ok(), "登录应该成功: {:?}", result.err());
}

#[tokio::test]
#[ignore]
async fn test_gmail_fetch_today() {
    let _ = logging::init_console(true);

    // 需要设置 GMAIL_ACCESS_TOKEN
    let config = Config::from_env();
    let mailbox = GmailMailbox::from_config(&config).expect("缺少 GMAIL_ACCESS_TOKEN");

    let decisions = mailbox
        .fetch_decisions(Local::now().date_naive())
        .await
        .expect("读取 Gmail 失败");
    for decision in &decisions {
        assert!(!decision.alias.is_empty());
    }
}
