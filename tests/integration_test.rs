use sisat_tables::clients::{DownloadOutcome, PortalClient};
use sisat_tables::models::load_credentials;
use sisat_tables::Config;

#[tokio::test]
#[ignore] // 默认忽略，需要手动运行：cargo test -- --ignored
async fn test_login_and_list_tables() {
    // 加载配置
    let config = Config::from_env();

    // 注意：需要在当前目录准备 logins.txt
    let credentials = load_credentials(&config.logins_file)
        .await
        .expect("加载账号文件失败");
    let credential = credentials.first().expect("账号文件为空");

    let client = PortalClient::new(&config).expect("创建客户端失败");
    client.login(credential).await.expect("登录失败");

    let pages = client.list_table_pages().await.expect("获取表格列表失败");
    assert!(!pages.is_empty(), "学校 {} 应该至少有一个表格", credential);
}

#[tokio::test]
#[ignore]
async fn test_download_first_table() {
    let config = Config::from_env();
    let credentials = load_credentials(&config.logins_file)
        .await
        .expect("加载账号文件失败");
    let credential = credentials.first().expect("账号文件为空");

    let client = PortalClient::new(&config).expect("创建客户端失败");
    client.login(credential).await.expect("登录失败");
    let pages = client.list_table_pages().await.expect("获取表格列表失败");
    let page = pages.first().expect("没有表格");

    let dir = tempfile::TempDir::new().unwrap();
    let outcome = client
        .download_table(page, dir.path(), credential.school_id(), 1)
        .await
        .expect("下载失败");

    match outcome {
        DownloadOutcome::Saved { path, .. } => assert!(path.exists()),
        DownloadOutcome::Rejected(failure) => panic!("表格被拒绝: {:?}", failure),
    }
}
