use serde::Serialize;

/// 一次未能保存（或保存后无法分类）的下载
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DownloadFailure {
    pub file_name: String,
    pub school_id: String,
    pub download_url: String,
    pub reason: String,
}

/// 一次下载运行的统计，每次运行重新创建
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DownloadReport {
    /// 页面上找到的表格数量
    pub total_found: usize,
    /// 成功保存的表格数量
    pub total_saved: usize,
    /// 按发生顺序排列的失败记录
    pub failures: Vec<DownloadFailure>,
}

impl DownloadReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn merge(&mut self, other: DownloadReport) {
        self.total_found += other.total_found;
        self.total_saved += other.total_saved;
        self.failures.extend(other.failures);
    }
}
