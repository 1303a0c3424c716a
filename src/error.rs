use thiserror::Error;

/// Everything a request can fail with.
///
/// The messages are shown to the user next to the form, so they stay short
/// and name the offending field or value.
#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("表單提交錯誤：缺少欄位 {0}")]
    MissingField(&'static str),

    #[error("無效的用戶：{0}")]
    InvalidUser(String),

    #[error("用戶已存在：{0}")]
    DuplicateUser(String),

    #[error("未知銀行：{0}")]
    UnknownBank(String),

    #[error("{person} 已使用過 {bank}")]
    BankAlreadyUsed { person: String, bank: String },

    #[error("面值必須是以下數字之一 (0, 10, 20, 50, 100, 200)：{0}")]
    InvalidValue(String),

    #[error("日期格式錯誤：{0}")]
    DateFormat(String),

    #[error("開始日期不能晚於結束日期")]
    DateRange,

    #[error("儲存失敗：{0:#}")]
    Storage(#[from] anyhow::Error),
}

impl LedgerError {
    /// Client mistakes as opposed to storage trouble
    pub fn is_user_error(&self) -> bool {
        !matches!(self, LedgerError::Storage(_))
    }
}
