use thiserror::Error;

/// 單一列的驗證失敗原因 (訊息以日文呈現給使用者)
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RowErrorKind {
    #[error("{0}は必須です")]
    MissingField(&'static str),

    #[error("社員番号は数字で入力してください ({0})")]
    NonNumericEmployeeNumber(String),

    #[error("メールアドレスの形式が正しくありません ({0})")]
    InvalidEmail(String),

    #[error("性別は「男性」「女性」「その他」のいずれかで入力してください ({0})")]
    InvalidGender(String),

    #[error("社員番号 {0} が重複しています")]
    DuplicateEmployeeNumber(i64),

    #[error("メールアドレス {0} が重複しています")]
    DuplicateEmail(String),
}

#[derive(Error, Debug)]
pub enum CizError {
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration validation error in {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value for {field} ({value}): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Encoding error: {message}")]
    EncodingError { message: String },

    #[error("必須の列が見つかりません: {column}")]
    MissingColumnError { column: String },

    #[error("{line}行目: {kind}")]
    RowError { line: usize, kind: RowErrorKind },

    #[error("Validation error: {message}")]
    ValidationError { message: String },

    #[error("Backend returned {status}: {message}")]
    BackendError { status: u16, message: String },

    #[error("Import aborted after {accepted} rows were accepted: {source}")]
    SubmissionError {
        accepted: usize,
        #[source]
        source: Box<CizError>,
    },

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Forbidden: {message}")]
    Forbidden { message: String },

    #[error("Not found: {message}")]
    NotFound { message: String },

    #[error("Conflict: {message}")]
    Conflict { message: String },

    #[error("Insufficient ciz: balance {balance}, requested {requested}")]
    InsufficientCiz { balance: i64, requested: i64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Input,
    Network,
    Backend,
    Access,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Medium,
    High,
    Critical,
}

impl CizError {
    pub fn validation(message: impl Into<String>) -> Self {
        CizError::ValidationError {
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        CizError::NotFound {
            message: message.into(),
        }
    }

    pub fn row(line: usize, kind: RowErrorKind) -> Self {
        CizError::RowError { line, kind }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            CizError::ConfigError { .. }
            | CizError::ConfigValidationError { .. }
            | CizError::InvalidConfigValueError { .. }
            | CizError::MissingConfigError { .. } => ErrorCategory::Configuration,
            CizError::CsvError(_)
            | CizError::EncodingError { .. }
            | CizError::MissingColumnError { .. }
            | CizError::RowError { .. }
            | CizError::ValidationError { .. }
            | CizError::Conflict { .. }
            | CizError::InsufficientCiz { .. } => ErrorCategory::Input,
            CizError::ApiError(_) => ErrorCategory::Network,
            CizError::BackendError { .. } | CizError::NotFound { .. } => ErrorCategory::Backend,
            CizError::SubmissionError { source, .. } => source.category(),
            CizError::Unauthorized | CizError::Forbidden { .. } => ErrorCategory::Access,
            CizError::IoError(_) | CizError::SerializationError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Input | ErrorCategory::Access => ErrorSeverity::High,
            ErrorCategory::Network | ErrorCategory::Backend => ErrorSeverity::Medium,
            ErrorCategory::Configuration | ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    /// 給終端使用者看的訊息
    pub fn user_friendly_message(&self) -> String {
        match self {
            CizError::RowError { .. } | CizError::MissingColumnError { .. } => self.to_string(),
            CizError::EncodingError { message } | CizError::ValidationError { message } => {
                message.clone()
            }
            CizError::CsvError(e) => format!("CSVファイルを読み込めませんでした: {}", e),
            CizError::ApiError(_) => "サーバーに接続できませんでした".to_string(),
            CizError::BackendError { message, .. } => {
                format!("データの保存に失敗しました: {}", message)
            }
            CizError::SubmissionError { accepted, source } => format!(
                "{}件の登録後に取り込みが中断されました: {}",
                accepted,
                source.user_friendly_message()
            ),
            CizError::Unauthorized => "ログインが必要です".to_string(),
            CizError::Forbidden { .. } => "この操作を行う権限がありません".to_string(),
            CizError::NotFound { message } => format!("見つかりません: {}", message),
            CizError::Conflict { message } => message.clone(),
            CizError::InsufficientCiz { balance, requested } => format!(
                "cizが不足しています (残高 {}, 必要 {})",
                balance, requested
            ),
            CizError::ConfigError { .. }
            | CizError::ConfigValidationError { .. }
            | CizError::InvalidConfigValueError { .. }
            | CizError::MissingConfigError { .. } => format!("設定エラー: {}", self),
            CizError::IoError(e) => format!("ファイルの読み書きに失敗しました: {}", e),
            CizError::SerializationError(_) => "データの変換に失敗しました".to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Configuration => {
                "Check the TOML config file and the environment variables it references"
            }
            ErrorCategory::Input => "Fix the reported row or field and submit again",
            ErrorCategory::Network => "Check network connectivity and the backend URL",
            ErrorCategory::Backend => "Inspect the backend logs; the request was rejected",
            ErrorCategory::Access => "Sign in with an account that has the required role",
            ErrorCategory::System => "Check file permissions and available disk space",
        }
    }
}

pub type Result<T> = std::result::Result<T, CizError>;
