use thiserror::Error;

/// 強調サービス呼び出しの失敗要因
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("HTTP通信に失敗: {0}")]
    Http(#[from] reqwest::Error),

    #[error("サーバーがエラーを返しました: {status} {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("レスポンスの形式が不正: {0}")]
    Decode(#[source] seavigil_common::Error),
}

#[derive(Error, Debug)]
pub enum SeaVigilError {
    #[error("設定エラー: {0}")]
    Config(String),

    #[error("ファイルが見つかりません: {0}")]
    FileNotFound(String),

    #[error("フォルダが見つかりません: {0}")]
    FolderNotFound(String),

    #[error("入力ファイルが不正: {0}")]
    InvalidInput(String),

    #[error("強調処理の呼び出しに失敗: {0}")]
    Transport(#[from] TransportError),

    #[error("実行できません: {0}")]
    Precondition(String),

    #[error("JSON解析エラー: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Common(seavigil_common::Error),
}

impl From<seavigil_common::Error> for SeaVigilError {
    fn from(err: seavigil_common::Error) -> Self {
        match err {
            seavigil_common::Error::InvalidMedia(msg) => SeaVigilError::InvalidInput(msg),
            other => SeaVigilError::Common(other),
        }
    }
}

pub type Result<T> = std::result::Result<T, SeaVigilError>;
