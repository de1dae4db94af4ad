use thiserror::Error;

#[derive(Error, Debug)]
pub enum EvalError {
    #[error("設定エラー: {0}")]
    Config(String),

    #[error("APIキーが設定されていません ({0})。環境変数か `emotion-eval config` で設定してください")]
    MissingApiKey(&'static str),

    #[error("フォルダが見つかりません: {0}")]
    FolderNotFound(String),

    #[error("few-shot例示画像が見つかりません: {basename}.[拡張子] ({label}) in {folder}")]
    FewShotExampleNotFound {
        basename: String,
        label: String,
        folder: String,
    },

    #[error("画像読み込みエラー: {0}")]
    ImageLoad(String),

    #[error("API呼び出しエラー: {0}")]
    ApiCall(String),

    #[error("APIレスポンスのパースに失敗: {0}")]
    ApiParse(String),

    #[error("APIリクエストがタイムアウトしました")]
    Timeout,

    #[error("HTTPエラー: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON解析エラー: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV出力エラー: {0}")]
    Csv(#[from] csv::Error),

    #[error("画像が見つかりません: {0}")]
    NoImagesFound(String),

    #[error("CLI実行エラー: {0}")]
    CliExecution(String),

    #[error(transparent)]
    Common(#[from] emotion_eval_common::Error),
}

pub type Result<T> = std::result::Result<T, EvalError>;
