//! ロギングユーティリティモジュール
//! 
//! `log` ファサードの初期化を行います。WebAssembly上では `wasm_logger` を通して
//! ブラウザのコンソールへ出力し、それ以外（ネイティブのテストなど）では何もしません。

use serde::{Deserialize, Serialize};

/// ログレベル
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// 詳細なトレース（ティックごとの情報）
    Trace,
    /// デバッグ情報
    Debug,
    /// 一般的な情報
    #[default]
    Info,
    /// 警告（不明なカードIDなど）
    Warning,
    /// エラー
    Error,
}

impl From<LogLevel> for log::Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => log::Level::Trace,
            LogLevel::Debug => log::Level::Debug,
            LogLevel::Info => log::Level::Info,
            LogLevel::Warning => log::Level::Warn,
            LogLevel::Error => log::Level::Error,
        }
    }
}

/// ロギング初期化
/// 
/// `wasm_logger` はプロセスに一度しか登録できないため、最初の呼び出しで全レベルを
/// 通すロガーとして登録し、出力するレベルは `log::set_max_level` で絞ります。
/// 2回目以降の呼び出しはレベルの変更だけを行います。
pub fn init_logging(min_level: LogLevel) {
    #[cfg(target_arch = "wasm32")]
    {
        static REGISTER: std::sync::Once = std::sync::Once::new();
        REGISTER.call_once(|| {
            wasm_logger::init(wasm_logger::Config::new(log::Level::Trace));
        });
    }

    log::set_max_level(log::Level::from(min_level).to_level_filter());
    log::info!("ロガーが初期化されました (最小レベル: {:?})", min_level);
}
