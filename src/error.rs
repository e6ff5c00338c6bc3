//! エラー定義モジュール
//! 
//! カード展示の操作で起こりうる失敗をまとめた列挙型です。
//! いずれも描画ループを止めるものではなく、JS側へは例外として投げずに
//! ログへ記録して状態をそのままにします。

use thiserror::Error;

use crate::cards::CardId;

/// 展示操作のエラー
#[derive(Debug, Error)]
pub enum ExhibitError {
    /// 存在しないカードIDが渡された
    #[error("unknown card id {0}")]
    UnknownCard(CardId),

    /// 検出ラベルに対応するカードがない
    #[error("no card is correlated with label {0:?}")]
    UnknownLabel(String),

    /// コンテナのサイズがまだ測定されていない（幅または高さが0）
    #[error("container has not been measured yet")]
    ContainerNotMeasured,

    /// ポインタ座標が有限値でない
    #[error("pointer position is not finite")]
    InvalidPointer,

    /// 別のカードがドラッグ中
    #[error("card {0} is already being dragged")]
    DragInProgress(CardId),

    /// ドラッグ中でないのにポインタアップが来た
    #[error("no drag session is active")]
    NoActiveDrag,

    /// ドラッグ中のカードへの自動配置要求
    #[error("card {0} is being dragged; auto placement dropped")]
    CardBusy(CardId),

    /// イントロ演出でまだ表示されていないカード
    #[error("card {0} has not been revealed yet")]
    CardHidden(CardId),

    /// 展示は既に破棄されている
    #[error("exhibit has been torn down")]
    TornDown,

    /// 設定JSONの解析に失敗
    #[error("invalid exhibit configuration: {0}")]
    InvalidConfig(#[from] serde_json::Error),
}

impl ExhibitError {
    /// ユーザー操作の競合など、警告するまでもない想定内のエラーかどうか
    pub fn is_benign(&self) -> bool {
        matches!(
            self,
            ExhibitError::NoActiveDrag
                | ExhibitError::InvalidPointer
                | ExhibitError::CardBusy(_)
                | ExhibitError::ContainerNotMeasured
                | ExhibitError::CardHidden(_)
        )
    }
}

/// 展示操作の結果型
pub type ExhibitResult<T> = Result<T, ExhibitError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        assert_eq!(ExhibitError::UnknownCard(CardId(7)).to_string(), "unknown card id #7");
        assert_eq!(
            ExhibitError::CardBusy(CardId(2)).to_string(),
            "card #2 is being dragged; auto placement dropped"
        );
    }

    #[test]
    fn test_benign_classification() {
        assert!(ExhibitError::NoActiveDrag.is_benign());
        assert!(ExhibitError::InvalidPointer.is_benign());
        assert!(!ExhibitError::UnknownCard(CardId(1)).is_benign());
        assert!(!ExhibitError::TornDown.is_benign());
    }
}
