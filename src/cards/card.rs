//! カードエンティティ
//! 
//! 展示の唯一のエンティティであるカードと、その状態タグを定義します。

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::physics::ContainerSize;
use crate::utils::Vec2;

/// カードの一意なID（生成後は不変）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CardId(pub u32);

impl fmt::Display for CardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// 固定された経緯
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FixSource {
    /// ユーザーがドラッグして置いた
    Dropped,
    /// 物体検出による自動配置
    AutoPlaced,
}

/// カードの状態
/// 
/// ドラッグ中フラグや固定済みID集合の代わりに、1枚につき1つのタグで表します。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "source", rename_all = "snake_case")]
pub enum CardState {
    /// 積分器が位置を動かす
    Free,
    /// ポインタが位置を動かす
    Dragging,
    /// 静止して動かない
    Fixed(FixSource),
}

/// カードの表示用データ（運動には関与しない）
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CardPayload {
    /// 表示タイトル（例: "(001)"）
    pub title: String,
    /// 画像パス
    pub image: Option<String>,
    /// 物体検出のラベル
    pub label: Option<String>,
}

/// カード
#[derive(Debug, Clone, PartialEq)]
pub struct Card {
    id: CardId,
    /// 左上座標（コンテナに対するパーセント）
    pub position: Vec2,
    /// 速度（単位/ms）
    pub velocity: Vec2,
    width_px: f64,
    height_px: f64,
    payload: CardPayload,
    state: CardState,
}

impl Card {
    /// 原点に静止した自由状態のカードを作成
    pub fn new(id: CardId, width_px: f64, height_px: f64, payload: CardPayload) -> Self {
        Self {
            id,
            position: Vec2::ZERO,
            velocity: Vec2::ZERO,
            width_px,
            height_px,
            payload,
            state: CardState::Free,
        }
    }

    pub fn id(&self) -> CardId {
        self.id
    }

    pub fn width_px(&self) -> f64 {
        self.width_px
    }

    pub fn height_px(&self) -> f64 {
        self.height_px
    }

    pub fn payload(&self) -> &CardPayload {
        &self.payload
    }

    pub fn state(&self) -> CardState {
        self.state
    }

    pub fn is_free(&self) -> bool {
        self.state == CardState::Free
    }

    pub fn is_dragging(&self) -> bool {
        self.state == CardState::Dragging
    }

    pub fn is_fixed(&self) -> bool {
        matches!(self.state, CardState::Fixed(_))
    }

    /// 状態を設定（ストア経由でのみ呼ばれる）
    /// 
    /// 自由状態以外では速度を0にします。
    pub(crate) fn set_state(&mut self, state: CardState) {
        self.state = state;
        if state != CardState::Free {
            self.velocity = Vec2::ZERO;
        }
    }

    /// コンテナに対するカードの大きさ（パーセント）
    pub fn size_percent(&self, container: &ContainerSize) -> Vec2 {
        container.size_percent(self.width_px, self.height_px)
    }

    /// 左上座標の最大値（パーセント）
    pub fn max_position(&self, container: &ContainerSize) -> Vec2 {
        container.max_position(self.width_px, self.height_px)
    }

    /// 任意の座標をこのカードの可動範囲内に収める
    pub fn contain(&self, position: Vec2, container: &ContainerSize) -> Vec2 {
        container.contain(position, self.width_px, self.height_px)
    }

    /// 可動範囲内に収まっているかどうか
    pub fn is_contained(&self, container: &ContainerSize) -> bool {
        let max = self.max_position(container);
        self.position.x >= 0.0
            && self.position.y >= 0.0
            && self.position.x <= max.x + 1e-9
            && self.position.y <= max.y + 1e-9
    }
}

/// 描画側へ渡す読み取り専用のカード情報
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CardView {
    pub id: CardId,
    pub x_percent: f64,
    pub y_percent: f64,
    pub width_px: f64,
    pub height_px: f64,
    pub state: CardState,
    pub visible: bool,
    pub title: String,
    pub image: Option<String>,
}

impl CardView {
    /// カードから表示情報を作る
    /// 
    /// `position` はドラッグ中のプレビュー位置など、実際の位置と異なる場合に渡します。
    pub fn from_card(card: &Card, position: Vec2, visible: bool) -> Self {
        Self {
            id: card.id,
            x_percent: position.x,
            y_percent: position.y,
            width_px: card.width_px,
            height_px: card.height_px,
            state: card.state,
            visible,
            title: card.payload.title.clone(),
            image: card.payload.image.clone(),
        }
    }
}
