//! ホバー判定
//! 
//! カーソルの下にあるカードを探し、虫眼鏡オーバーレイ用にカード内の相対位置を返します。
//! 判定範囲はカード下のキャプション分だけ下に延ばしています。

use serde::Serialize;

use crate::cards::{CardId, CardStore};
use crate::physics::ContainerSize;
use crate::utils::Vec2;

/// ホバー中のカード情報
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HoverDetails {
    pub id: CardId,
    /// カード左上からのカーソル位置（ピクセル）
    pub relative_x: f64,
    pub relative_y: f64,
    pub card_width: f64,
    pub card_height: f64,
}

/// カーソル位置のカードを探す
/// 
/// ストアの並び順で最初に当たったカードを返します。ドラッグ中のカードと、
/// `is_visible` が偽を返すカードは対象外です。
/// 
/// # 引数
/// 
/// * `store` - カードストア
/// * `cursor` - カーソル位置（コンテナ左上基準のピクセル）
/// * `container` - 現在のコンテナ寸法
/// * `extra_bottom_px` - 判定範囲を下に延ばす量
/// * `is_visible` - カードが表示済みかどうか
pub fn hover_at<F>(
    store: &CardStore,
    cursor: Vec2,
    container: &ContainerSize,
    extra_bottom_px: f64,
    is_visible: F,
) -> Option<HoverDetails>
where
    F: Fn(CardId) -> bool,
{
    if !container.is_measured() {
        return None;
    }

    store
        .iter()
        .filter(|card| !card.is_dragging() && is_visible(card.id()))
        .find_map(|card| {
            let top_left = container.to_px(card.position);
            let right = top_left.x + card.width_px();
            let bottom = top_left.y + card.height_px() + extra_bottom_px;

            let inside = cursor.x >= top_left.x
                && cursor.x <= right
                && cursor.y >= top_left.y
                && cursor.y <= bottom;

            inside.then(|| HoverDetails {
                id: card.id(),
                relative_x: cursor.x - top_left.x,
                relative_y: cursor.y - top_left.y,
                card_width: card.width_px(),
                card_height: card.height_px(),
            })
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::{CardPayload, CardState};

    const CONTAINER: ContainerSize = ContainerSize::new(1000.0, 800.0);

    fn store() -> CardStore {
        let mut store = CardStore::new();
        let a = store.insert(200.0, 200.0, CardPayload::default());
        let b = store.insert(200.0, 200.0, CardPayload::default());
        store.get_mut(a).unwrap().position = Vec2::new(10.0, 10.0);
        store.get_mut(b).unwrap().position = Vec2::new(50.0, 50.0);
        store
    }

    #[test]
    fn test_hit_returns_relative_position() {
        let store = store();
        let details = hover_at(&store, Vec2::new(150.0, 100.0), &CONTAINER, 200.0, |_| true).unwrap();
        assert_eq!(details.id, CardId(1));
        assert!((details.relative_x - 50.0).abs() < 1e-9);
        assert!((details.relative_y - 20.0).abs() < 1e-9);
        assert_eq!(details.card_width, 200.0);
    }

    #[test]
    fn test_caption_area_counts() {
        let store = store();
        // カード1の下端は280px、キャプション込みで480pxまで
        let details = hover_at(&store, Vec2::new(150.0, 450.0), &CONTAINER, 200.0, |_| true);
        assert_eq!(details.map(|d| d.id), Some(CardId(1)));
        assert!(hover_at(&store, Vec2::new(150.0, 450.0), &CONTAINER, 0.0, |_| true).is_none());
    }

    #[test]
    fn test_skips_dragging_and_hidden() {
        let mut store = store();
        store.set_state(CardId(1), CardState::Dragging).unwrap();
        assert!(hover_at(&store, Vec2::new(150.0, 100.0), &CONTAINER, 200.0, |_| true).is_none());

        let details = hover_at(&store, Vec2::new(600.0, 500.0), &CONTAINER, 200.0, |id| id != CardId(2));
        assert!(details.is_none());
    }

    #[test]
    fn test_miss_and_unmeasured() {
        let store = store();
        assert!(hover_at(&store, Vec2::new(990.0, 10.0), &CONTAINER, 200.0, |_| true).is_none());
        assert!(hover_at(&store, Vec2::new(150.0, 100.0), &ContainerSize::default(), 200.0, |_| true).is_none());
    }
}
