//! ポインタ操作コントローラ
//! 
//! ポインタのダウン・ムーブ・アップを、1度に1枚だけのドラッグセッションに変換します。
//! ドラッグ中は開始点からの移動量だけを記録し、パーセント座標への反映は
//! アップ時に1回だけ行います（パーセント⇔ピクセル往復の誤差を溜めないため）。

use serde::Serialize;

use crate::cards::{CardId, CardState, CardStore, FixSource};
use crate::config::InteractionConfig;
use crate::error::{ExhibitError, ExhibitResult};
use crate::physics::ContainerSize;
use crate::utils::Vec2;

/// 進行中のドラッグセッション
#[derive(Debug, Clone, PartialEq)]
pub struct DragSession {
    /// 掴んでいるカード
    pub card: CardId,
    /// ダウン時のポインタ位置（コンテナ基準のピクセル）
    pub start_pointer: Vec2,
    /// ダウン時のポインタとカード左上の差（ピクセル）
    pub pointer_offset: Vec2,
    /// ダウン時のカード位置（パーセント）
    pub start_position: Vec2,
    /// 開始点からの移動量（ピクセル）
    pub delta: Vec2,
    /// セッション中の最大移動距離（ピクセル）
    pub max_displacement: f64,
    /// ダウン時のコンテナ寸法
    container: ContainerSize,
    /// クリック時に戻すための元の状態
    prior_state: CardState,
    prior_velocity: Vec2,
}

/// ポインタアップの結果
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DragOutcome {
    /// ほとんど動かなかったのでクリックとして扱った
    Activated { card: CardId },
    /// ドラッグを確定してカードを固定した
    Dropped { card: CardId, position: Vec2 },
}

/// コントローラの状態
#[derive(Debug, Clone, PartialEq, Default)]
enum ControllerState {
    #[default]
    Idle,
    Armed(DragSession),
}

/// ポインタ操作コントローラ
#[derive(Debug, Clone)]
pub struct InteractionController {
    config: InteractionConfig,
    state: ControllerState,
}

impl InteractionController {
    /// 新しいコントローラを作成
    pub fn new(config: InteractionConfig) -> Self {
        Self {
            config,
            state: ControllerState::Idle,
        }
    }

    /// ドラッグセッション中かどうか（JS側はこの間だけグローバルなpointerupを登録する）
    pub fn is_armed(&self) -> bool {
        matches!(self.state, ControllerState::Armed(_))
    }

    pub fn session(&self) -> Option<&DragSession> {
        match &self.state {
            ControllerState::Armed(session) => Some(session),
            ControllerState::Idle => None,
        }
    }

    /// ポインタダウン: Idle → Armed
    /// 
    /// カードの速度を0にし、固定済みなら固定を解除してドラッグ状態にします。
    /// 
    /// # 引数
    /// 
    /// * `store` - カードストア
    /// * `id` - ポインタの下にあるカード
    /// * `pointer` - ポインタ位置（コンテナ左上基準のピクセル）
    /// * `container` - 現在のコンテナ寸法
    pub fn pointer_down(
        &mut self,
        store: &mut CardStore,
        id: CardId,
        pointer: Vec2,
        container: &ContainerSize,
    ) -> ExhibitResult<()> {
        if let ControllerState::Armed(session) = &self.state {
            return Err(ExhibitError::DragInProgress(session.card));
        }
        if !container.is_measured() {
            return Err(ExhibitError::ContainerNotMeasured);
        }
        if !pointer.is_finite() {
            return Err(ExhibitError::InvalidPointer);
        }

        let card = store.require(id)?;
        let prior_state = card.state();
        let prior_velocity = card.velocity;
        let start_position = card.position;
        let pointer_offset = pointer - container.to_px(start_position);

        store.set_state(id, CardState::Dragging)?;

        log::debug!("drag armed: card={} prior={:?}", id, prior_state);
        self.state = ControllerState::Armed(DragSession {
            card: id,
            start_pointer: pointer,
            pointer_offset,
            start_position,
            delta: Vec2::ZERO,
            max_displacement: 0.0,
            container: *container,
            prior_state,
            prior_velocity,
        });
        Ok(())
    }

    /// ポインタムーブ: Armed中なら移動量を記録
    /// 
    /// 有限値でない座標は無視します。
    /// 
    /// # 戻り値
    /// 
    /// * 移動量を更新したかどうか
    pub fn pointer_move(&mut self, pointer: Vec2) -> bool {
        if !pointer.is_finite() {
            log::debug!("ignored non-finite pointer ({}, {})", pointer.x, pointer.y);
            return false;
        }
        match &mut self.state {
            ControllerState::Armed(session) => {
                session.delta = pointer - session.start_pointer;
                session.max_displacement = session.max_displacement.max(session.delta.length());
                true
            }
            ControllerState::Idle => false,
        }
    }

    /// ポインタアップ: Armed → Idle
    /// 
    /// 移動量がしきい値未満ならクリックとして元の状態に戻し、
    /// そうでなければ位置を確定してカードを固定します。
    /// ドラッグ中でなければ `NoActiveDrag` を返し、何も変更しません。
    pub fn pointer_up(
        &mut self,
        store: &mut CardStore,
        container: &ContainerSize,
    ) -> ExhibitResult<DragOutcome> {
        let session = match std::mem::take(&mut self.state) {
            ControllerState::Armed(session) => session,
            ControllerState::Idle => return Err(ExhibitError::NoActiveDrag),
        };

        let threshold = self.config.click_threshold_px;
        if session.delta.length() < threshold && session.max_displacement < threshold {
            restore(store, &session)?;
            log::debug!("click on card {}", session.card);
            return Ok(DragOutcome::Activated { card: session.card });
        }

        let container = if container.is_measured() { *container } else { session.container };
        let target = drop_position(&session, &container);
        let position = store.fix_at(session.card, target, FixSource::Dropped, &container)?;

        log::debug!("card {} dropped at ({:.2}, {:.2})", session.card, position.x, position.y);
        Ok(DragOutcome::Dropped {
            card: session.card,
            position,
        })
    }

    /// ドラッグ中カードの表示上の位置（パーセント、可動範囲に補正済み）
    pub fn preview_position(&self, store: &CardStore, container: &ContainerSize) -> Option<(CardId, Vec2)> {
        let session = self.session()?;
        if !container.is_measured() {
            return Some((session.card, session.start_position));
        }
        let card = store.get(session.card)?;
        Some((session.card, card.contain(drop_position(session, container), container)))
    }

    /// セッションを中断し、カードを元の状態へ戻す
    pub fn cancel(&mut self, store: &mut CardStore) -> Option<CardId> {
        match std::mem::take(&mut self.state) {
            ControllerState::Armed(session) => {
                if let Err(err) = restore(store, &session) {
                    log::warn!("failed to restore card after cancelled drag: {}", err);
                }
                Some(session.card)
            }
            ControllerState::Idle => None,
        }
    }
}

impl Default for InteractionController {
    fn default() -> Self {
        Self::new(InteractionConfig::default())
    }
}

fn drop_position(session: &DragSession, container: &ContainerSize) -> Vec2 {
    session.start_position + container.to_percent(session.delta)
}

fn restore(store: &mut CardStore, session: &DragSession) -> ExhibitResult<()> {
    store.set_state(session.card, session.prior_state)?;
    store.set_velocity(session.card, session.prior_velocity)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::CardPayload;

    const CONTAINER: ContainerSize = ContainerSize::new(1000.0, 800.0);

    fn setup() -> (CardStore, CardId, CardId) {
        let mut store = CardStore::new();
        let a = store.insert(200.0, 200.0, CardPayload::default());
        let b = store.insert(200.0, 200.0, CardPayload::default());
        for card in store.iter_mut() {
            card.position = Vec2::new(5.0, 10.0);
            card.velocity = Vec2::new(0.3, -0.4);
        }
        (store, a, b)
    }

    #[test]
    fn test_click_emits_activation_and_keeps_state() {
        let (mut store, a, _) = setup();
        let mut controller = InteractionController::default();

        controller.pointer_down(&mut store, a, Vec2::new(100.0, 100.0), &CONTAINER).unwrap();
        assert!(controller.is_armed());
        assert!(store.get(a).unwrap().is_dragging());
        assert!(store.get(a).unwrap().velocity.is_zero());

        let outcome = controller.pointer_up(&mut store, &CONTAINER).unwrap();
        assert_eq!(outcome, DragOutcome::Activated { card: a });
        assert!(!controller.is_armed());

        let card = store.get(a).unwrap();
        assert!(card.is_free());
        assert_eq!(card.velocity, Vec2::new(0.3, -0.4));
        assert_eq!(card.position, Vec2::new(5.0, 10.0));
    }

    #[test]
    fn test_drag_commits_position_and_fixes() {
        let (mut store, a, _) = setup();
        let mut controller = InteractionController::default();

        controller.pointer_down(&mut store, a, Vec2::new(100.0, 100.0), &CONTAINER).unwrap();
        let session = controller.session().unwrap();
        // カード左上は (50px, 80px)
        assert!(session.pointer_offset.approx_eq(Vec2::new(50.0, 20.0)));

        assert!(controller.pointer_move(Vec2::new(200.0, 200.0)));
        let outcome = controller.pointer_up(&mut store, &CONTAINER).unwrap();

        match outcome {
            DragOutcome::Dropped { card, position } => {
                assert_eq!(card, a);
                assert!(position.approx_eq(Vec2::new(15.0, 22.5)));
            }
            other => panic!("expected drop, got {:?}", other),
        }
        let card = store.get(a).unwrap();
        assert_eq!(card.state(), CardState::Fixed(FixSource::Dropped));
        assert!(card.velocity.is_zero());
    }

    #[test]
    fn test_move_back_to_start_is_still_a_drag() {
        let (mut store, a, _) = setup();
        let mut controller = InteractionController::default();

        controller.pointer_down(&mut store, a, Vec2::new(100.0, 100.0), &CONTAINER).unwrap();
        controller.pointer_move(Vec2::new(160.0, 100.0));
        controller.pointer_move(Vec2::new(101.0, 100.0));
        let outcome = controller.pointer_up(&mut store, &CONTAINER).unwrap();
        assert!(matches!(outcome, DragOutcome::Dropped { .. }));
    }

    #[test]
    fn test_drop_is_clamped() {
        let (mut store, a, _) = setup();
        let mut controller = InteractionController::default();

        controller.pointer_down(&mut store, a, Vec2::new(100.0, 100.0), &CONTAINER).unwrap();
        controller.pointer_move(Vec2::new(5000.0, -5000.0));

        let (_, preview) = controller.preview_position(&store, &CONTAINER).unwrap();
        assert!(preview.approx_eq(Vec2::new(80.0, 0.0)));

        controller.pointer_up(&mut store, &CONTAINER).unwrap();
        assert!(store.get(a).unwrap().is_contained(&CONTAINER));
        assert!(store.get(a).unwrap().position.approx_eq(Vec2::new(80.0, 0.0)));
    }

    #[test]
    fn test_release_on_unmeasured_container_uses_drag_start_container() {
        let (mut store, a, _) = setup();
        let mut controller = InteractionController::default();

        controller.pointer_down(&mut store, a, Vec2::new(100.0, 100.0), &CONTAINER).unwrap();
        controller.pointer_move(Vec2::new(300.0, 180.0));
        let outcome = controller.pointer_up(&mut store, &ContainerSize::default()).unwrap();

        // 200px / 1000px = 20%, 80px / 800px = 10%
        match outcome {
            DragOutcome::Dropped { card, position } => {
                assert_eq!(card, a);
                assert!(position.approx_eq(Vec2::new(25.0, 20.0)));
            }
            other => panic!("expected drop, got {:?}", other),
        }
        let card = store.get(a).unwrap();
        assert!(card.is_fixed());
        assert!(card.is_contained(&CONTAINER));
    }

    #[test]
    fn test_release_after_resize_is_contained_in_new_container() {
        let (mut store, a, _) = setup();
        let mut controller = InteractionController::default();

        controller.pointer_down(&mut store, a, Vec2::new(100.0, 100.0), &CONTAINER).unwrap();
        controller.pointer_move(Vec2::new(600.0, 100.0));

        let resized = ContainerSize::new(500.0, 400.0);
        let outcome = controller.pointer_up(&mut store, &resized).unwrap();

        // 500px は縮んだコンテナの幅いっぱい。200px のカードは 40% なので右端は 60%
        match outcome {
            DragOutcome::Dropped { position, .. } => {
                assert!(position.approx_eq(Vec2::new(60.0, 10.0)));
            }
            other => panic!("expected drop, got {:?}", other),
        }
        assert!(store.get(a).unwrap().is_contained(&resized));
    }

    #[test]
    fn test_non_finite_pointer_is_ignored() {
        let (mut store, a, b) = setup();
        let mut controller = InteractionController::default();

        assert!(matches!(
            controller.pointer_down(&mut store, b, Vec2::new(f64::NAN, 10.0), &CONTAINER),
            Err(ExhibitError::InvalidPointer)
        ));
        assert!(!controller.is_armed());
        assert!(store.get(b).unwrap().is_free());

        controller.pointer_down(&mut store, a, Vec2::new(100.0, 100.0), &CONTAINER).unwrap();
        controller.pointer_move(Vec2::new(300.0, 100.0));
        assert!(!controller.pointer_move(Vec2::new(f64::NAN, 50.0)));
        assert!(!controller.pointer_move(Vec2::new(10.0, f64::INFINITY)));
        assert_eq!(controller.session().unwrap().delta, Vec2::new(200.0, 0.0));

        let outcome = controller.pointer_up(&mut store, &CONTAINER).unwrap();
        match outcome {
            DragOutcome::Dropped { position, .. } => {
                assert!(position.is_finite());
                assert!(position.approx_eq(Vec2::new(25.0, 10.0)));
            }
            other => panic!("expected drop, got {:?}", other),
        }
        assert!(store.get(a).unwrap().is_contained(&CONTAINER));
    }

    #[test]
    fn test_single_dragger() {
        let (mut store, a, b) = setup();
        let mut controller = InteractionController::default();

        controller.pointer_down(&mut store, a, Vec2::new(100.0, 100.0), &CONTAINER).unwrap();
        let err = controller
            .pointer_down(&mut store, b, Vec2::new(300.0, 300.0), &CONTAINER)
            .unwrap_err();
        assert!(matches!(err, ExhibitError::DragInProgress(id) if id == a));
        assert!(store.iter().filter(|card| card.is_dragging()).count() == 1);
        assert!(store.get(b).unwrap().is_free());
    }

    #[test]
    fn test_pointer_up_without_drag_is_noop() {
        let (mut store, a, _) = setup();
        let mut controller = InteractionController::default();
        let before: Vec<_> = store.iter().cloned().collect();

        assert!(matches!(
            controller.pointer_up(&mut store, &CONTAINER),
            Err(ExhibitError::NoActiveDrag)
        ));
        assert!(!controller.pointer_move(Vec2::new(10.0, 10.0)));
        let after: Vec<_> = store.iter().cloned().collect();
        assert_eq!(before, after);
        assert!(store.get(a).unwrap().is_free());
    }

    #[test]
    fn test_redrag_demotes_fixed_card() {
        let (mut store, a, _) = setup();
        store.fix_at(a, Vec2::new(10.0, 10.0), FixSource::AutoPlaced, &CONTAINER).unwrap();
        let mut controller = InteractionController::default();

        controller.pointer_down(&mut store, a, Vec2::new(120.0, 90.0), &CONTAINER).unwrap();
        assert!(store.get(a).unwrap().is_dragging());
        assert!(store.fixed_ids().is_empty());

        // クリックなら固定状態に戻る
        controller.pointer_up(&mut store, &CONTAINER).unwrap();
        assert_eq!(store.get(a).unwrap().state(), CardState::Fixed(FixSource::AutoPlaced));
    }

    #[test]
    fn test_unknown_card_and_unmeasured_container() {
        let (mut store, _, _) = setup();
        let mut controller = InteractionController::default();

        assert!(matches!(
            controller.pointer_down(&mut store, CardId(42), Vec2::ZERO, &CONTAINER),
            Err(ExhibitError::UnknownCard(CardId(42)))
        ));
        assert!(matches!(
            controller.pointer_down(&mut store, CardId(1), Vec2::ZERO, &ContainerSize::default()),
            Err(ExhibitError::ContainerNotMeasured)
        ));
        assert!(!controller.is_armed());
    }

    #[test]
    fn test_cancel_restores_card() {
        let (mut store, a, _) = setup();
        let mut controller = InteractionController::default();

        controller.pointer_down(&mut store, a, Vec2::new(100.0, 100.0), &CONTAINER).unwrap();
        controller.pointer_move(Vec2::new(400.0, 400.0));
        assert_eq!(controller.cancel(&mut store), Some(a));
        assert!(store.get(a).unwrap().is_free());
        assert_eq!(store.get(a).unwrap().position, Vec2::new(5.0, 10.0));
        assert_eq!(controller.cancel(&mut store), None);
    }
}
