//! 展示モジュール
//! 
//! カードストアと、それを変更する積分器・ポインタ操作・自動配置をひとまとめに所有します。
//! 変更はすべて `&mut self` を通るため、アニメーションフレーム・ポインタイベント・
//! 物体検出の通知がどの順序で届いても1つずつ処理されます。

use rand::rngs::SmallRng;
use rand::SeedableRng;
use serde::Serialize;

use crate::animation::{IntroPhase, IntroSequence};
use crate::cards::{CardId, CardStore, CardView};
use crate::config::ExhibitConfig;
use crate::error::{ExhibitError, ExhibitResult};
use crate::input::{hover_at, DragOutcome, HoverDetails, InteractionController, PointerEvent};
use crate::layout::{ruler_ticks, PlacementHeuristic, PlacementOutcome, RulerTick};
use crate::physics::{ContainerSize, KineticIntegrator};
use crate::utils::{generate_instance_id, PendingTimers, Vec2};

/// 描画側・遷移側へ通知するイベント
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ExhibitEvent {
    /// カードがクリックされた（詳細表示を開く）
    Activated { card: CardId },
    /// ドラッグしたカードが置かれた
    Dropped { card: CardId, position: Vec2 },
    /// 物体検出によりカードが自動配置された
    AutoPlaced { card: CardId, position: Vec2 },
    /// 自動配置の通知を閉じる時間になった
    AutoPlaceNoticeExpired { card: CardId },
    /// イントロ演出のフェーズが変わった
    IntroPhaseChanged { phase: IntroPhase },
}

/// 描画用のスナップショット
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExhibitSnapshot {
    /// 状態が変わるたびに増える番号
    pub revision: u64,
    pub intro_phase: IntroPhase,
    /// 背景グリッドを表示するか
    pub grid_visible: bool,
    /// ヘッダーを表示するか
    pub header_visible: bool,
    pub cards: Vec<CardView>,
}

/// カード展示
pub struct Exhibit {
    id: String,
    config: ExhibitConfig,
    store: CardStore,
    integrator: KineticIntegrator,
    controller: InteractionController,
    placement: PlacementHeuristic,
    intro: IntroSequence,
    timers: PendingTimers<ExhibitEvent>,
    events: Vec<ExhibitEvent>,
    rng: SmallRng,
    /// 最後に測定されたコンテナ寸法
    container: ContainerSize,
    /// 初期位置を散らしたかどうか
    scattered: bool,
    revision: u64,
    torn_down: bool,
}

impl Exhibit {
    /// 新しい展示を作成
    pub fn new(config: ExhibitConfig) -> Self {
        Self::build(config, SmallRng::from_entropy())
    }

    /// 乱数のシードを固定して作成（テストや再現用）
    pub fn with_seed(config: ExhibitConfig, seed: u64) -> Self {
        Self::build(config, SmallRng::seed_from_u64(seed))
    }

    fn build(config: ExhibitConfig, mut rng: SmallRng) -> Self {
        let config = config.sanitized();
        let store = CardStore::with_cards(&config, &mut rng);
        let id = generate_instance_id();

        log::info!("{}: created with {} cards", id, store.len());

        Self {
            id,
            integrator: KineticIntegrator::new(config.kinetic.clone()),
            controller: InteractionController::new(config.interaction.clone()),
            placement: PlacementHeuristic::new(config.placement.clone()),
            intro: IntroSequence::new(config.intro.clone(), store.len()),
            store,
            config,
            timers: PendingTimers::new(),
            events: Vec::new(),
            rng,
            container: ContainerSize::default(),
            scattered: false,
            revision: 0,
            torn_down: false,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn config(&self) -> &ExhibitConfig {
        &self.config
    }

    /// カードストア（読み取り専用）
    pub fn store(&self) -> &CardStore {
        &self.store
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    /// ドラッグセッション中かどうか
    pub fn is_dragging(&self) -> bool {
        self.controller.is_armed()
    }

    pub fn intro_phase(&self) -> IntroPhase {
        self.intro.phase()
    }

    /// 保留中のタイマー数
    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    /// アニメーションを1フレーム進める
    /// 
    /// # 戻り値
    /// 
    /// * 次のフレームを予約すべきかどうか（破棄後は常に `false`）
    pub fn tick(&mut self, delta_ms: f64, container: ContainerSize) -> bool {
        if self.torn_down {
            return false;
        }
        self.observe_container(container);

        if !delta_ms.is_finite() || delta_ms < 0.0 {
            log::debug!("{}: skipped tick with invalid delta {}", self.id, delta_ms);
            return true;
        }

        let fired = self.timers.advance(delta_ms);
        if !fired.is_empty() {
            self.events.extend(fired);
        }

        if let Some(phase) = self.intro.advance(delta_ms) {
            self.events.push(ExhibitEvent::IntroPhaseChanged { phase });
            self.bump();
        }

        let report = self.integrator.step(&mut self.store, delta_ms, &container, &mut self.rng);
        if report.has_changes() {
            self.bump();
        }
        if !report.bounced.is_empty() {
            log::trace!("{}: bounced {:?}", self.id, report.bounced);
        }
        true
    }

    /// ポインタダウン
    /// 
    /// # 引数
    /// 
    /// * `id` - ポインタの下にあるカード
    /// * `pointer` - ポインタ位置（コンテナ左上基準のピクセル）
    /// * `container` - 現在のコンテナ寸法
    pub fn pointer_down(&mut self, id: CardId, pointer: Vec2, container: ContainerSize) -> ExhibitResult<()> {
        self.ensure_live()?;
        self.observe_container(container);

        let index = self.store.index_of(id).ok_or(ExhibitError::UnknownCard(id))?;
        if !self.intro.is_card_visible(index) {
            return Err(ExhibitError::CardHidden(id));
        }

        self.controller.pointer_down(&mut self.store, id, pointer, &container)?;
        self.bump();
        Ok(())
    }

    /// ポインタムーブ（ドラッグ中でなければ何もしない）
    pub fn pointer_move(&mut self, pointer: Vec2) -> ExhibitResult<bool> {
        self.ensure_live()?;
        let moved = self.controller.pointer_move(pointer);
        if moved {
            self.bump();
        }
        Ok(moved)
    }

    /// ポインタアップ
    pub fn pointer_up(&mut self, container: ContainerSize) -> ExhibitResult<DragOutcome> {
        self.ensure_live()?;
        self.observe_container(container);

        let outcome = self.controller.pointer_up(&mut self.store, &container)?;
        self.bump();

        match outcome {
            DragOutcome::Activated { card } => {
                let event = ExhibitEvent::Activated { card };
                let delay = self.config.interaction.activation_delay_ms;
                if delay > 0.0 {
                    self.timers.schedule(delay, event);
                } else {
                    self.events.push(event);
                }
            }
            DragOutcome::Dropped { card, position } => {
                self.events.push(ExhibitEvent::Dropped { card, position });
            }
        }
        Ok(outcome)
    }

    /// ポインタイベントを振り分ける
    pub fn handle_pointer(&mut self, event: PointerEvent, container: ContainerSize) -> ExhibitResult<()> {
        match event {
            PointerEvent::Down { card, x, y } => self.pointer_down(card, Vec2::new(x, y), container),
            PointerEvent::Move { x, y } => self.pointer_move(Vec2::new(x, y)).map(|_| ()),
            PointerEvent::Up => self.pointer_up(container).map(|_| ()),
        }
    }

    /// 物体検出の一致によるカードの自動配置
    /// 
    /// 同じカードへの要求は何度来ても結果は同じです。ドラッグ中のカードへの要求は
    /// `CardBusy` で捨てられます。
    pub fn request_auto_place(&mut self, id: CardId, container: ContainerSize) -> ExhibitResult<PlacementOutcome> {
        self.ensure_live()?;
        self.observe_container(container);

        let outcome = self.placement.place(&mut self.store, id, &container)?;
        if let PlacementOutcome::Placed { card, position } = outcome {
            self.bump();
            self.events.push(ExhibitEvent::AutoPlaced { card, position });
            self.timers
                .schedule(self.config.placement.notice_ms, ExhibitEvent::AutoPlaceNoticeExpired { card });
        }
        Ok(outcome)
    }

    /// 検出ラベルに対応するカードを自動配置
    pub fn request_auto_place_for_label(
        &mut self,
        label: &str,
        container: ContainerSize,
    ) -> ExhibitResult<PlacementOutcome> {
        self.ensure_live()?;
        let id = self
            .store
            .find_by_label(label)
            .ok_or_else(|| ExhibitError::UnknownLabel(label.to_string()))?;
        self.request_auto_place(id, container)
    }

    /// カーソル下のカード
    pub fn hover(&self, cursor: Vec2, container: ContainerSize) -> Option<HoverDetails> {
        if self.torn_down {
            return None;
        }
        let store = &self.store;
        let intro = &self.intro;
        hover_at(
            store,
            cursor,
            &container,
            self.config.interaction.hover_extra_bottom_px,
            |id| store.index_of(id).map_or(false, |index| intro.is_card_visible(index)),
        )
    }

    /// イントロ演出を手動で次へ進める
    pub fn start_next_intro_phase(&mut self) -> IntroPhase {
        let before = self.intro.phase();
        let phase = self.intro.start_next_phase();
        if phase != before {
            self.events.push(ExhibitEvent::IntroPhaseChanged { phase });
            self.bump();
        }
        phase
    }

    /// 定規の目盛り
    pub fn ruler_ticks(&self, container_height_px: f64) -> Vec<RulerTick> {
        ruler_ticks(container_height_px, &self.config.ruler)
    }

    /// 描画用スナップショット
    /// 
    /// ドラッグ中のカードは移動中の表示位置で返します。
    pub fn snapshot(&self) -> ExhibitSnapshot {
        let preview = self.controller.preview_position(&self.store, &self.container);

        let cards = self
            .store
            .iter()
            .enumerate()
            .map(|(index, card)| {
                let position = match preview {
                    Some((id, position)) if id == card.id() => position,
                    _ => card.position,
                };
                CardView::from_card(card, position, self.intro.is_card_visible(index))
            })
            .collect();

        ExhibitSnapshot {
            revision: self.revision,
            intro_phase: self.intro.phase(),
            grid_visible: self.intro.is_grid_visible(),
            header_visible: self.intro.is_header_visible(),
            cards,
        }
    }

    /// 溜まったイベントを取り出す
    pub fn drain_events(&mut self) -> Vec<ExhibitEvent> {
        std::mem::take(&mut self.events)
    }

    /// 展示を破棄する（アンマウント）
    /// 
    /// 以降 `tick` は `false` を返し、保留中のタイマーとドラッグは破棄されます。
    pub fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        if let Some(card) = self.controller.cancel(&mut self.store) {
            log::debug!("{}: cancelled drag of card {} on teardown", self.id, card);
        }
        self.timers.clear();
        self.events.clear();
        self.torn_down = true;
        log::info!("{}: torn down", self.id);
    }

    fn ensure_live(&self) -> ExhibitResult<()> {
        if self.torn_down {
            Err(ExhibitError::TornDown)
        } else {
            Ok(())
        }
    }

    /// 測定済みのコンテナ寸法を記録し、初回はカードを散らす
    fn observe_container(&mut self, container: ContainerSize) {
        if !container.is_measured() {
            return;
        }
        self.container = container;
        if !self.scattered {
            self.store.scatter(&container, &mut self.rng);
            self.scattered = true;
            self.bump();
        }
    }

    fn bump(&mut self) {
        self.revision += 1;
    }
}
