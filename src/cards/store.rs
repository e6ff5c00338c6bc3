//! カードストア
//! 
//! 全カードの正となる一覧を保持します。状態の変更はここで定義したメソッドを通してのみ行い、
//! 「ドラッグ中は高々1枚」「固定カードの速度は0」の不変条件をストア側で守ります。

use rand::Rng;

use crate::cards::{Card, CardId, CardPayload, CardState, FixSource};
use crate::config::ExhibitConfig;
use crate::error::{ExhibitError, ExhibitResult};
use crate::physics::ContainerSize;
use crate::utils::{random_velocity, IdGenerator, Vec2};

/// カードストア
#[derive(Debug, Default)]
pub struct CardStore {
    cards: Vec<Card>,
    ids: IdGenerator,
}

impl CardStore {
    /// 空のストアを作成
    pub fn new() -> Self {
        Self::default()
    }

    /// 設定に従ってカードを生成したストアを作成
    /// 
    /// 速度はランダムに決めますが、位置はコンテナが測定されるまで原点のままです。
    /// 測定後に `scatter` で散らしてください。
    pub fn with_cards<R: Rng + ?Sized>(config: &ExhibitConfig, rng: &mut R) -> Self {
        let mut store = Self::new();
        for index in 0..config.card_count {
            let artifact = config.artifacts.get(index);
            let payload = CardPayload {
                title: format!("({:03})", index + 1),
                image: artifact.map(|a| a.image.clone()),
                label: artifact.map(|a| a.label.clone()),
            };
            let id = store.insert(config.card_width_px, config.card_height_px, payload);
            if let Some(card) = store.get_mut(id) {
                card.velocity = random_velocity(rng, config.kinetic.min_speed, config.kinetic.max_speed);
            }
        }
        store
    }

    /// カードを1枚追加してIDを返す
    pub fn insert(&mut self, width_px: f64, height_px: f64, payload: CardPayload) -> CardId {
        let id = CardId(self.ids.next_id());
        self.cards.push(Card::new(id, width_px, height_px, payload));
        id
    }

    /// 全カードを可動範囲内のランダムな位置へ配置
    pub fn scatter<R: Rng + ?Sized>(&mut self, container: &ContainerSize, rng: &mut R) {
        if !container.is_measured() {
            return;
        }
        for card in self.cards.iter_mut() {
            let max = card.max_position(container);
            card.position = Vec2::new(rng.gen::<f64>() * max.x, rng.gen::<f64>() * max.y);
        }
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn get(&self, id: CardId) -> Option<&Card> {
        self.cards.iter().find(|card| card.id() == id)
    }

    pub fn get_mut(&mut self, id: CardId) -> Option<&mut Card> {
        self.cards.iter_mut().find(|card| card.id() == id)
    }

    /// 存在しないIDなら `UnknownCard`
    pub fn require(&self, id: CardId) -> ExhibitResult<&Card> {
        self.get(id).ok_or(ExhibitError::UnknownCard(id))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Card> {
        self.cards.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Card> {
        self.cards.iter_mut()
    }

    /// 生成順のインデックス（イントロ演出の出現順）
    pub fn index_of(&self, id: CardId) -> Option<usize> {
        self.cards.iter().position(|card| card.id() == id)
    }

    /// ドラッグ中のカード
    pub fn dragging(&self) -> Option<CardId> {
        self.cards.iter().find(|card| card.is_dragging()).map(Card::id)
    }

    /// 固定済みカードのID（生成順）
    pub fn fixed_ids(&self) -> Vec<CardId> {
        self.cards.iter().filter(|card| card.is_fixed()).map(Card::id).collect()
    }

    /// 検出ラベルに対応するカード
    pub fn find_by_label(&self, label: &str) -> Option<CardId> {
        self.cards
            .iter()
            .find(|card| {
                card.payload()
                    .label
                    .as_deref()
                    .map_or(false, |l| l.eq_ignore_ascii_case(label))
            })
            .map(Card::id)
    }

    /// カードの状態を変更
    /// 
    /// 別のカードがドラッグ中のときに `Dragging` にしようとすると `DragInProgress` になります。
    pub fn set_state(&mut self, id: CardId, state: CardState) -> ExhibitResult<()> {
        if state == CardState::Dragging {
            if let Some(current) = self.dragging() {
                if current != id {
                    return Err(ExhibitError::DragInProgress(current));
                }
            }
        }

        let card = self.get_mut(id).ok_or(ExhibitError::UnknownCard(id))?;
        card.set_state(state);
        Ok(())
    }

    /// 指定位置（可動範囲に補正）でカードを固定
    /// 
    /// # 戻り値
    /// 
    /// * 実際に固定された位置
    pub fn fix_at(
        &mut self,
        id: CardId,
        position: Vec2,
        source: FixSource,
        container: &ContainerSize,
    ) -> ExhibitResult<Vec2> {
        let card = self.get_mut(id).ok_or(ExhibitError::UnknownCard(id))?;
        let contained = card.contain(position, container);
        card.position = contained;
        card.set_state(CardState::Fixed(source));
        Ok(contained)
    }

    /// 速度を設定（自由状態のカードのみ有効）
    pub fn set_velocity(&mut self, id: CardId, velocity: Vec2) -> ExhibitResult<()> {
        let card = self.get_mut(id).ok_or(ExhibitError::UnknownCard(id))?;
        if card.is_free() {
            card.velocity = velocity;
        }
        Ok(())
    }
}
