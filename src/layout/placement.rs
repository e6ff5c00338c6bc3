//! 自動配置
//! 
//! 物体検出の一致でカードを重ならない位置に並べて固定します。
//! 行詰め（右へ並べ、はみ出したら次の行へ折り返す）の簡単な方式で、
//! 一般的なビンパッキングではありません。

use serde::Serialize;

use crate::cards::{Card, CardId, CardState, CardStore, FixSource};
use crate::config::{PlacementConfig, PlacementPolicy};
use crate::error::{ExhibitError, ExhibitResult};
use crate::physics::ContainerSize;
use crate::utils::{clamp, Vec2};

/// 配置済みの枠（パーセント）
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Slot {
    pub position: Vec2,
    pub size: Vec2,
}

impl Slot {
    /// 2つの枠が重なっているかどうか（辺が接するだけなら重ならない）
    pub fn overlaps(&self, other: &Slot) -> bool {
        self.position.x < other.position.x + other.size.x
            && other.position.x < self.position.x + self.size.x
            && self.position.y < other.position.y + other.size.y
            && other.position.y < self.position.y + self.size.y
    }
}

/// 配置要求の結果
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PlacementOutcome {
    /// 新しく配置して固定した
    Placed { card: CardId, position: Vec2 },
    /// 既に固定済みだったので何もしなかった
    AlreadyFixed { card: CardId, position: Vec2 },
}

impl PlacementOutcome {
    pub fn card(&self) -> CardId {
        match *self {
            PlacementOutcome::Placed { card, .. } | PlacementOutcome::AlreadyFixed { card, .. } => card,
        }
    }

    pub fn position(&self) -> Vec2 {
        match *self {
            PlacementOutcome::Placed { position, .. } | PlacementOutcome::AlreadyFixed { position, .. } => position,
        }
    }
}

/// 自動配置ヒューリスティック
#[derive(Debug, Clone)]
pub struct PlacementHeuristic {
    config: PlacementConfig,
    /// 最後に自動配置した枠
    last_slot: Option<Slot>,
}

impl PlacementHeuristic {
    /// 新しい自動配置器を作成
    pub fn new(config: PlacementConfig) -> Self {
        Self {
            config,
            last_slot: None,
        }
    }

    pub fn last_slot(&self) -> Option<Slot> {
        self.last_slot
    }

    /// カードを自動配置して固定
    /// 
    /// 固定済みのカードには何もしません（同じ要求を繰り返しても結果は同じ）。
    /// ドラッグ中のカードは `CardBusy`、コンテナ未測定は `ContainerNotMeasured` で、
    /// 呼び出し側は次の検出フレームで再試行します。
    pub fn place(
        &mut self,
        store: &mut CardStore,
        id: CardId,
        container: &ContainerSize,
    ) -> ExhibitResult<PlacementOutcome> {
        if !container.is_measured() {
            return Err(ExhibitError::ContainerNotMeasured);
        }

        let card = store.require(id)?;
        match card.state() {
            CardState::Dragging => return Err(ExhibitError::CardBusy(id)),
            CardState::Fixed(_) => {
                return Ok(PlacementOutcome::AlreadyFixed {
                    card: id,
                    position: card.position,
                })
            }
            CardState::Free => {}
        }

        let size = card.size_percent(container);
        let after_last = self.slot_after_last(size);
        let target = match self.config.policy {
            PlacementPolicy::LastSlot => after_last,
            PlacementPolicy::AllFixed => self.first_free_slot(store, size, container).unwrap_or(after_last),
        };

        let position = store.fix_at(id, target, FixSource::AutoPlaced, container)?;
        self.last_slot = Some(Slot { position, size });

        log::info!("card {} auto-placed at ({:.2}, {:.2})", id, position.x, position.y);
        Ok(PlacementOutcome::Placed { card: id, position })
    }

    /// 直前の枠の右隣、入らなければ次の行の左端
    fn slot_after_last(&self, size: Vec2) -> Vec2 {
        let gap = self.config.gap_percent;

        let position = match self.last_slot {
            None => Vec2::new(gap, gap),
            Some(last) => {
                let mut x = last.position.x + last.size.x + gap;
                let mut y = last.position.y;
                if x + size.x > 100.0 - gap {
                    x = gap;
                    y = last.position.y + last.size.y + gap;
                    if y + size.y > 100.0 - gap {
                        y = 100.0 - size.y - gap;
                    }
                }
                Vec2::new(x, y)
            }
        };

        self.clamp_to_margins(position, size)
    }

    /// 行詰めの候補を左上から順に試し、固定済みのどのカードとも重ならない最初の枠
    fn first_free_slot(&self, store: &CardStore, size: Vec2, container: &ContainerSize) -> Option<Vec2> {
        let gap = self.config.gap_percent;
        let occupied: Vec<Slot> = store
            .iter()
            .filter(|card| card.is_fixed())
            .map(|card| slot_of(card, container))
            .collect();

        let step_x = size.x + gap;
        let step_y = size.y + gap;
        if step_x <= 0.0 || step_y <= 0.0 {
            return None;
        }

        let mut y = gap;
        while y + size.y <= 100.0 - gap {
            let mut x = gap;
            while x + size.x <= 100.0 - gap {
                let candidate = Slot {
                    position: Vec2::new(x, y),
                    size,
                };
                if !occupied.iter().any(|slot| slot.overlaps(&candidate)) {
                    return Some(candidate.position);
                }
                x += step_x;
            }
            y += step_y;
        }
        None
    }

    fn clamp_to_margins(&self, position: Vec2, size: Vec2) -> Vec2 {
        let gap = self.config.gap_percent;
        Vec2::new(
            clamp(position.x, gap, 100.0 - size.x - gap),
            clamp(position.y, gap, 100.0 - size.y - gap),
        )
    }
}

impl Default for PlacementHeuristic {
    fn default() -> Self {
        Self::new(PlacementConfig::default())
    }
}

fn slot_of(card: &Card, container: &ContainerSize) -> Slot {
    Slot {
        position: card.position,
        size: card.size_percent(container),
    }
}
