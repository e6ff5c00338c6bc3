//! イントロ演出の進行管理
//! 
//! 開始からの経過時間でフェーズを進め、カード出現フェーズではカードを
//! 一定間隔で1枚ずつ表示します。`start_next_phase` で手動で先へ進めることもできます。

use serde::Serialize;

use crate::config::IntroConfig;

/// 演出のフェーズ
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IntroPhase {
    /// 何も表示していない
    Initial,
    /// グリッド背景を表示
    Grid,
    /// ヘッダーのタイピング
    Header,
    /// カードを順に表示
    Cards,
    /// 全て表示済み
    Complete,
}

impl IntroPhase {
    /// 次のフェーズ（`Complete` はそのまま）
    pub fn next(self) -> Self {
        match self {
            IntroPhase::Initial => IntroPhase::Grid,
            IntroPhase::Grid => IntroPhase::Header,
            IntroPhase::Header => IntroPhase::Cards,
            IntroPhase::Cards | IntroPhase::Complete => IntroPhase::Complete,
        }
    }
}

/// イントロ演出
#[derive(Debug, Clone)]
pub struct IntroSequence {
    config: IntroConfig,
    card_count: usize,
    phase: IntroPhase,
    /// 開始からの経過時間（ミリ秒）
    elapsed: f64,
    /// カードフェーズに入ってからの経過時間（ミリ秒）
    cards_elapsed: f64,
}

impl IntroSequence {
    /// 新しい演出を作成
    /// 
    /// 無効化されている場合は最初から `Complete` です。
    pub fn new(config: IntroConfig, card_count: usize) -> Self {
        let phase = if config.enabled {
            IntroPhase::Initial
        } else {
            IntroPhase::Complete
        };
        Self {
            config,
            card_count,
            phase,
            elapsed: 0.0,
            cards_elapsed: 0.0,
        }
    }

    pub fn phase(&self) -> IntroPhase {
        self.phase
    }

    pub fn is_complete(&self) -> bool {
        self.phase == IntroPhase::Complete
    }

    pub fn is_grid_visible(&self) -> bool {
        self.phase >= IntroPhase::Grid
    }

    pub fn is_header_visible(&self) -> bool {
        self.phase >= IntroPhase::Header
    }

    /// 時間を進める
    /// 
    /// # 戻り値
    /// 
    /// * フェーズが変わった場合は新しいフェーズ
    pub fn advance(&mut self, delta_ms: f64) -> Option<IntroPhase> {
        if self.is_complete() || !delta_ms.is_finite() || delta_ms < 0.0 {
            return None;
        }

        let before = self.phase;
        if self.phase == IntroPhase::Cards {
            self.cards_elapsed += delta_ms;
        }
        self.elapsed += delta_ms;

        let scheduled = self.scheduled_phase();
        while self.phase < scheduled {
            self.enter(self.phase.next());
        }
        if self.phase == IntroPhase::Cards && self.all_cards_revealed() {
            self.enter(IntroPhase::Complete);
        }

        (self.phase != before).then_some(self.phase)
    }

    /// 手動で次のフェーズへ進める
    pub fn start_next_phase(&mut self) -> IntroPhase {
        let next = self.phase.next();
        if next != self.phase {
            self.enter(next);
        }
        self.phase
    }

    /// 生成順 `index` のカードが表示済みかどうか
    pub fn is_card_visible(&self, index: usize) -> bool {
        match self.phase {
            IntroPhase::Complete => true,
            IntroPhase::Cards => self.cards_elapsed >= index as f64 * self.config.card_interval_ms,
            _ => false,
        }
    }

    fn scheduled_phase(&self) -> IntroPhase {
        if self.elapsed >= self.config.card_start_ms {
            IntroPhase::Cards
        } else if self.elapsed >= self.config.header_start_ms {
            IntroPhase::Header
        } else if self.elapsed >= self.config.grid_fade_in_ms {
            IntroPhase::Grid
        } else {
            IntroPhase::Initial
        }
    }

    fn all_cards_revealed(&self) -> bool {
        let last = self.card_count.saturating_sub(1);
        self.is_card_visible(last)
    }

    fn enter(&mut self, phase: IntroPhase) {
        log::debug!("intro phase: {:?} -> {:?}", self.phase, phase);
        self.phase = phase;
        if phase == IntroPhase::Cards {
            self.cards_elapsed = 0.0;
        }
    }
}
