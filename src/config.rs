//! 展示設定モジュール
//! 
//! 調整可能な定数をすべてここに集めています。JSから JSON 文字列で上書きでき、
//! 省略したフィールドは既定値になります。

use serde::{Deserialize, Serialize};

use crate::error::ExhibitResult;
use crate::utils::LogLevel;

/// 大目盛り1つあたりの分割数の上限
pub const MAX_RULER_SEGMENTS: u32 = 100;

/// 展示全体の設定
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ExhibitConfig {
    /// カード枚数（セッション中は変化しない）
    pub card_count: usize,

    /// カードの幅（ピクセル）
    pub card_width_px: f64,

    /// カードの高さ（ピクセル）
    pub card_height_px: f64,

    /// 先頭のカードに割り当てる展示物（画像と検出ラベル）
    pub artifacts: Vec<ArtifactConfig>,

    /// 運動の設定
    pub kinetic: KineticConfig,

    /// ポインタ操作の設定
    pub interaction: InteractionConfig,

    /// 自動配置の設定
    pub placement: PlacementConfig,

    /// イントロ演出の設定
    pub intro: IntroConfig,

    /// 定規の目盛りの設定
    pub ruler: RulerConfig,

    /// スナップショットを再送する最短間隔（ミリ秒）
    pub snapshot_interval_ms: f64,

    /// ログレベル
    pub log_level: LogLevel,
}

impl Default for ExhibitConfig {
    fn default() -> Self {
        Self {
            card_count: 10,
            card_width_px: 200.0,
            card_height_px: 200.0,
            artifacts: vec![
                ArtifactConfig::new("/cig.png", "cigarette"),
                ArtifactConfig::new("/airpod.png", "airpods"),
                ArtifactConfig::new("/starbucks.png", "cup"),
            ],
            kinetic: KineticConfig::default(),
            interaction: InteractionConfig::default(),
            placement: PlacementConfig::default(),
            intro: IntroConfig::default(),
            ruler: RulerConfig::default(),
            snapshot_interval_ms: 100.0,
            log_level: LogLevel::Info,
        }
    }
}

impl ExhibitConfig {
    /// JSON文字列から設定を読み込む
    pub fn from_json(json: &str) -> ExhibitResult<Self> {
        let config: ExhibitConfig = serde_json::from_str(json)?;
        Ok(config.sanitized())
    }

    /// 矛盾した値を補正した設定を返す
    pub fn sanitized(mut self) -> Self {
        self.card_width_px = self.card_width_px.max(1.0);
        self.card_height_px = self.card_height_px.max(1.0);

        if self.kinetic.min_speed > self.kinetic.max_speed {
            std::mem::swap(&mut self.kinetic.min_speed, &mut self.kinetic.max_speed);
        }
        self.kinetic.min_speed = self.kinetic.min_speed.max(0.0);
        self.kinetic.max_speed = self.kinetic.max_speed.max(0.0);

        self.interaction.click_threshold_px = self.interaction.click_threshold_px.max(0.0);
        self.placement.gap_percent = self.placement.gap_percent.clamp(0.0, 50.0);
        self.ruler.segments_per_major = self.ruler.segments_per_major.clamp(1, MAX_RULER_SEGMENTS);
        if !self.ruler.major_interval_px.is_finite() {
            self.ruler.major_interval_px = RulerConfig::default().major_interval_px;
        }
        // 小目盛りは1ピクセル以上
        self.ruler.major_interval_px = self
            .ruler
            .major_interval_px
            .max(f64::from(self.ruler.segments_per_major));
        self
    }
}

/// 展示物（カードに載る画像と、物体検出のラベル）
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ArtifactConfig {
    pub image: String,
    pub label: String,
}

impl ArtifactConfig {
    pub fn new(image: &str, label: &str) -> Self {
        Self {
            image: image.to_string(),
            label: label.to_string(),
        }
    }
}

/// 運動の設定
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct KineticConfig {
    /// ランダム速度の最小の大きさ（単位/ms）
    pub min_speed: f64,
    /// ランダム速度の最大の大きさ（単位/ms）
    pub max_speed: f64,
    /// 速度に掛ける係数
    pub speed_scale: f64,
}

impl Default for KineticConfig {
    fn default() -> Self {
        Self {
            min_speed: 0.4,
            max_speed: 0.6,
            speed_scale: 0.01,
        }
    }
}

/// ポインタ操作の設定
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct InteractionConfig {
    /// これ未満の移動量ならクリックとみなす（ピクセル）
    pub click_threshold_px: f64,
    /// クリックから詳細表示イベントまでの遅延（ミリ秒、0で即時）
    pub activation_delay_ms: f64,
    /// ホバー判定をカード下端から延ばす量（キャプション分、ピクセル）
    pub hover_extra_bottom_px: f64,
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            click_threshold_px: 5.0,
            activation_delay_ms: 0.0,
            hover_extra_bottom_px: 200.0,
        }
    }
}

/// 自動配置の重なり回避方針
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum PlacementPolicy {
    /// 直前に自動配置したカードだけを避ける
    #[default]
    LastSlot,
    /// 固定済みの全カードを避ける
    AllFixed,
}

/// 自動配置の設定
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PlacementConfig {
    /// 余白と間隔（パーセント）
    pub gap_percent: f64,
    /// 重なり回避方針
    pub policy: PlacementPolicy,
    /// 自動配置の通知を閉じるまでの時間（ミリ秒）
    pub notice_ms: f64,
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self {
            gap_percent: 2.0,
            policy: PlacementPolicy::LastSlot,
            notice_ms: 3000.0,
        }
    }
}

/// イントロ演出の設定
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct IntroConfig {
    /// 無効ならカードは最初から全て表示
    pub enabled: bool,
    /// グリッド背景のフェードイン開始まで（ミリ秒）
    pub grid_fade_in_ms: f64,
    /// ヘッダーのタイピング開始まで（ミリ秒）
    pub header_start_ms: f64,
    /// カードの出現開始まで（ミリ秒）
    pub card_start_ms: f64,
    /// カード同士の出現間隔（ミリ秒）
    pub card_interval_ms: f64,
}

impl Default for IntroConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            grid_fade_in_ms: 500.0,
            header_start_ms: 1000.0,
            card_start_ms: 2000.0,
            card_interval_ms: 300.0,
        }
    }
}

/// 定規の目盛りの設定
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RulerConfig {
    /// 大目盛りの間隔（ピクセル）
    pub major_interval_px: f64,
    /// 大目盛り1つあたりの分割数
    pub segments_per_major: u32,
}

impl Default for RulerConfig {
    fn default() -> Self {
        Self {
            major_interval_px: 150.0,
            segments_per_major: 5,
        }
    }
}
