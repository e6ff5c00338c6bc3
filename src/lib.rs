use wasm_bindgen::prelude::*;
use web_sys::console;

// モジュール宣言
pub mod animation;
pub mod cards;
pub mod config;
pub mod error;
pub mod exhibit;
pub mod input;
pub mod layout;
pub mod physics;
pub mod utils;

use cards::CardId;
use config::ExhibitConfig;
use error::ExhibitResult;
use exhibit::Exhibit;
use physics::ContainerSize;
use utils::{FrameClock, LogLevel, Vec2};

// 初期化用のエントリーポイント
#[wasm_bindgen(start)]
pub fn start() {
    // エラーをコンソールにパニックフックとして表示
    console_error_panic_hook::set_once();

    let level = if cfg!(feature = "debug") {
        LogLevel::Debug
    } else {
        LogLevel::Info
    };
    utils::init_logging(level);
    log::info!("WebAssembly module initialized!");
}

// 現在時刻（ミリ秒）。performance.now() が使えなければ Date.now()
fn now_millis() -> f64 {
    web_sys::window()
        .and_then(|window| window.performance())
        .map(|performance| performance.now())
        .unwrap_or_else(js_sys::Date::now)
}

fn to_json<T: serde::Serialize>(value: &T, fallback: &str) -> String {
    serde_json::to_string(value).unwrap_or_else(|err| {
        log::error!("failed to serialize: {}", err);
        fallback.to_string()
    })
}

// JavaScriptからアクセス可能な展示ハンドル
#[wasm_bindgen]
pub struct ExhibitHandle {
    exhibit: Exhibit,
    clock: FrameClock,
    // 最後にスナップショットを返したときのリビジョンと時刻
    last_snapshot: Option<(u64, f64)>,
}

#[wasm_bindgen]
impl ExhibitHandle {
    /// 新しい展示を作成
    /// 
    /// 設定JSONを省略すると既定値を使います。解析できない場合のみ例外を投げます。
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: Option<String>) -> Result<ExhibitHandle, JsValue> {
        let config = match config_json.as_deref() {
            Some(json) if !json.trim().is_empty() => ExhibitConfig::from_json(json).map_err(|err| {
                log::error!("{}", err);
                JsValue::from_str(&err.to_string())
            })?,
            _ => ExhibitConfig::default(),
        };

        if config.log_level != LogLevel::default() {
            utils::init_logging(config.log_level);
        }

        let exhibit = Exhibit::new(config);
        console::log_1(&format!("Creating exhibit {}", exhibit.id()).into());

        Ok(ExhibitHandle {
            exhibit,
            clock: FrameClock::new(),
            last_snapshot: None,
        })
    }

    #[wasm_bindgen(getter)]
    pub fn id(&self) -> String {
        self.exhibit.id().to_string()
    }

    /// アニメーションを1フレーム進める
    /// 
    /// `false` を返したら次のフレームを予約しないこと。
    pub fn frame(&mut self, now_ms: f64, width: f64, height: f64) -> bool {
        let delta = self.clock.advance(now_ms);
        self.exhibit.tick(delta, ContainerSize::new(width, height))
    }

    /// ブラウザの時計でフレームを進める
    pub fn frame_now(&mut self, width: f64, height: f64) -> bool {
        self.frame(now_millis(), width, height)
    }

    // ポインタダウン
    pub fn pointer_down(&mut self, card_id: u32, x: f64, y: f64, width: f64, height: f64) -> bool {
        let result = self
            .exhibit
            .pointer_down(CardId(card_id), Vec2::new(x, y), ContainerSize::new(width, height));
        self.report("pointer_down", result).is_some()
    }

    // ポインタムーブ
    pub fn pointer_move(&mut self, x: f64, y: f64) -> bool {
        let result = self.exhibit.pointer_move(Vec2::new(x, y));
        self.report("pointer_move", result).unwrap_or(false)
    }

    // ポインタアップ
    pub fn pointer_up(&mut self, width: f64, height: f64) -> bool {
        let result = self.exhibit.pointer_up(ContainerSize::new(width, height));
        self.report("pointer_up", result).is_some()
    }

    /// 物体検出でカードが一致したときの自動配置
    pub fn auto_place(&mut self, card_id: u32, width: f64, height: f64) -> bool {
        let result = self
            .exhibit
            .request_auto_place(CardId(card_id), ContainerSize::new(width, height));
        self.report("auto_place", result).is_some()
    }

    /// 検出ラベルで自動配置
    pub fn auto_place_label(&mut self, label: &str, width: f64, height: f64) -> bool {
        let result = self
            .exhibit
            .request_auto_place_for_label(label, ContainerSize::new(width, height));
        self.report("auto_place_label", result).is_some()
    }

    /// 現在のスナップショット（JSON）
    pub fn snapshot_json(&mut self) -> String {
        self.last_snapshot = Some((self.exhibit.revision(), self.clock.elapsed()));
        to_json(&self.exhibit.snapshot(), "null")
    }

    /// 変更があったか一定時間経過した場合だけスナップショットを返す
    pub fn snapshot_if_due(&mut self) -> Option<String> {
        let interval = self.exhibit.config().snapshot_interval_ms;
        let due = match self.last_snapshot {
            Some((revision, at)) => {
                revision != self.exhibit.revision() || self.clock.elapsed() - at >= interval
            }
            None => true,
        };
        due.then(|| self.snapshot_json())
    }

    /// 溜まったイベント（JSON配列）
    pub fn drain_events_json(&mut self) -> String {
        to_json(&self.exhibit.drain_events(), "[]")
    }

    /// カーソル下のカード（JSON）。該当なしは `undefined`
    pub fn hover_json(&self, x: f64, y: f64, width: f64, height: f64) -> Option<String> {
        self.exhibit
            .hover(Vec2::new(x, y), ContainerSize::new(width, height))
            .map(|details| to_json(&details, "null"))
    }

    /// 定規の目盛り（JSON配列）
    pub fn ruler_ticks_json(&self, height: f64) -> String {
        to_json(&self.exhibit.ruler_ticks(height), "[]")
    }

    /// イントロ演出を次のフェーズへ
    pub fn next_intro_phase(&mut self) -> String {
        to_json(&self.exhibit.start_next_intro_phase(), "null")
    }

    pub fn is_dragging(&self) -> bool {
        self.exhibit.is_dragging()
    }

    pub fn revision(&self) -> f64 {
        self.exhibit.revision() as f64
    }

    // 解放時の処理
    pub fn dispose(&mut self) {
        self.exhibit.teardown();
    }
}

impl ExhibitHandle {
    // エラーはJSへ投げずにログへ記録する
    fn report<T>(&self, operation: &str, result: ExhibitResult<T>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(err) if err.is_benign() => {
                log::debug!("{}: {} ignored: {}", self.exhibit.id(), operation, err);
                None
            }
            Err(err) => {
                log::warn!("{}: {} failed: {}", self.exhibit.id(), operation, err);
                None
            }
        }
    }
}
