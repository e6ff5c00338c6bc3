//! 時間ユーティリティモジュール
//! 
//! アニメーションループのフレーム間隔計算と、ポップアップや遷移の遅延に使う
//! タイマーを提供します。時刻はすべて呼び出し側から渡されたミリ秒値を使い、
//! ここでブラウザの時計を直接読むことはありません。

/// フレーム間隔が不正なときに使う既定値（約60FPS）
pub const DEFAULT_FRAME_MS: f64 = 16.0;

/// これを超えるフレーム間隔はタブ復帰などによる飛びとみなす
pub const MAX_FRAME_MS: f64 = 500.0;

/// アニメーションフレームの時刻管理
#[derive(Debug, Clone, Default)]
pub struct FrameClock {
    /// 最後のフレームのタイムスタンプ（ミリ秒）
    last_frame: Option<f64>,
    /// 開始からの経過時間（ミリ秒）
    elapsed: f64,
}

impl FrameClock {
    /// 新しいFrameClockを作成
    pub fn new() -> Self {
        Self::default()
    }

    /// 現在時刻を受け取り、前フレームからの経過時間（ミリ秒）を返す
    /// 
    /// 初回フレーム、NaN、0以下、`MAX_FRAME_MS`超過の場合は `DEFAULT_FRAME_MS` を返します。
    /// 
    /// # 引数
    /// 
    /// * `now_ms` - 現在のタイムスタンプ（ミリ秒）
    pub fn advance(&mut self, now_ms: f64) -> f64 {
        let raw = match self.last_frame {
            Some(last) => now_ms - last,
            None => DEFAULT_FRAME_MS,
        };

        let delta = if raw.is_nan() || raw <= 0.0 || raw > MAX_FRAME_MS {
            DEFAULT_FRAME_MS
        } else {
            raw
        };

        if now_ms.is_finite() {
            self.last_frame = Some(now_ms);
        }
        self.elapsed += delta;
        delta
    }

    /// 開始からの経過時間（ミリ秒）
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }
}

/// 一度きりのタイマー
#[derive(Debug, Clone)]
pub struct Timer {
    /// 残り時間（ミリ秒）
    remaining: f64,
    /// タイマーが完了したかどうか
    completed: bool,
}

impl Timer {
    /// 新しいタイマーを作成
    /// 
    /// # 引数
    /// 
    /// * `duration` - タイマーの持続時間（ミリ秒）。負や非有限値は0として扱います
    pub fn new(duration: f64) -> Self {
        let duration = if duration.is_finite() { duration.max(0.0) } else { 0.0 };
        Self {
            remaining: duration,
            completed: false,
        }
    }

    /// タイマーを更新
    /// 
    /// 非有限値や負の経過時間は無視します。
    /// 
    /// # 戻り値
    /// 
    /// * タイマーが今回の更新で完了したかどうか
    pub fn update(&mut self, delta_ms: f64) -> bool {
        if self.completed || !delta_ms.is_finite() || delta_ms < 0.0 {
            return false;
        }

        self.remaining -= delta_ms;
        if self.remaining <= 0.0 {
            self.remaining = 0.0;
            self.completed = true;
            true
        } else {
            false
        }
    }
}

/// 一度きりの遅延イベントの待ち行列
/// 
/// アンマウント時に `clear` で全て破棄できるよう、保留中のタイマーを一か所で持ちます。
#[derive(Debug, Clone)]
pub struct PendingTimers<E> {
    entries: Vec<(Timer, E)>,
}

impl<E> PendingTimers<E> {
    /// 空の待ち行列を作成
    pub fn new() -> Self {
        Self { entries: Vec::new() }
    }

    /// `delay_ms` 後に `payload` を発火させる
    pub fn schedule(&mut self, delay_ms: f64, payload: E) {
        self.entries.push((Timer::new(delay_ms), payload));
    }

    /// 時間を進め、完了したものを登録順に返す
    /// 
    /// 非有限値や負の経過時間では何も進めません。
    pub fn advance(&mut self, delta_ms: f64) -> Vec<E> {
        if !delta_ms.is_finite() || delta_ms < 0.0 {
            return Vec::new();
        }

        let mut fired = Vec::new();
        let mut pending = Vec::with_capacity(self.entries.len());

        for (mut timer, payload) in self.entries.drain(..) {
            if timer.update(delta_ms) {
                fired.push(payload);
            } else {
                pending.push((timer, payload));
            }
        }

        self.entries = pending;
        fired
    }

    /// 保留中のタイマーを全て破棄
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// 保留中のタイマー数
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<E> Default for PendingTimers<E> {
    fn default() -> Self {
        Self::new()
    }
}
