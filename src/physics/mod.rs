//! 物理システムモジュール
//! 
//! カードの運動を担当します。コンテナ（カードが跳ね回る要素）の寸法と、
//! それに対するカードの可動範囲の計算、速度による位置の積分と壁での反射を提供します。

use serde::{Deserialize, Serialize};

use crate::utils::{clamp, percent_to_px, px_to_percent, Vec2};

pub mod integrator;

pub use integrator::{KineticIntegrator, TickReport};

/// 描画側が測定したコンテナのピクセル寸法
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ContainerSize {
    pub width: f64,
    pub height: f64,
}

impl ContainerSize {
    /// 新しいコンテナ寸法を作成
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// レイアウト済み（幅・高さとも正の有限値）かどうか
    pub fn is_measured(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }

    /// ピクセルサイズをコンテナに対するパーセントに変換
    pub fn size_percent(&self, width_px: f64, height_px: f64) -> Vec2 {
        Vec2::new(px_to_percent(width_px, self.width), px_to_percent(height_px, self.height))
    }

    /// 指定サイズの箱が取りうる左上座標の最大値（パーセント）
    /// 
    /// 箱がコンテナより大きい軸では0になります。
    pub fn max_position(&self, width_px: f64, height_px: f64) -> Vec2 {
        let size = self.size_percent(width_px, height_px);
        Vec2::new((100.0 - size.x).max(0.0), (100.0 - size.y).max(0.0))
    }

    /// 左上座標を可動範囲内に収める（NaNの成分は0へ）
    pub fn contain(&self, position: Vec2, width_px: f64, height_px: f64) -> Vec2 {
        let max = self.max_position(width_px, height_px);
        Vec2::new(clamp(position.x, 0.0, max.x), clamp(position.y, 0.0, max.y))
    }

    /// パーセント座標をピクセル座標に変換
    pub fn to_px(&self, percent: Vec2) -> Vec2 {
        Vec2::new(percent_to_px(percent.x, self.width), percent_to_px(percent.y, self.height))
    }

    /// ピクセル座標をパーセント座標に変換
    pub fn to_percent(&self, px: Vec2) -> Vec2 {
        Vec2::new(px_to_percent(px.x, self.width), px_to_percent(px.y, self.height))
    }
}
