//! 定規の目盛りレイアウト
//! 
//! 展示エリア左右の縦定規に描く目盛りの位置を計算します。
//! 中央付近の大目盛り間隔の倍数に「0」を置き、上へ 1, 2, …、下へ -1, -2, … と
//! ラベルを振ります。

use std::collections::HashMap;

use serde::Serialize;

use crate::config::{RulerConfig, MAX_RULER_SEGMENTS};

/// 目盛り1本
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RulerTick {
    /// 上端からの位置（パーセント）
    pub y_percent: f64,
    /// 大目盛りのラベル
    pub label: Option<String>,
    /// 大目盛りかどうか
    pub major: bool,
}

/// コンテナの高さから目盛りを計算
/// 
/// 結果は位置の昇順で、小数第3位まで同じ位置の目盛りは1本にまとめます。
/// 高さが0以下なら空です。
pub fn ruler_ticks(container_height_px: f64, config: &RulerConfig) -> Vec<RulerTick> {
    if !container_height_px.is_finite() || container_height_px <= 0.0 {
        return Vec::new();
    }

    if !config.major_interval_px.is_finite() || config.major_interval_px <= 0.0 {
        return Vec::new();
    }

    let height = container_height_px;
    let segments = config.segments_per_major.clamp(1, MAX_RULER_SEGMENTS);
    let minor_px = (config.major_interval_px / f64::from(segments)).max(1.0);
    let zero_px = (height / 2.0 / config.major_interval_px).round() * config.major_interval_px;
    let to_percent = |px: f64| px / height * 100.0;

    let mut ticks = Vec::new();

    let zero_percent = to_percent(zero_px);
    if (0.0..=100.0).contains(&zero_percent) {
        ticks.push(RulerTick {
            y_percent: zero_percent,
            label: Some("0".to_string()),
            major: true,
        });
    }

    // 上方向
    let mut px = zero_px - minor_px;
    let mut count = 1u32;
    let mut label = 1i32;
    while px >= 0.0 {
        let major = count % segments == 0;
        ticks.push(RulerTick {
            y_percent: to_percent(px),
            label: major.then(|| label.to_string()),
            major,
        });
        if major {
            label += 1;
        }
        px -= minor_px;
        count += 1;
    }

    // 下方向
    let mut px = zero_px + minor_px;
    let mut count = 1u32;
    let mut label = -1i32;
    while px <= height {
        let major = count % segments == 0;
        ticks.push(RulerTick {
            y_percent: to_percent(px),
            label: major.then(|| label.to_string()),
            major,
        });
        if major {
            label -= 1;
        }
        px += minor_px;
        count += 1;
    }

    // 同じ位置の目盛りは後から追加したものを残す
    let mut unique: HashMap<String, RulerTick> = HashMap::new();
    for tick in ticks {
        unique.insert(format!("{:.3}", tick.y_percent), tick);
    }
    let mut ticks: Vec<RulerTick> = unique.into_values().collect();
    ticks.sort_by(|a, b| a.y_percent.total_cmp(&b.y_percent));
    ticks
}
