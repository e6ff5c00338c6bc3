//! 数学ユーティリティモジュール
//! 
//! カードの位置計算で使う2次元ベクトルと、ピクセル⇔パーセント変換などの
//! 小さな関数をまとめています。

use std::f64::consts::TAU;
use std::ops::{Add, Mul, Sub};

use rand::Rng;
use serde::{Deserialize, Serialize};

/// 変化なしとみなす許容誤差（小数第3位まで）
pub const EPSILON: f64 = 1e-3;

/// 2次元ベクトル
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Vec2 {
    /// ゼロベクトル
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    /// 新しいベクトルを作成
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// 厳密にゼロかどうか
    pub fn is_zero(&self) -> bool {
        self.x == 0.0 && self.y == 0.0
    }

    /// ベクトルの長さ
    pub fn length(&self) -> f64 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    /// 各成分の差がどちらも`EPSILON`以下かどうか
    pub fn approx_eq(&self, other: Vec2) -> bool {
        (self.x - other.x).abs() <= EPSILON && (self.y - other.y).abs() <= EPSILON
    }

    /// 両成分が有限値かどうか
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl Add for Vec2 {
    type Output = Vec2;

    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Vec2 {
    type Output = Vec2;

    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f64> for Vec2 {
    type Output = Vec2;

    fn mul(self, rhs: f64) -> Vec2 {
        Vec2::new(self.x * rhs, self.y * rhs)
    }
}

/// 値を指定された範囲に制限
/// 
/// `max < min`（コンテナより大きいカードなど）や `value` がNaNの場合は `min` を返します。
/// 
/// # 引数
/// 
/// * `value` - 制限する値
/// * `min` - 最小値
/// * `max` - 最大値
pub fn clamp(value: f64, min: f64, max: f64) -> f64 {
    if max < min || value.is_nan() {
        min
    } else {
        value.clamp(min, max)
    }
}

/// ピクセル長をコンテナ長に対するパーセントに変換
pub fn px_to_percent(px: f64, container_px: f64) -> f64 {
    px / container_px * 100.0
}

/// パーセントをピクセル長に変換
pub fn percent_to_px(percent: f64, container_px: f64) -> f64 {
    percent / 100.0 * container_px
}

/// ランダムな角度（ラジアン、0〜2π）
pub fn random_angle<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    rng.gen_range(0.0..TAU)
}

/// ランダムな向きと、`min_speed`〜`max_speed` の大きさを持つ速度を生成
/// 
/// # 引数
/// 
/// * `rng` - 乱数生成器
/// * `min_speed` - 最小の速さ
/// * `max_speed` - 最大の速さ
/// 
/// # 戻り値
/// 
/// * 生成された速度ベクトル
pub fn random_velocity<R: Rng + ?Sized>(rng: &mut R, min_speed: f64, max_speed: f64) -> Vec2 {
    let angle = random_angle(rng);
    let speed = if max_speed > min_speed {
        rng.gen_range(min_speed..=max_speed)
    } else {
        min_speed
    };
    Vec2::new(angle.cos() * speed, angle.sin() * speed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    #[test]
    fn test_clamp_collapses_inverted_range() {
        assert_eq!(clamp(5.0, 0.0, 10.0), 5.0);
        assert_eq!(clamp(-1.0, 0.0, 10.0), 0.0);
        assert_eq!(clamp(42.0, 0.0, 10.0), 10.0);
        assert_eq!(clamp(3.0, 2.0, -4.0), 2.0);
        assert_eq!(clamp(f64::NAN, 0.0, 10.0), 0.0);
    }

    #[test]
    fn test_percent_conversion() {
        assert_eq!(px_to_percent(200.0, 1000.0), 20.0);
        assert_eq!(percent_to_px(25.0, 800.0), 200.0);
    }

    #[test]
    fn test_random_velocity_magnitude() {
        let mut rng = SmallRng::seed_from_u64(7);
        for _ in 0..100 {
            let v = random_velocity(&mut rng, 0.4, 0.6);
            let len = v.length();
            assert!(len >= 0.4 - 1e-9 && len <= 0.6 + 1e-9, "len = {}", len);
        }
    }

    #[test]
    fn test_vec2_ops() {
        let a = Vec2::new(1.0, 2.0);
        let b = Vec2::new(0.5, -1.0);
        assert_eq!(a + b, Vec2::new(1.5, 1.0));
        assert_eq!(a - b, Vec2::new(0.5, 3.0));
        assert_eq!(a * 2.0, Vec2::new(2.0, 4.0));
        assert!(Vec2::ZERO.is_zero());
        assert!(a.approx_eq(Vec2::new(1.0004, 1.9996)));
    }
}
