//! 運動積分モジュール
//! 
//! 自由状態のカードを速度に従って動かし、コンテナの端で反射させます。

use rand::Rng;

use crate::cards::{CardId, CardStore};
use crate::config::KineticConfig;
use crate::physics::ContainerSize;
use crate::utils::{random_velocity, Vec2};

/// 1ティック分の結果
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickReport {
    /// 積分した自由カードの数
    pub advanced: usize,
    /// 位置か速度が許容誤差を超えて変わったカード
    pub changed: Vec<CardId>,
    /// 壁で反射したカード
    pub bounced: Vec<CardId>,
}

impl TickReport {
    /// 何か変化があったかどうか
    pub fn has_changes(&self) -> bool {
        !self.changed.is_empty()
    }
}

/// 運動積分器
#[derive(Debug, Clone)]
pub struct KineticIntegrator {
    config: KineticConfig,
}

impl KineticIntegrator {
    /// 新しい運動積分器を作成
    pub fn new(config: KineticConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &KineticConfig {
        &self.config
    }

    /// 全カードを `delta_ms` だけ進める
    /// 
    /// ドラッグ中と固定済みのカードは速度を0にするだけで位置は変えません。
    /// コンテナ未測定、または `delta_ms` が負・非有限の場合は何もしません。
    /// 
    /// # 引数
    /// 
    /// * `store` - カードストア
    /// * `delta_ms` - 前ティックからの経過時間（ミリ秒）
    /// * `container` - 現在のコンテナ寸法
    /// * `rng` - 静止カードの速度を再抽選するための乱数生成器
    pub fn step<R: Rng + ?Sized>(
        &self,
        store: &mut CardStore,
        delta_ms: f64,
        container: &ContainerSize,
        rng: &mut R,
    ) -> TickReport {
        let mut report = TickReport::default();

        if !container.is_measured() || !delta_ms.is_finite() || delta_ms < 0.0 {
            log::trace!("integrator skipped: container={:?}, dt={}", container, delta_ms);
            return report;
        }

        for card in store.iter_mut() {
            if !card.is_free() {
                card.velocity = Vec2::ZERO;
                continue;
            }

            let before_position = card.position;
            let before_velocity = card.velocity;

            // ドラッグから放された直後などで静止している場合は再発射
            if card.velocity.is_zero() {
                card.velocity = random_velocity(rng, self.config.min_speed, self.config.max_speed);
            }

            let max = card.max_position(container);
            let mut position = card.position + card.velocity * (self.config.speed_scale * delta_ms);
            let mut velocity = card.velocity;
            let mut bounced = false;

            if position.x <= 0.0 {
                position.x = 0.0;
                velocity.x = velocity.x.abs();
                bounced = true;
            } else if position.x >= max.x {
                position.x = max.x;
                velocity.x = -velocity.x.abs();
                bounced = true;
            }

            if position.y <= 0.0 {
                position.y = 0.0;
                velocity.y = velocity.y.abs();
                bounced = true;
            } else if position.y >= max.y {
                position.y = max.y;
                velocity.y = -velocity.y.abs();
                bounced = true;
            }

            card.position = position;
            card.velocity = velocity;
            report.advanced += 1;

            if bounced {
                report.bounced.push(card.id());
            }
            if !position.approx_eq(before_position) || !velocity.approx_eq(before_velocity) {
                report.changed.push(card.id());
            }
        }

        report
    }
}

impl Default for KineticIntegrator {
    fn default() -> Self {
        Self::new(KineticConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::{CardPayload, CardState, FixSource};
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    const CONTAINER: ContainerSize = ContainerSize::new(1000.0, 800.0);

    fn single_card(position: Vec2, velocity: Vec2) -> (CardStore, CardId) {
        let mut store = CardStore::new();
        let id = store.insert(200.0, 200.0, CardPayload::default());
        let card = store.get_mut(id).unwrap();
        card.position = position;
        card.velocity = velocity;
        (store, id)
    }

    #[test]
    fn test_free_card_moves() {
        let mut rng = SmallRng::seed_from_u64(0);
        let (mut store, id) = single_card(Vec2::new(10.0, 10.0), Vec2::new(0.5, 0.25));
        let report = KineticIntegrator::default().step(&mut store, 16.0, &CONTAINER, &mut rng);

        let card = store.get(id).unwrap();
        assert!((card.position.x - 10.08).abs() < 1e-9);
        assert!((card.position.y - 10.04).abs() < 1e-9);
        assert_eq!(report.advanced, 1);
        assert_eq!(report.changed, vec![id]);
    }

    #[test]
    fn test_reflects_at_right_bound() {
        let mut rng = SmallRng::seed_from_u64(0);
        // 右端（80%）の手前から右向きに進む
        let (mut store, id) = single_card(Vec2::new(79.99, 30.0), Vec2::new(0.5, 0.0));
        let report = KineticIntegrator::default().step(&mut store, 16.0, &CONTAINER, &mut rng);

        let card = store.get(id).unwrap();
        assert!((card.position.x - 80.0).abs() < 1e-9);
        assert_eq!(card.velocity.x, -0.5);
        assert_eq!(card.velocity.y, 0.0);
        assert_eq!(report.bounced, vec![id]);
    }

    #[test]
    fn test_reflects_at_top_bound() {
        let mut rng = SmallRng::seed_from_u64(0);
        let (mut store, id) = single_card(Vec2::new(40.0, 0.05), Vec2::new(0.0, -0.5));
        KineticIntegrator::default().step(&mut store, 16.0, &CONTAINER, &mut rng);

        let card = store.get(id).unwrap();
        assert_eq!(card.position.y, 0.0);
        assert_eq!(card.velocity.y, 0.5);
    }

    #[test]
    fn test_resting_free_card_is_relaunched() {
        let mut rng = SmallRng::seed_from_u64(11);
        let (mut store, id) = single_card(Vec2::new(40.0, 40.0), Vec2::ZERO);
        KineticIntegrator::default().step(&mut store, 16.0, &CONTAINER, &mut rng);

        let speed = store.get(id).unwrap().velocity.length();
        assert!(speed >= 0.4 - 1e-9 && speed <= 0.6 + 1e-9);
    }

    #[test]
    fn test_non_free_cards_pass_through() {
        let mut rng = SmallRng::seed_from_u64(0);
        let (mut store, id) = single_card(Vec2::new(20.0, 20.0), Vec2::new(0.5, 0.5));
        store.set_state(id, CardState::Fixed(FixSource::Dropped)).unwrap();

        for _ in 0..50 {
            let report = KineticIntegrator::default().step(&mut store, 16.0, &CONTAINER, &mut rng);
            assert_eq!(report.advanced, 0);
        }
        let card = store.get(id).unwrap();
        assert_eq!(card.position, Vec2::new(20.0, 20.0));
        assert!(card.velocity.is_zero());
    }

    #[test]
    fn test_unmeasured_container_is_noop() {
        let mut rng = SmallRng::seed_from_u64(0);
        let (mut store, id) = single_card(Vec2::new(20.0, 20.0), Vec2::new(0.5, 0.5));
        let integrator = KineticIntegrator::default();

        let report = integrator.step(&mut store, 16.0, &ContainerSize::new(0.0, 0.0), &mut rng);
        assert_eq!(report, TickReport::default());
        let report = integrator.step(&mut store, f64::NAN, &CONTAINER, &mut rng);
        assert_eq!(report, TickReport::default());
        assert_eq!(store.get(id).unwrap().position, Vec2::new(20.0, 20.0));
    }

    #[test]
    fn test_tiny_motion_not_reported() {
        let mut rng = SmallRng::seed_from_u64(0);
        let (mut store, id) = single_card(Vec2::new(20.0, 20.0), Vec2::new(0.001, 0.0));
        let report = KineticIntegrator::default().step(&mut store, 1.0, &CONTAINER, &mut rng);
        assert_eq!(report.advanced, 1);
        assert!(!report.has_changes());
        assert!(store.get(id).unwrap().position.x > 20.0);
    }

    #[test]
    fn test_containment_over_many_ticks() {
        let mut rng = SmallRng::seed_from_u64(42);
        let mut store = CardStore::new();
        for _ in 0..10 {
            store.insert(200.0, 200.0, CardPayload::default());
        }
        store.scatter(&CONTAINER, &mut rng);
        let integrator = KineticIntegrator::new(KineticConfig {
            min_speed: 5.0,
            max_speed: 8.0,
            speed_scale: 0.05,
        });

        for _ in 0..1000 {
            integrator.step(&mut store, 16.0, &CONTAINER, &mut rng);
            assert!(store.iter().all(|card| card.is_contained(&CONTAINER)));
        }
    }
}
