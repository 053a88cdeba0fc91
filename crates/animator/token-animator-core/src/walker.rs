//! Path walker: moves one entity along a resolved path in short micro-steps.
//!
//! Step granularity is a fraction of a grid unit; the speed only affects the
//! duration of each micro-step, which is clamped into a short window so that
//! pause and stop are observed within one step regardless of speed.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::config::Config;
use crate::control::ControlBlock;
use crate::data::Point;
use crate::ids::Generation;
use crate::sink::{Move, PositionSink};

/// Micro-step length and duration derived from config and speed.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StepPlan {
    pub step_distance: f64,
    pub step_duration: Duration,
}

impl StepPlan {
    pub fn new(config: &Config, speed: f64) -> Self {
        let unit = config.grid().unit_size();
        let step_distance = (unit * config.step_fraction).max(config.min_step_distance);
        let speed = if speed.is_finite() && speed > 0.0 {
            speed
        } else {
            config.default_speed
        };
        let ideal_ms = step_distance / (speed * unit) * 1000.0;
        let ms = ideal_ms.clamp(config.min_step_ms as f64, config.max_step_ms as f64);
        Self {
            step_distance,
            step_duration: Duration::from_micros((ms * 1000.0).round() as u64),
        }
    }

    /// Number of micro-steps for the segment `from → to` (at least one).
    pub fn steps_for(&self, from: Point, to: Point) -> usize {
        let steps = (from.distance(to) / self.step_distance).ceil();
        if steps.is_finite() && steps >= 1.0 {
            steps as usize
        } else {
            1
        }
    }
}

/// Interpolated targets at `step / steps` for `step` in `1..=steps`.
pub fn segment_targets(from: Point, to: Point, steps: usize) -> impl Iterator<Item = Point> {
    let steps = steps.max(1);
    (1..=steps).map(move |step| from.lerp(to, step as f64 / steps as f64))
}

/// How a walk ended.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum WalkOutcome {
    /// Every segment was consumed.
    Completed,
    /// Stopped or superseded.
    Aborted,
    /// The host rejected an update; the entity is treated as gone.
    EntityLost,
}

pub struct PathWalker {
    sink: Arc<dyn PositionSink>,
    plan: StepPlan,
}

impl PathWalker {
    pub fn new(sink: Arc<dyn PositionSink>, plan: StepPlan) -> Self {
        Self { sink, plan }
    }

    pub fn plan(&self) -> StepPlan {
        self.plan
    }

    /// Walk `path` on behalf of `block` while it still carries `generation`.
    pub async fn run(&self, block: &ControlBlock, generation: Generation, path: &[Point]) -> WalkOutcome {
        let entity = block.entity();
        let duration = self.plan.step_duration;
        for (segment, pair) in path.windows(2).enumerate() {
            let (from, to) = (pair[0], pair[1]);
            let steps = self.plan.steps_for(from, to);
            trace!(%entity, %generation, segment, steps, "walking segment");

            for target in segment_targets(from, to, steps) {
                if !Self::checkpoint(block, generation).await {
                    debug!(%entity, %generation, segment, "walk aborted");
                    return WalkOutcome::Aborted;
                }
                if let Err(err) = self
                    .sink
                    .update_position(entity, target, Move::animated(duration))
                {
                    debug!(%entity, %generation, error = %err, "position update failed, ending walk");
                    return WalkOutcome::EntityLost;
                }
                if !block.sleep_or_stop(duration).await {
                    debug!(%entity, %generation, segment, "walk interrupted mid-step");
                    return WalkOutcome::Aborted;
                }
            }
        }
        WalkOutcome::Completed
    }

    /// Returns `false` when the run is no longer current. Blocks while paused.
    async fn checkpoint(block: &ControlBlock, generation: Generation) -> bool {
        loop {
            let state = block.snapshot();
            if !state.is_current(generation) {
                return false;
            }
            if !state.paused {
                return true;
            }
            trace!(entity = %block.entity(), %generation, "walker paused");
            block.wait_unpaused().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AnimatorError;
    use crate::ids::EntityId;
    use std::sync::Mutex;

    #[derive(Default)]
    struct VecSink {
        moves: Mutex<Vec<Point>>,
        fail_after: Option<usize>,
    }

    impl PositionSink for VecSink {
        fn update_position(&self, entity: &EntityId, to: Point, _mv: Move) -> Result<(), AnimatorError> {
            let mut moves = self.moves.lock().unwrap();
            if self.fail_after.is_some_and(|n| moves.len() >= n) {
                return Err(AnimatorError::EntityNotFound {
                    entity: entity.clone(),
                });
            }
            moves.push(to);
            Ok(())
        }
    }

    #[test]
    fn default_plan_clamps_duration() {
        let cfg = Config::default();
        let plan = StepPlan::new(&cfg, 4.0);
        assert_eq!(plan.step_distance, 12.5);
        // 12.5 / 400 s = 31.25 ms, clamped to 24 ms.
        assert_eq!(plan.step_duration, Duration::from_millis(24));

        let fast = StepPlan::new(&cfg, 100.0);
        assert_eq!(fast.step_duration, Duration::from_millis(12));
    }

    #[test]
    fn step_distance_has_floor() {
        let cfg = Config {
            grid_size: 8.0,
            ..Config::default()
        };
        assert_eq!(StepPlan::new(&cfg, 4.0).step_distance, 2.0);
    }

    #[test]
    fn steps_cover_segment() {
        let plan = StepPlan::new(&Config::default(), 4.0);
        assert_eq!(plan.steps_for(Point::new(0.0, 0.0), Point::new(100.0, 0.0)), 8);
        assert_eq!(plan.steps_for(Point::new(0.0, 0.0), Point::new(101.0, 0.0)), 9);
        assert_eq!(plan.steps_for(Point::new(5.0, 5.0), Point::new(5.0, 5.0)), 1);
    }

    #[test]
    fn segment_targets_end_on_target() {
        let targets: Vec<_> = segment_targets(Point::new(0.0, 0.0), Point::new(10.0, 0.0), 4).collect();
        assert_eq!(targets.len(), 4);
        assert_eq!(targets[0], Point::new(2.5, 0.0));
        assert_eq!(targets[3], Point::new(10.0, 0.0));
    }

    #[tokio::test(start_paused = true)]
    async fn walks_every_segment_in_order() {
        let sink = Arc::new(VecSink::default());
        let walker = PathWalker::new(sink.clone(), StepPlan::new(&Config::default(), 4.0));
        let block = ControlBlock::new(EntityId::from("t"), Generation(1), None);
        let path = [Point::new(0.0, 0.0), Point::new(25.0, 0.0), Point::new(25.0, 25.0)];

        assert_eq!(walker.run(&block, Generation(1), &path).await, WalkOutcome::Completed);
        let moves = sink.moves.lock().unwrap().clone();
        assert_eq!(
            moves,
            vec![
                Point::new(12.5, 0.0),
                Point::new(25.0, 0.0),
                Point::new(25.0, 12.5),
                Point::new(25.0, 25.0)
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn stale_generation_emits_nothing() {
        let sink = Arc::new(VecSink::default());
        let walker = PathWalker::new(sink.clone(), StepPlan::new(&Config::default(), 4.0));
        let block = ControlBlock::new(EntityId::from("t"), Generation(2), None);
        let path = [Point::new(0.0, 0.0), Point::new(50.0, 0.0)];

        assert_eq!(walker.run(&block, Generation(1), &path).await, WalkOutcome::Aborted);
        assert!(sink.moves.lock().unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn sink_failure_ends_walk() {
        let sink = Arc::new(VecSink {
            fail_after: Some(2),
            ..VecSink::default()
        });
        let walker = PathWalker::new(sink.clone(), StepPlan::new(&Config::default(), 4.0));
        let block = ControlBlock::new(EntityId::from("t"), Generation(1), None);
        let path = [Point::new(0.0, 0.0), Point::new(100.0, 0.0)];

        assert_eq!(walker.run(&block, Generation(1), &path).await, WalkOutcome::EntityLost);
        assert_eq!(sink.moves.lock().unwrap().len(), 2);
    }
}
