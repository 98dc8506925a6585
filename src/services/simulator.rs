use chrono::{DateTime, Utc};
use rand::{Rng, SeedableRng, rngs::StdRng};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::models::dashboard::{
    DashboardStats, MAX_CROWD_DENSITY, MIN_CROWD_DENSITY, MIN_ONLINE_VOLUNTEERS,
};

/// Default tick period of the live stats.
pub const DEFAULT_TICK_PERIOD: Duration = Duration::from_secs(5);

/// A source of uniform draws in `[0, 1)`.
pub trait RandomSource: Send {
    /// Returns the next draw.
    fn draw_uniform(&mut self) -> f64;
}

/// Random draws from an OS-seeded generator.
pub struct EntropyRandom(StdRng);

impl EntropyRandom {
    /// Seeds from the operating system.
    pub fn new() -> Self {
        Self(StdRng::from_entropy())
    }

    /// Seeds from `seed`, so runs are reproducible.
    pub fn seeded(seed: u64) -> Self {
        Self(StdRng::seed_from_u64(seed))
    }
}

impl Default for EntropyRandom {
    fn default() -> Self {
        Self::new()
    }
}

impl RandomSource for EntropyRandom {
    fn draw_uniform(&mut self) -> f64 {
        self.0.gen_range(0.0..1.0)
    }
}

/// Replays a fixed sequence of draws, wrapping around at the end.
#[derive(Debug, Clone)]
pub struct ScriptedRandom {
    draws: Vec<f64>,
    cursor: usize,
}

impl ScriptedRandom {
    /// Creates a source replaying `draws`. An empty script always yields `0.5`.
    pub fn new(draws: impl Into<Vec<f64>>) -> Self {
        Self {
            draws: draws.into(),
            cursor: 0,
        }
    }
}

impl RandomSource for ScriptedRandom {
    fn draw_uniform(&mut self) -> f64 {
        let Some(draw) = self.draws.get(self.cursor % self.draws.len().max(1)) else {
            return 0.5;
        };
        self.cursor += 1;
        *draw
    }
}

// Non-finite draws count as the midpoint so a bad source cannot break the bounds.
fn draw(random: &mut dyn RandomSource) -> f64 {
    let value = random.draw_uniform();
    if value.is_finite() { value.clamp(0.0, 1.0) } else { 0.5 }
}

/// Computes the next snapshot from `prev`.
///
/// Draws are taken in a fixed order: SOS, volunteers, density. Group and
/// resolved-alert counts are carried over untouched.
pub fn next_stats(
    prev: &DashboardStats,
    random: &mut dyn RandomSource,
    now: DateTime<Utc>,
) -> DashboardStats {
    let active_sos = if draw(random) > 0.7 {
        prev.active_sos.saturating_add(1)
    } else {
        prev.active_sos.saturating_sub(1)
    };

    let online_volunteers = if draw(random) > 0.5 {
        prev.online_volunteers.saturating_add(1)
    } else {
        prev.online_volunteers.saturating_sub(1)
    }
    .max(MIN_ONLINE_VOLUNTEERS);

    let crowd_density = (prev.crowd_density + (draw(random) - 0.5) * 10.0)
        .clamp(MIN_CROWD_DENSITY, MAX_CROWD_DENSITY);

    // lastUpdate must strictly increase even when the clock has not moved.
    let last_update = if now > prev.last_update {
        now
    } else {
        prev.last_update + chrono::Duration::milliseconds(1)
    };

    DashboardStats {
        active_sos,
        total_groups: prev.total_groups,
        online_volunteers,
        resolved_alerts: prev.resolved_alerts,
        crowd_density,
        last_update,
    }
}

/// Drives [`DashboardStats`] on a fixed period.
pub struct LiveStatsSimulator;

impl LiveStatsSimulator {
    /// Starts ticking from `seed` every `period`.
    ///
    /// The first tick fires one full period after the call. Must be called
    /// inside a tokio runtime.
    pub fn initialize(
        seed: DashboardStats,
        period: Duration,
        mut random: Box<dyn RandomSource>,
    ) -> SimulatorHandle {
        let (tx, rx) = watch::channel(seed);
        let cancel = CancellationToken::new();
        let token = cancel.clone();

        let task = tokio::spawn(async move {
            let mut interval = tokio::time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            let mut ticks: u64 = 0;

            loop {
                tokio::select! {
                    biased;
                    _ = token.cancelled() => break,
                    _ = interval.tick() => {
                        let next = next_stats(&tx.borrow(), random.as_mut(), Utc::now());
                        tx.send_replace(next);
                        ticks += 1;
                        tracing::trace!("📊 Stats tick {}", ticks);
                    }
                }
            }

            tracing::debug!("🛑 Stats simulator stopped after {} ticks", ticks);
        });

        tracing::debug!("▶️ Stats simulator started (period {:?})", period);

        SimulatorHandle {
            cancel,
            task: Some(task),
            stats: rx,
        }
    }
}

/// Ownership of a running simulator.
///
/// Dropping the handle stops the ticks; [`SimulatorHandle::dispose`] also
/// waits for the task to exit.
pub struct SimulatorHandle {
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
    stats: watch::Receiver<DashboardStats>,
}

impl SimulatorHandle {
    /// The latest published snapshot; the seed before the first tick.
    pub fn current_state(&self) -> DashboardStats {
        self.stats.borrow().clone()
    }

    /// Returns an observer that sees every snapshot published from now on.
    pub fn subscribe(&self) -> StatsObserver {
        let mut stats = self.stats.clone();
        stats.mark_unchanged();
        StatsObserver { stats }
    }

    /// Stops the simulator and waits until its task has exited.
    pub async fn dispose(mut self) {
        self.cancel.cancel();
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                tracing::warn!("❌ Stats simulator task failed: {}", e);
            }
        }
    }
}

impl Drop for SimulatorHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// Read side of a simulator's published snapshots.
#[derive(Clone)]
pub struct StatsObserver {
    stats: watch::Receiver<DashboardStats>,
}

impl StatsObserver {
    /// The latest snapshot, marking it as seen.
    pub fn latest(&mut self) -> DashboardStats {
        self.stats.borrow_and_update().clone()
    }

    /// Waits for the next snapshot. `None` once the simulator has stopped.
    pub async fn next(&mut self) -> Option<DashboardStats> {
        self.stats.changed().await.ok()?;
        Some(self.stats.borrow_and_update().clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scripted_random_wraps_around() {
        let mut random = ScriptedRandom::new(vec![0.1, 0.9]);
        let draws: Vec<f64> = (0..4).map(|_| random.draw_uniform()).collect();
        assert_eq!(draws, vec![0.1, 0.9, 0.1, 0.9]);
    }

    #[test]
    fn empty_script_yields_midpoint() {
        let mut random = ScriptedRandom::new(Vec::new());
        assert_eq!(random.draw_uniform(), 0.5);
    }

    #[test]
    fn entropy_draws_stay_in_unit_interval() {
        let mut random = EntropyRandom::seeded(7);
        for _ in 0..1_000 {
            let value = random.draw_uniform();
            assert!((0.0..1.0).contains(&value));
        }
    }

    #[test]
    fn non_finite_draw_is_treated_as_midpoint() {
        let prev = DashboardStats::seed(Utc::now());
        let mut random = ScriptedRandom::new(vec![f64::NAN]);
        let next = next_stats(&prev, &mut random, Utc::now());
        assert_eq!(next.crowd_density, prev.crowd_density);
        assert!(next.within_bounds());
    }

    #[test]
    fn last_update_advances_when_clock_stalls() {
        let now = Utc::now();
        let prev = DashboardStats::seed(now);
        let mut random = ScriptedRandom::new(vec![0.5]);
        let next = next_stats(&prev, &mut random, now);
        assert!(next.last_update > prev.last_update);
    }
}
