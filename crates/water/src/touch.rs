//! Touch input: a thread-safe pending queue and the per-tick coalescer.
//!
//! Input threads push raw [`TouchEvent`]s into a [`TouchQueue`] at whatever
//! rate the platform delivers them. Once per tick the simulation drains the
//! queue and the [`TouchCoalescer`] reduces the batch to at most one
//! [`CoalescedTouch`], so the number of impulses per tick never depends on
//! the input sample rate.

use crate::config::SimConfig;
use glam::Vec2;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

/// One raw touch sample, in view pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TouchEvent {
    pub position: Vec2,
    pub timestamp: Instant,
    /// Normalized pressure, 1.0 for devices without force sensing.
    pub force: f32,
}

/// Cloneable handle to the pending touch queue. Safe to share with input threads.
#[derive(Debug, Clone, Default)]
pub struct TouchQueue {
    pending: Arc<Mutex<Vec<TouchEvent>>>,
}

impl TouchQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an event. Never waits on anything but the short drain critical section.
    pub fn submit(&self, event: TouchEvent) {
        self.lock().push(event);
    }

    /// Takes every pending event, leaving the queue empty.
    ///
    /// The swap happens under the lock, so a concurrent producer's event lands
    /// either in this batch or the next one, never in neither.
    pub fn drain(&self) -> Vec<TouchEvent> {
        std::mem::take(&mut *self.lock())
    }

    /// Number of pending events.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Drops every pending event.
    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<TouchEvent>> {
        // a panicking producer cannot leave a Vec half-pushed; keep going
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Fixed thresholds of the coalescing state machine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoalescerSettings {
    /// Events older than this, relative to the tick time, are dropped.
    pub window: Duration,
    /// Stationary-touch debounce radius in view pixels.
    pub debounce_radius: f32,
    /// Speed (px/s) separating slow circular impulses from fast directional ones.
    pub fast_speed: f32,
}

impl Default for CoalescerSettings {
    fn default() -> Self {
        Self {
            window: Duration::from_millis(16),
            debounce_radius: 5.0,
            fast_speed: 100.0,
        }
    }
}

/// The one impulse a tick's touch batch reduces to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoalescedTouch {
    /// Mean position in view pixels.
    pub position: Vec2,
    pub strength: f32,
    /// Speed since the last processed touch, px/s.
    pub speed: f32,
    /// Unit motion direction for fast (anisotropic) touches, `None` for slow ones.
    pub direction: Option<Vec2>,
}

#[derive(Debug, Clone, Copy)]
struct LastTouch {
    position: Vec2,
    time: Instant,
    speed: f32,
}

/// Guards the speed estimate against two batches sharing a timestamp.
const MIN_ELAPSED_SECS: f32 = 1e-4;

/// Reduces each tick's touch batch to at most one impulse.
#[derive(Debug, Clone, Default)]
pub struct TouchCoalescer {
    settings: CoalescerSettings,
    last: Option<LastTouch>,
}

impl TouchCoalescer {
    pub fn new(settings: CoalescerSettings) -> Self {
        Self {
            settings,
            last: None,
        }
    }

    pub fn settings(&self) -> &CoalescerSettings {
        &self.settings
    }

    /// Speed of the last processed touch, if any.
    pub fn last_speed(&self) -> Option<f32> {
        self.last.map(|l| l.speed)
    }

    /// Forgets the last processed touch.
    pub fn reset(&mut self) {
        self.last = None;
    }

    /// Runs one tick of the coalescing state machine over `events`.
    ///
    /// Returns `None` when every event is stale, when the batch is empty, or
    /// when it is a stationary repeat of the last processed touch.
    pub fn coalesce(
        &mut self,
        events: Vec<TouchEvent>,
        now: Instant,
        config: &SimConfig,
    ) -> Option<CoalescedTouch> {
        let window = self.settings.window;
        let fresh: Vec<TouchEvent> = events
            .into_iter()
            .filter(|e| now.saturating_duration_since(e.timestamp) <= window)
            .collect();
        if fresh.is_empty() {
            return None;
        }

        let n = fresh.len() as f32;
        let mean_position = fresh.iter().map(|e| e.position).sum::<Vec2>() / n;
        let mean_force = fresh.iter().map(|e| e.force).sum::<f32>() / n;
        let batch_time = fresh
            .iter()
            .map(|e| e.timestamp)
            .max()
            .unwrap_or(now);

        let (motion, speed) = match self.last {
            Some(last) => {
                let elapsed = batch_time
                    .saturating_duration_since(last.time)
                    .as_secs_f32()
                    .max(MIN_ELAPSED_SECS);
                let motion = mean_position - last.position;
                (motion, motion.length() / elapsed)
            }
            None => (Vec2::ZERO, 0.0),
        };

        if let Some(last) = self.last {
            let stationary = mean_position.distance(last.position) < self.settings.debounce_radius
                && speed < self.settings.fast_speed;
            if stationary {
                return None;
            }
        }

        let boost = 1.0 + (speed * config.velocity_scale).min(1.0);
        let strength =
            (config.impulse_strength * mean_force * boost).min(config.max_impulse_per_frame);
        let direction = (speed > self.settings.fast_speed)
            .then(|| motion.normalize_or_zero())
            .filter(|d| *d != Vec2::ZERO);

        self.last = Some(LastTouch {
            position: mean_position,
            time: batch_time,
            speed,
        });

        tracing::debug!(
            x = mean_position.x,
            y = mean_position.y,
            strength,
            speed,
            samples = fresh.len(),
            directional = direction.is_some(),
            "coalesced touch batch"
        );

        Some(CoalescedTouch {
            position: mean_position,
            strength,
            speed,
            direction,
        })
    }
}
