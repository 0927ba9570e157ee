pub const MIN_SPEED: f64 = 0.1;
pub const MAX_SPEED: f64 = 10.0;
/// Seconds of log released per requested world update when stepping forward.
const UPDATE_STEP_SECS: f64 = 10.0;
/// Headroom given to a map transfer so it is replayed without waiting.
const MAP_SKIP_SECS: f64 = 300.0;

/// A seek in progress.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Skip {
    /// Ends once the replayed time reaches `target`.
    Time { target: f64 },
    /// Ends after `remaining` more world updates.
    StepForward { remaining: u32 },
    /// Replays from the start until `target_count` world updates were seen.
    StepBackward { target_count: u32 },
}

/// Work the clock asks its driver to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockEffect {
    /// Remember the current follow target before seeking.
    SaveFollow,
    /// Restore the remembered follow target.
    RestoreFollow,
    /// Reopen the log at its first entry and rebuild session state.
    Rewind,
}

/// Virtual replay time.
///
/// All times are seconds on the caller's monotonic clock. The anchor `start`
/// is chosen so that `start + delta` tracks `now * speed` while playing;
/// every pause, speed change or seek re-derives it so `delta` never jumps.
#[derive(Debug, Clone)]
pub struct DemoClock {
    start: f64,
    delta: f64,
    speed: f64,
    paused: bool,
    pause_after_skip: bool,
    skip: Option<Skip>,
    skipping_map: bool,
    update_count: u32,
}

impl DemoClock {
    pub fn new(now: f64) -> Self {
        Self {
            start: now,
            delta: 0.0,
            speed: 1.0,
            paused: false,
            pause_after_skip: false,
            skip: None,
            skipping_map: false,
            update_count: 0,
        }
    }

    /// Timestamp of the last replayed entry.
    pub fn delta(&self) -> f64 {
        self.delta
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn skip(&self) -> Option<Skip> {
        self.skip
    }

    pub fn is_skipping_map(&self) -> bool {
        self.skipping_map
    }

    pub fn update_count(&self) -> u32 {
        self.update_count
    }

    fn anchor(&mut self, now: f64) {
        self.start = now * self.speed - self.delta;
    }

    /// Whether entries may be consumed at all.
    pub fn is_running(&self) -> bool {
        !self.paused || self.skip.is_some()
    }

    /// Whether an entry logged at `time` is due.
    pub fn is_due(&self, time: f32, now: f64) -> bool {
        self.start + (time as f64) < now * self.speed
    }

    pub fn entry_read(&mut self, time: f32) {
        self.delta = time as f64;
    }

    /// Grenades replayed in bulk would all explode at once, so every skip
    /// drops them.
    pub fn drops_grenades(&self) -> bool {
        self.skip.is_some()
    }

    pub fn pause(&mut self) {
        self.paused = true;
        self.pause_after_skip = true;
    }

    pub fn unpause(&mut self, now: f64, by_user: bool) {
        self.anchor(now);
        self.paused = false;
        if by_user {
            self.pause_after_skip = false;
        }
    }

    pub fn toggle_pause(&mut self, now: f64) {
        if self.paused {
            self.unpause(now, true);
        } else {
            self.pause();
        }
    }

    /// Returns false and leaves the speed alone when out of range.
    pub fn set_speed(&mut self, speed: f64, now: f64) -> bool {
        if !(MIN_SPEED..=MAX_SPEED).contains(&speed) {
            return false;
        }
        self.speed = speed;
        self.anchor(now);
        true
    }

    pub fn forward(&mut self, secs: u32, now: f64) -> Vec<ClockEffect> {
        if secs == 0 {
            return Vec::new();
        }
        self.seek_forward(self.delta + secs as f64, now)
    }

    pub fn backward(&mut self, secs: u32, now: f64) -> Vec<ClockEffect> {
        if secs == 0 {
            return Vec::new();
        }
        self.seek_backward((self.delta - secs as f64).max(0.0), now)
    }

    /// Jumps to an absolute replay time. Measured against a pending target
    /// so that repeating the same goto does nothing.
    pub fn goto(&mut self, target: u32, now: f64) -> Vec<ClockEffect> {
        let target = target as f64;
        let reference = match self.skip {
            Some(Skip::Time { target }) => target,
            _ => self.delta.floor(),
        };
        if target == reference {
            Vec::new()
        } else if target > self.delta {
            self.seek_forward(target, now)
        } else {
            self.seek_backward(target, now)
        }
    }

    fn seek_forward(&mut self, target: f64, now: f64) -> Vec<ClockEffect> {
        if self.pause_after_skip {
            self.unpause(now, false);
        }
        self.start = now * self.speed - target;
        self.skip = Some(Skip::Time { target });
        vec![ClockEffect::SaveFollow]
    }

    fn seek_backward(&mut self, target: f64, now: f64) -> Vec<ClockEffect> {
        if self.pause_after_skip {
            self.unpause(now, false);
        }
        self.start = now * self.speed - target;
        self.delta = 0.0;
        self.update_count = 0;
        self.skip = Some(Skip::Time { target });
        vec![ClockEffect::SaveFollow, ClockEffect::Rewind]
    }

    /// Steps `count` world updates forward. Only while paused.
    pub fn next_updates(&mut self, count: u32, now: f64) -> Vec<ClockEffect> {
        if !self.paused || count == 0 {
            return Vec::new();
        }
        self.unpause(now, false);
        self.start -= count as f64 * UPDATE_STEP_SECS;
        self.skip = Some(Skip::StepForward { remaining: count });
        vec![ClockEffect::SaveFollow]
    }

    /// Steps `count` world updates back by replaying from the start. Only
    /// while paused; never goes before the first update.
    pub fn prev_updates(&mut self, count: u32, now: f64) -> Vec<ClockEffect> {
        if !self.paused || count == 0 {
            return Vec::new();
        }
        let target_count = self.update_count.saturating_sub(count).max(1);
        self.unpause(now, false);
        self.delta = 0.0;
        self.update_count = 0;
        self.skip = Some(Skip::StepBackward { target_count });
        vec![ClockEffect::SaveFollow, ClockEffect::Rewind]
    }

    /// Ends a time skip once its target was reached. Called before entries
    /// are consumed.
    pub fn finish_time_skip(&mut self, receiving_map: bool) -> Option<ClockEffect> {
        let Some(Skip::Time { target }) = self.skip else {
            return None;
        };
        if self.delta < target {
            return None;
        }
        self.skip = None;
        if receiving_map {
            self.skip_map();
        } else if self.pause_after_skip {
            self.pause();
        }
        Some(ClockEffect::RestoreFollow)
    }

    /// Counts a replayed world update; ends an update step when it is due.
    pub fn world_update(&mut self, now: f64) -> Option<ClockEffect> {
        self.update_count = self.update_count.saturating_add(1);
        let done = match self.skip.as_mut() {
            Some(Skip::StepForward { remaining }) => {
                *remaining = remaining.saturating_sub(1);
                *remaining == 0
            }
            Some(Skip::StepBackward { target_count }) => self.update_count >= *target_count,
            _ => false,
        };
        if !done {
            return None;
        }
        self.skip = None;
        self.anchor(now);
        self.pause();
        Some(ClockEffect::RestoreFollow)
    }

    /// Releases a map transfer's worth of log at once.
    pub fn skip_map(&mut self) {
        if !self.skipping_map && self.skip.is_none() {
            self.start -= MAP_SKIP_SECS;
            self.skipping_map = true;
        }
    }

    /// The replay spectator joined the world.
    pub fn joined(&mut self, now: f64) -> ClockEffect {
        if self.skipping_map && self.skip.is_none() {
            self.anchor(now);
            self.skipping_map = false;
        } else if self.pause_after_skip {
            self.pause();
        }
        ClockEffect::RestoreFollow
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Feeds entries spaced one second apart while they are due.
    fn drain(clock: &mut DemoClock, now: f64) {
        loop {
            let next = clock.delta() as f32 + 1.0;
            if !clock.is_due(next, now) {
                break;
            }
            clock.entry_read(next);
        }
    }

    #[test]
    fn playback_tracks_scaled_time() {
        let mut clock = DemoClock::new(100.0);
        drain(&mut clock, 105.0);
        assert_eq!(clock.delta(), 4.0);
        assert!(clock.set_speed(2.0, 105.0));
        drain(&mut clock, 107.0);
        assert_eq!(clock.delta(), 7.0);
    }

    #[test]
    fn speed_range() {
        let mut clock = DemoClock::new(0.0);
        assert!(!clock.set_speed(0.05, 1.0));
        assert!(!clock.set_speed(10.5, 1.0));
        assert!(clock.set_speed(10.0, 1.0));
        assert_eq!(clock.speed(), 10.0);
    }

    #[test]
    fn pause_stops_and_unpause_resumes_without_jump() {
        let mut clock = DemoClock::new(0.0);
        drain(&mut clock, 3.0);
        assert_eq!(clock.delta(), 2.0);
        clock.toggle_pause(3.0);
        assert!(!clock.is_running());
        clock.toggle_pause(50.0);
        assert!(clock.is_running());
        assert!(!clock.is_due(3.0, 50.0));
        drain(&mut clock, 52.0);
        assert_eq!(clock.delta(), 3.0);
    }

    #[test]
    fn forward_skip_runs_to_target() {
        let mut clock = DemoClock::new(0.0);
        assert_eq!(clock.forward(30, 0.0), vec![ClockEffect::SaveFollow]);
        assert!(clock.drops_grenades());
        drain(&mut clock, 0.0);
        assert_eq!(clock.delta(), 29.0);
        assert_eq!(clock.finish_time_skip(false), None);
        drain(&mut clock, 1.0);
        assert_eq!(clock.delta(), 30.0);
        assert_eq!(clock.finish_time_skip(false), Some(ClockEffect::RestoreFollow));
        assert_eq!(clock.skip(), None);
    }

    #[test]
    fn skip_started_while_paused_pauses_again() {
        let mut clock = DemoClock::new(0.0);
        clock.pause();
        clock.forward(10, 5.0);
        assert!(!clock.is_paused());
        drain(&mut clock, 6.0);
        assert_eq!(clock.delta(), 10.0);
        clock.finish_time_skip(false);
        assert!(clock.is_paused());
    }

    #[test]
    fn skip_ending_during_map_transfer_rearms_map_skip() {
        let mut clock = DemoClock::new(0.0);
        clock.forward(2, 0.0);
        drain(&mut clock, 1.0);
        clock.finish_time_skip(true);
        assert!(clock.is_skipping_map());
    }

    #[test]
    fn backward_rewinds_and_clamps() {
        let mut clock = DemoClock::new(0.0);
        drain(&mut clock, 20.0);
        let effects = clock.backward(50, 20.0);
        assert_eq!(effects, vec![ClockEffect::SaveFollow, ClockEffect::Rewind]);
        assert_eq!(clock.delta(), 0.0);
        assert_eq!(clock.skip(), Some(Skip::Time { target: 0.0 }));
    }

    #[test]
    fn repeated_goto_is_idempotent() {
        let mut clock = DemoClock::new(0.0);
        drain(&mut clock, 10.0);
        assert!(!clock.goto(60, 10.0).is_empty());
        assert!(clock.goto(60, 10.0).is_empty());
        assert!(clock.goto(5, 10.0).contains(&ClockEffect::Rewind));
        assert!(clock.goto(5, 10.0).is_empty());
    }

    #[test]
    fn goto_current_second_is_noop() {
        let mut clock = DemoClock::new(0.0);
        clock.entry_read(12.7);
        assert!(clock.goto(12, 20.0).is_empty());
    }

    #[test]
    fn update_steps_only_while_paused() {
        let mut clock = DemoClock::new(0.0);
        assert!(clock.next_updates(3, 0.0).is_empty());
        clock.pause();
        assert_eq!(clock.next_updates(3, 0.0), vec![ClockEffect::SaveFollow]);
        assert!(clock.is_running());
        assert!(clock.drops_grenades());
        assert!(clock.is_due(29.0, 0.0));
        assert_eq!(clock.world_update(1.0), None);
        assert_eq!(clock.world_update(1.0), None);
        assert_eq!(clock.world_update(1.0), Some(ClockEffect::RestoreFollow));
        assert!(clock.is_paused());
        assert!(!clock.is_running());
        assert!(!clock.drops_grenades());
    }

    #[test]
    fn prev_updates_target_is_at_least_one() {
        let mut clock = DemoClock::new(0.0);
        for _ in 0..3 {
            clock.world_update(0.0);
        }
        clock.pause();
        clock.prev_updates(10, 0.0);
        assert_eq!(clock.skip(), Some(Skip::StepBackward { target_count: 1 }));
        assert_eq!(clock.update_count(), 0);
        assert_eq!(clock.world_update(0.0), Some(ClockEffect::RestoreFollow));
    }

    #[test]
    fn map_skip_is_released_on_join() {
        let mut clock = DemoClock::new(0.0);
        clock.skip_map();
        assert!(clock.is_skipping_map());
        assert!(clock.is_due(4.0, 0.0));
        clock.entry_read(4.0);
        assert_eq!(clock.joined(10.0), ClockEffect::RestoreFollow);
        assert!(!clock.is_skipping_map());
        assert!(!clock.is_due(5.0, 10.0));
    }
}
