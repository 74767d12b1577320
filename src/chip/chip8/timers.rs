use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Instant;

use log::debug;

use crate::chip::chip8::constants::{frame_duration, CHIP8_TIMER_FREQUENCY};

/// Something that can make a short noise. The timer task calls `beep` once
/// every time the sound timer runs out.
pub trait Beeper: Send {
    fn beep(&mut self);
}

/// A beeper that stays silent.
pub struct Mute;

impl Beeper for Mute {
    fn beep(&mut self) {}
}

/// The delay and sound timers. Both are shared between the interpreter and
/// the timer task, each behind its own lock so that the interpreter reading
/// the delay timer never waits on the sound timer.
#[derive(Default)]
pub struct Timers {
    delay: RwLock<u8>,
    sound: RwLock<u8>,
}

impl Timers {
    pub fn new() -> Self {
        Timers::default()
    }

    pub fn delay(&self) -> u8 {
        *self.delay.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn set_delay(&self, value: u8) {
        *self.delay.write().unwrap_or_else(PoisonError::into_inner) = value;
    }

    pub fn sound(&self) -> u8 {
        *self.sound.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn set_sound(&self, value: u8) {
        *self.sound.write().unwrap_or_else(PoisonError::into_inner) = value;
    }

    /// Counts both timers down by one, stopping at zero. Returns true if the
    /// sound timer ran out on this tick.
    pub fn tick(&self) -> bool {
        {
            let mut delay = self.delay.write().unwrap_or_else(PoisonError::into_inner);
            if *delay > 0 {
                *delay -= 1;
            }
        }

        let mut sound = self.sound.write().unwrap_or_else(PoisonError::into_inner);
        if *sound > 0 {
            *sound -= 1;
            return *sound == 0;
        }
        false
    }
}

/// The timer task. Ticks at 60Hz until `running` is cleared, beeping through
/// `beeper` whenever the sound timer runs out. The lock on the sound timer is
/// released before beeping.
pub fn run_timers<B: Beeper>(timers: Arc<Timers>, mut beeper: B, running: Arc<AtomicBool>) {
    let budget = frame_duration(CHIP8_TIMER_FREQUENCY);
    debug!("Timer task started");

    while running.load(Ordering::SeqCst) {
        let frame_start = Instant::now();

        if timers.tick() {
            beeper.beep();
        }

        let elapsed = frame_start.elapsed();
        if elapsed < budget {
            std::thread::sleep(budget - elapsed);
        }
    }

    debug!("Timer task stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    struct CountingBeeper(Arc<AtomicUsize>);

    impl Beeper for CountingBeeper {
        fn beep(&mut self) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn test_tick_stops_at_zero() {
        let timers = Timers::new();
        timers.set_delay(2);
        timers.tick();
        timers.tick();
        timers.tick();
        assert_eq!(timers.delay(), 0);
        assert_eq!(timers.sound(), 0);
    }

    #[test]
    fn test_tick_reports_sound_running_out_once() {
        let timers = Timers::new();
        timers.set_sound(2);
        assert!(!timers.tick());
        assert!(timers.tick());
        assert!(!timers.tick());
        assert!(!timers.tick());
    }

    #[test]
    fn test_delay_timer_runs_down_in_two_seconds() {
        let timers = Arc::new(Timers::new());
        let running = Arc::new(AtomicBool::new(true));
        timers.set_delay(120);

        let handle = {
            let timers = Arc::clone(&timers);
            let running = Arc::clone(&running);
            std::thread::spawn(move || run_timers(timers, Mute, running))
        };

        std::thread::sleep(Duration::from_millis(2500));
        assert_eq!(timers.delay(), 0);

        running.store(false, Ordering::SeqCst);
        handle.join().unwrap();
        assert_eq!(timers.delay(), 0);
    }

    #[test]
    fn test_timer_task_beeps_once() {
        let timers = Arc::new(Timers::new());
        let running = Arc::new(AtomicBool::new(true));
        let beeps = Arc::new(AtomicUsize::new(0));
        timers.set_sound(3);

        let handle = {
            let timers = Arc::clone(&timers);
            let running = Arc::clone(&running);
            let beeper = CountingBeeper(Arc::clone(&beeps));
            std::thread::spawn(move || run_timers(timers, beeper, running))
        };

        std::thread::sleep(Duration::from_millis(300));
        running.store(false, Ordering::SeqCst);
        handle.join().unwrap();

        assert_eq!(timers.sound(), 0);
        assert_eq!(beeps.load(Ordering::SeqCst), 1);
    }
}
