use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Instant;

use crossbeam_channel::Receiver;
use log::{error, info};

use crate::chip::{
    chip8::{
        constants::{frame_duration, CHIP8_DEFAULT_FPS, CHIP8_MIN_FPS},
        keypad::run_keypad,
        timers::{run_timers, Beeper},
    },
    Chip, CycleError, Snapshot,
};

/// Settings of the event loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    fps: u32,
}

impl Config {
    /// Creates a config running at `fps`, but never slower than 60 FPS.
    pub fn new(fps: u32) -> Self {
        Config {
            fps: fps.max(CHIP8_MIN_FPS),
        }
    }

    /// How many instructions are executed per second. This only affects the
    /// speed of the CPU, the timers always count down at 60Hz.
    pub fn fps(&self) -> u32 {
        self.fps
    }
}

impl Default for Config {
    fn default() -> Self {
        Config::new(CHIP8_DEFAULT_FPS)
    }
}

/// Everything the debugger panel shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Status {
    pub snapshot: Snapshot,
    pub target_fps: u32,

    /// Average frames per second since the start, once a full second passed.
    pub actual_fps: Option<u32>,

    /// Whether the event loop waits for single steps.
    pub paused: bool,
}

/// Receives the output of the event loop. Implementations usually forward
/// everything to a user interface.
pub trait Frontend {
    /// Called with the output pins whenever they changed.
    fn draw(&mut self, pixels: &[bool]);

    /// Called once per frame.
    fn update_status(&mut self, status: &Status);

    /// Called once when the machine halted. The event loop stops right after.
    fn halt(&mut self, error: &CycleError, status: &Status);
}

/// Lets a debugger pause the event loop and advance it one cycle at a time.
#[derive(Debug, Default)]
pub struct StepGate {
    paused: AtomicBool,
    pending_steps: AtomicUsize,
}

impl StepGate {
    pub fn new() -> Self {
        StepGate::default()
    }

    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::SeqCst)
    }

    pub fn pause(&self) {
        self.paused.store(true, Ordering::SeqCst);
    }

    /// Continues running freely and drops steps that were not taken yet.
    pub fn resume(&self) {
        self.paused.store(false, Ordering::SeqCst);
        self.pending_steps.store(0, Ordering::SeqCst);
    }

    /// Pauses or resumes and returns whether the gate is paused now.
    pub fn toggle(&self) -> bool {
        if self.is_paused() {
            self.resume();
            false
        } else {
            self.pause();
            true
        }
    }

    /// Lets exactly one more cycle through while paused.
    pub fn request_step(&self) {
        if self.is_paused() {
            self.pending_steps.fetch_add(1, Ordering::SeqCst);
        }
    }

    /// Asked by the event loop before every cycle. Consumes a requested step
    /// while paused.
    pub fn admit(&self) -> bool {
        if !self.is_paused() {
            return true;
        }
        self.pending_steps
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |steps| {
                steps.checked_sub(1)
            })
            .is_ok()
    }
}

/// Drives a chip at the configured rate next to the timer and keyboard
/// tasks.
pub struct EventLoop<T, F> {
    chip: T,
    frontend: F,
    config: Config,
    running: Arc<AtomicBool>,
    step_gate: Arc<StepGate>,
}

impl<T, F> EventLoop<T, F>
where
    T: Chip,
    F: Frontend,
{
    pub fn new(chip: T, frontend: F, config: Config) -> Self {
        EventLoop {
            chip,
            frontend,
            config,
            running: Arc::new(AtomicBool::new(true)),
            step_gate: Arc::new(StepGate::new()),
        }
    }

    /// The flag all three tasks watch. Clearing it shuts the event loop
    /// down after the current frame.
    pub fn running(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.running)
    }

    pub fn step_gate(&self) -> Arc<StepGate> {
        Arc::clone(&self.step_gate)
    }

    /// Runs until `running` is cleared or the chip halts. Spawns the timer
    /// and keyboard tasks and waits for both of them before returning.
    /// Returns the number of frames run, or the error that halted the chip.
    pub fn run<B>(mut self, keys: Receiver<char>, beeper: B) -> Result<u64, CycleError>
    where
        B: Beeper + 'static,
    {
        let timer_task = {
            let timers = self.chip.timers();
            let running = Arc::clone(&self.running);
            thread::spawn(move || run_timers(timers, beeper, running))
        };
        let keyboard_task = {
            let keypad = self.chip.keypad();
            let running = Arc::clone(&self.running);
            thread::spawn(move || run_keypad(keypad, keys, running))
        };

        info!("Running at {} FPS", self.config.fps);
        let result = self.cycle_loop();

        self.running.store(false, Ordering::SeqCst);
        join_task("timer", timer_task);
        join_task("keyboard", keyboard_task);

        result
    }

    fn cycle_loop(&mut self) -> Result<u64, CycleError> {
        let budget = frame_duration(self.config.fps);
        let start = Instant::now();
        let mut frames: u64 = 0;

        while self.running.load(Ordering::SeqCst) {
            let frame_start = Instant::now();

            if self.step_gate.admit() {
                let result = self.chip.cycle();

                if self.chip.take_redraw() {
                    self.frontend.draw(self.chip.read_output_pins());
                }

                if let Err(e) = result {
                    error!("{}", e);
                    let status = self.status(frames, start);
                    self.frontend.halt(&e, &status);
                    return Err(e);
                }
            }

            let status = self.status(frames, start);
            self.frontend.update_status(&status);

            let elapsed = frame_start.elapsed();
            if elapsed < budget {
                thread::sleep(budget - elapsed);
            }

            frames += 1;
        }

        info!("Stopped after {} frames", frames);
        Ok(frames)
    }

    fn status(&self, frames: u64, start: Instant) -> Status {
        let seconds = start.elapsed().as_secs();
        Status {
            snapshot: self.chip.snapshot(),
            target_fps: self.config.fps,
            actual_fps: if seconds > 0 {
                Some((frames / seconds) as u32)
            } else {
                None
            },
            paused: self.step_gate.is_paused(),
        }
    }
}

fn join_task(name: &str, task: JoinHandle<()>) {
    if task.join().is_err() {
        error!("The {} task panicked", name);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_enforces_minimum_fps() {
        assert_eq!(Config::new(0).fps(), 60);
        assert_eq!(Config::new(30).fps(), 60);
        assert_eq!(Config::new(500).fps(), 500);
        assert_eq!(Config::default().fps(), 120);
    }

    #[test]
    fn test_step_gate() {
        let gate = StepGate::new();
        assert!(gate.admit());

        // steps requested while running are ignored
        gate.request_step();
        assert!(gate.toggle());
        assert!(!gate.admit());

        gate.request_step();
        gate.request_step();
        assert!(gate.admit());
        assert!(gate.admit());
        assert!(!gate.admit());

        gate.request_step();
        assert!(!gate.toggle());
        assert!(gate.admit());
        gate.pause();
        assert!(!gate.admit());
    }
}
