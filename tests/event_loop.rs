use std::sync::atomic::Ordering;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use crossbeam_channel::{unbounded, Sender};

use chip8_tui::chip::{
    chip8::{timers::Mute, Chip8},
    event_loop::{Config, EventLoop, Frontend, Status},
    CycleError,
};

#[derive(Default)]
struct Recording {
    frames: Vec<Vec<bool>>,
    statuses: Vec<Status>,
    halts: Vec<CycleError>,
}

#[derive(Clone, Default)]
struct RecordingFrontend(Arc<Mutex<Recording>>);

impl RecordingFrontend {
    fn last_status(&self) -> Status {
        self.0.lock().unwrap().statuses.last().cloned().unwrap()
    }
}

impl Frontend for RecordingFrontend {
    fn draw(&mut self, pixels: &[bool]) {
        self.0.lock().unwrap().frames.push(pixels.to_vec());
    }

    fn update_status(&mut self, status: &Status) {
        self.0.lock().unwrap().statuses.push(status.clone());
    }

    fn halt(&mut self, error: &CycleError, status: &Status) {
        let mut recording = self.0.lock().unwrap();
        recording.halts.push(*error);
        recording.statuses.push(status.clone());
    }
}

fn program(instructions: &[u16]) -> Chip8 {
    let bytes: Vec<u8> = instructions
        .iter()
        .flat_map(|instruction| instruction.to_be_bytes().to_vec())
        .collect();
    Chip8::from_program(&bytes).unwrap().with_seed(8)
}

/// Runs `chip8` on its own thread for `duration`, then stops it.
fn run_for(
    chip8: Chip8,
    duration: Duration,
    before_run: impl FnOnce(&EventLoop<Chip8, RecordingFrontend>, &Sender<char>),
) -> (Result<u64, CycleError>, RecordingFrontend) {
    let frontend = RecordingFrontend::default();
    let event_loop = EventLoop::new(chip8, frontend.clone(), Config::default());
    let running = event_loop.running();
    let (keys, key_receiver) = unbounded();

    before_run(&event_loop, &keys);
    let task = thread::spawn(move || event_loop.run(key_receiver, Mute));

    thread::sleep(duration);
    running.store(false, Ordering::SeqCst);
    (task.join().unwrap(), frontend)
}

#[test]
fn test_tight_loop_stays_in_place() {
    let chip8 = program(&[0x6000, 0x1200]);
    let (result, frontend) = run_for(chip8, Duration::from_millis(300), |_, _| {});

    assert!(result.unwrap() > 0);
    let recording = frontend.0.lock().unwrap();
    assert!(recording.halts.is_empty());
    for status in recording.statuses.iter() {
        let pc = status.snapshot.program_counter;
        assert!((0x200..0x204).contains(&pc), "pc escaped to 0x{:03X}", pc);
    }
}

#[test]
fn test_slow_config_runs_at_minimum_fps() {
    let chip8 = program(&[0x1200]);
    let frontend = RecordingFrontend::default();
    let event_loop = EventLoop::new(chip8, frontend.clone(), Config::new(0));
    let running = event_loop.running();
    let (_keys, key_receiver) = unbounded::<char>();

    let task = thread::spawn(move || event_loop.run(key_receiver, Mute));
    thread::sleep(Duration::from_millis(100));
    running.store(false, Ordering::SeqCst);

    assert!(task.join().unwrap().is_ok());
    assert_eq!(frontend.last_status().target_fps, 60);
}

#[test]
fn test_unknown_opcode_halts() {
    let chip8 = program(&[0x6005, 0x0001]);
    let frontend = RecordingFrontend::default();
    let event_loop = EventLoop::new(chip8, frontend.clone(), Config::default());
    let (_keys, key_receiver) = unbounded::<char>();

    let result = event_loop.run(key_receiver, Mute);

    assert_eq!(result, Err(CycleError::UnknownOpcode(0x0001)));
    let recording = frontend.0.lock().unwrap();
    assert_eq!(recording.halts, vec![CycleError::UnknownOpcode(0x0001)]);
    let status = recording.statuses.last().unwrap();
    assert_eq!(status.snapshot.registers[0], 5);
    assert_eq!(status.snapshot.program_counter, 0x202);
}

#[test]
fn test_step_gate_advances_one_cycle() {
    let chip8 = program(&[0x6001, 0x7001, 0x7001, 0x1206]);
    let frontend = RecordingFrontend::default();
    let event_loop = EventLoop::new(chip8, frontend.clone(), Config::default());
    let running = event_loop.running();
    let step_gate = event_loop.step_gate();
    let (_keys, key_receiver) = unbounded::<char>();

    step_gate.pause();
    let task = thread::spawn(move || event_loop.run(key_receiver, Mute));

    thread::sleep(Duration::from_millis(100));
    let status = frontend.last_status();
    assert!(status.paused);
    assert_eq!(status.snapshot.program_counter, 0x200);

    step_gate.request_step();
    thread::sleep(Duration::from_millis(100));
    let status = frontend.last_status();
    assert_eq!(status.snapshot.program_counter, 0x202);
    assert_eq!(status.snapshot.registers[0], 1);

    step_gate.resume();
    thread::sleep(Duration::from_millis(100));
    let status = frontend.last_status();
    assert_eq!(status.snapshot.program_counter, 0x206);
    assert_eq!(status.snapshot.registers[0], 3);

    running.store(false, Ordering::SeqCst);
    assert!(task.join().unwrap().is_ok());
}

#[test]
fn test_draw_reaches_frontend() {
    // draws the zero glyph in the top left corner
    let chip8 = program(&[0xA000, 0xD005, 0x1204]);
    let (result, frontend) = run_for(chip8, Duration::from_millis(200), |_, _| {});

    assert!(result.is_ok());
    let recording = frontend.0.lock().unwrap();
    assert_eq!(recording.frames.len(), 1);
    let pixels = &recording.frames[0];
    assert_eq!(pixels.len(), 64 * 32);
    assert_eq!(pixels[..5], [true, true, true, true, false]);
    assert_eq!(pixels[64..69], [true, false, false, true, false]);
}

#[test]
fn test_key_press_reaches_program() {
    // waits for a key and stores it in V0
    let chip8 = program(&[0xF00A, 0x1202]);
    let (result, frontend) = run_for(chip8, Duration::from_millis(300), |_, keys| {
        keys.send('w').unwrap();
    });

    assert!(result.is_ok());
    let status = frontend.last_status();
    assert_eq!(status.snapshot.registers[0], 0x5);
    assert_eq!(status.snapshot.program_counter, 0x202);
}

#[test]
fn test_timers_count_down_while_running() {
    let chip8 = program(&[0x6014, 0xF015, 0x1204]);
    let (result, frontend) = run_for(chip8, Duration::from_millis(600), |_, _| {});

    assert!(result.is_ok());
    assert_eq!(frontend.last_status().snapshot.delay_timer, 0);
}
