use std::path::PathBuf;
use std::process::exit;
use std::sync::atomic::Ordering;
use std::thread;

use clap::{arg, command, value_parser};
use crossbeam_channel::bounded;
use cursive::{event::Key, theme::BaseColor};
use log::LevelFilter;

use chip8_tui::chip::{
    chip8::{
        constants::{CHIP8_DEFAULT_FPS, CHIP8_KEY_MAP, CHIP8_MIN_FPS},
        cursive_display::{layout, pixel_color, CursiveFrontend, TerminalBell, PIXEL_COLORS},
        Chip8,
    },
    event_loop::{Config, EventLoop},
    log_feed::LogFeed,
};

/// Parses the arguments, loads the program and runs it until Esc is pressed
/// or the machine halts.
fn main() {
    let rom_arg = arg!([rom] "The path of the program to run")
        .required(true)
        .value_parser(value_parser!(PathBuf));

    let fps_arg = arg!(-f --fps <FPS> "How many instructions should be executed per second")
        .value_parser(value_parser!(u32).range(CHIP8_MIN_FPS as i64..));

    let color_arg = arg!(-c --color <COLOR> "The color of the pixels")
        .value_parser(PIXEL_COLORS)
        .default_value("green");

    let matches = command!()
        .arg(rom_arg)
        .arg(fps_arg)
        .arg(color_arg)
        .get_matches();

    // clap rejects a missing ROM before we get here
    let rom = matches
        .get_one::<PathBuf>("rom")
        .cloned()
        .unwrap_or_default();
    let fps = matches
        .get_one::<u32>("fps")
        .copied()
        .unwrap_or(CHIP8_DEFAULT_FPS);
    let color = matches
        .get_one::<String>("color")
        .and_then(|name| pixel_color(name))
        .unwrap_or(BaseColor::Green);

    let log_feed = match LogFeed::install(LevelFilter::Info) {
        Ok(log_feed) => log_feed,
        Err(e) => {
            eprintln!("{}", e);
            exit(1);
        }
    };

    // the whole program is read before anything else is set up
    let chip8 = match Chip8::from_file(&rom) {
        Ok(chip8) => chip8,
        Err(e) => {
            eprintln!("{}", e);
            exit(1);
        }
    };

    let mut siv = cursive::default();

    let frontend = CursiveFrontend::new(siv.cb_sink().clone(), log_feed);
    let event_loop = EventLoop::new(chip8, frontend, Config::new(fps));
    let running = event_loop.running();
    let step_gate = event_loop.step_gate();

    let (key_sender, key_receiver) = bounded::<char>(CHIP8_KEY_MAP.len());
    for symbol in CHIP8_KEY_MAP.iter().copied() {
        let sender = key_sender.clone();
        siv.add_global_callback(symbol, move |_s| {
            // a full channel only drops repeated presses
            let _ = sender.try_send(symbol);
        });
    }

    let gate = step_gate.clone();
    siv.add_global_callback('p', move |_s| {
        gate.toggle();
    });

    siv.add_global_callback(Key::Enter, move |_s| {
        step_gate.request_step();
    });

    let quit_flag = running.clone();
    siv.add_global_callback(Key::Esc, move |s| {
        quit_flag.store(false, Ordering::SeqCst);
        s.quit();
    });

    siv.add_layer(layout(color));

    let emulator = thread::spawn(move || event_loop.run(key_receiver, TerminalBell));

    siv.run();

    running.store(false, Ordering::SeqCst);
    match emulator.join() {
        Ok(Ok(_)) => {}
        Ok(Err(e)) => {
            eprintln!("{}", e);
            exit(1);
        }
        Err(_) => {
            eprintln!("The emulator panicked");
            exit(1);
        }
    }
}
