use std::io::{self, Write};

use cursive::{
    direction::Direction,
    event::{Event, EventResult},
    theme::{BaseColor, Color, ColorStyle},
    view::{CannotFocus, Nameable, View},
    views::{Dialog, LinearLayout, Panel, TextView},
    CbSink, Cursive, Printer, Vec2,
};
use log::debug;

use crate::chip::{
    chip8::{
        constants::{CHIP8_SCREEN_HEIGHT, CHIP8_SCREEN_WIDTH},
        opcodes::describe,
        timers::Beeper,
    },
    event_loop::{Frontend, Status},
    log_feed::LogFeed,
    CycleError,
};

const GAME_VIEW: &str = "game";
const DEBUGGER_VIEW: &str = "debugger";
const LOG_VIEW: &str = "log";

const PIXEL_COUNT: usize = CHIP8_SCREEN_WIDTH * CHIP8_SCREEN_HEIGHT;

/// The colors lit pixels can be drawn in, by name.
pub const PIXEL_COLORS: [&str; 7] = ["red", "green", "blue", "yellow", "magenta", "cyan", "white"];

/// Looks up one of the `PIXEL_COLORS` by name.
pub fn pixel_color(name: &str) -> Option<BaseColor> {
    match name {
        "red" => Some(BaseColor::Red),
        "green" => Some(BaseColor::Green),
        "blue" => Some(BaseColor::Blue),
        "yellow" => Some(BaseColor::Yellow),
        "magenta" => Some(BaseColor::Magenta),
        "cyan" => Some(BaseColor::Cyan),
        "white" => Some(BaseColor::White),
        _ => None,
    }
}

/// Represents the display of the CHIP-8, one terminal cell per pixel.
pub struct Display {
    pixels: [bool; PIXEL_COUNT],
    color: BaseColor,
}

impl Display {
    /// Creates a blank display drawing lit pixels in `color`.
    pub fn new(color: BaseColor) -> Self {
        Display {
            pixels: [false; PIXEL_COUNT],
            color,
        }
    }

    /// Copies the output pins of the chip.
    pub fn set_pixels(&mut self, pixels: &[bool]) {
        assert_eq!(pixels.len(), PIXEL_COUNT);
        self.pixels.copy_from_slice(pixels);
    }
}

/// Implements cursive::view::View for Display to enable drawing it
/// as a View out of the box.
impl View for Display {
    fn draw(&self, printer: &Printer) {
        printer.with_color(
            ColorStyle::new(Color::Dark(BaseColor::Black), Color::Dark(self.color)),
            |printer| {
                for x in 0..CHIP8_SCREEN_WIDTH {
                    for y in 0..CHIP8_SCREEN_HEIGHT {
                        if self.pixels[x + CHIP8_SCREEN_WIDTH * y] {
                            printer.print((x, y), " ");
                        }
                    }
                }
            },
        );
    }

    fn take_focus(&mut self, _: Direction) -> Result<EventResult, CannotFocus> {
        Ok(EventResult::Consumed(None))
    }

    fn on_event(&mut self, _event: Event) -> EventResult {
        EventResult::Ignored
    }

    fn required_size(&mut self, _: Vec2) -> Vec2 {
        Vec2 {
            x: CHIP8_SCREEN_WIDTH,
            y: CHIP8_SCREEN_HEIGHT,
        }
    }
}

/// Builds the game, debugger and log panels.
pub fn layout(color: BaseColor) -> LinearLayout {
    LinearLayout::horizontal()
        .child(
            LinearLayout::vertical()
                .child(Panel::new(Display::new(color).with_name(GAME_VIEW)).title("CHIP-8"))
                .child(Panel::new(TextView::new("").with_name(LOG_VIEW)).title("Log")),
        )
        .child(Panel::new(TextView::new("").with_name(DEBUGGER_VIEW)).title("Debugger"))
}

/// Renders the machine state for the debugger panel.
pub fn format_status(status: &Status) -> String {
    let snapshot = &status.snapshot;
    let mut lines = vec![
        format!(
            "PC: 0x{:03X}  I: 0x{:03X}",
            snapshot.program_counter, snapshot.index
        ),
        format!("0x{:04X}: {}", snapshot.opcode, describe(snapshot.opcode)),
        String::new(),
    ];

    for (row, values) in snapshot.registers.chunks(4).enumerate() {
        let cells: Vec<String> = values
            .iter()
            .enumerate()
            .map(|(i, value)| format!("V{:X}: {:02X}", row * 4 + i, value))
            .collect();
        lines.push(cells.join("  "));
    }
    lines.push(String::new());

    lines.push(format!(
        "DT: {:02X}  ST: {:02X}",
        snapshot.delay_timer, snapshot.sound_timer
    ));
    let stack: Vec<String> = snapshot.stack[..snapshot.stack_pointer as usize]
        .iter()
        .map(|address| format!("{:03X}", address))
        .collect();
    lines.push(format!("Stack: [{}]", stack.join(" ")));
    lines.push(String::new());

    lines.push(match status.actual_fps {
        Some(fps) => format!("FPS: {} / {}", fps, status.target_fps),
        None => format!("FPS: - / {}", status.target_fps),
    });
    lines.push(if status.paused {
        "Paused. Press enter to step, p to resume".to_string()
    } else {
        "Press p to pause, Esc to quit".to_string()
    });

    lines.join("\n")
}

/// Forwards the output of the event loop to the cursive views through the
/// callback sink, as the views belong to the UI thread.
pub struct CursiveFrontend {
    sink: CbSink,
    log_feed: &'static LogFeed,
    last_status: Option<Status>,
}

impl CursiveFrontend {
    pub fn new(sink: CbSink, log_feed: &'static LogFeed) -> Self {
        CursiveFrontend {
            sink,
            log_feed,
            last_status: None,
        }
    }

    fn send<F>(&self, callback: F)
    where
        F: FnOnce(&mut Cursive) + Send + 'static,
    {
        if self.sink.send(Box::new(callback)).is_err() {
            debug!("The user interface is gone");
        }
    }

    fn update_log(&self) {
        if !self.log_feed.take_dirty() {
            return;
        }
        let text = self.log_feed.lines().join("\n");
        self.send(move |s| {
            s.call_on_name(LOG_VIEW, |view: &mut TextView| view.set_content(text));
        });
    }
}

impl Frontend for CursiveFrontend {
    fn draw(&mut self, pixels: &[bool]) {
        let pixels = pixels.to_vec();
        self.send(move |s| {
            s.call_on_name(GAME_VIEW, |view: &mut Display| view.set_pixels(&pixels));
        });
    }

    fn update_status(&mut self, status: &Status) {
        self.update_log();
        if self.last_status.as_ref() == Some(status) {
            return;
        }
        self.last_status = Some(status.clone());

        let text = format_status(status);
        self.send(move |s| {
            s.call_on_name(DEBUGGER_VIEW, |view: &mut TextView| view.set_content(text));
        });
    }

    fn halt(&mut self, error: &CycleError, status: &Status) {
        self.update_log();
        let text = format_status(status);
        let message = format!("{}\n\nThe machine halted.", error);
        self.send(move |s| {
            s.call_on_name(DEBUGGER_VIEW, |view: &mut TextView| view.set_content(text));
            s.add_layer(
                Dialog::around(TextView::new(message))
                    .title("Error")
                    .button("Quit", |s| s.quit()),
            );
        });
    }
}

/// Rings the terminal bell.
pub struct TerminalBell;

impl Beeper for TerminalBell {
    fn beep(&mut self) {
        let mut stdout = io::stdout();
        if let Err(e) = stdout.write_all(b"\x07").and_then(|_| stdout.flush()) {
            debug!("Could not ring the bell: {}", e);
        }
    }
}
