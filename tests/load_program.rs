use std::fs;
use std::path::PathBuf;
use std::process::Command;

use chip8_tui::chip::{chip8::Chip8, Chip, LoadProgramError};

fn rom_file(name: &str, bytes: &[u8]) -> PathBuf {
    let path = std::env::temp_dir().join(format!("chip8-tui-{}-{}.ch8", name, std::process::id()));
    fs::write(&path, bytes).unwrap();
    path
}

#[test]
fn test_load_program_from_file() {
    let path = rom_file("valid", &[0x60, 0x2A, 0x12, 0x02]);
    let mut chip8 = Chip8::from_file(&path).unwrap();
    fs::remove_file(&path).unwrap();

    chip8.cycle().unwrap();
    let snapshot = chip8.snapshot();
    assert_eq!(snapshot.registers[0], 0x2A);
    assert_eq!(snapshot.program_counter, 0x202);
    assert_eq!(snapshot.opcode, 0x602A);
}

#[test]
fn test_load_short_program_fails() {
    let path = rom_file("short", &[0x60]);
    let result = Chip8::from_file(&path);
    fs::remove_file(&path).unwrap();

    match result {
        Err(LoadProgramError::ProgramTooShort(1)) => {}
        Err(e) => panic!("unexpected error {}", e),
        Ok(_) => panic!("a single byte was accepted as a program"),
    }
}

#[test]
fn test_load_missing_program_fails() {
    let path = std::env::temp_dir().join("chip8-tui-does-not-exist.ch8");
    match Chip8::from_file(&path) {
        Err(LoadProgramError::CouldNotOpenFile { path: error_path, .. }) => {
            assert_eq!(error_path, path)
        }
        Err(e) => panic!("unexpected error {}", e),
        Ok(_) => panic!("a missing file was accepted as a program"),
    }
}

#[test]
fn test_cli_rejects_short_program() {
    let path = rom_file("cli-short", &[0x00]);
    let output = Command::new(env!("CARGO_BIN_EXE_emulator_text_ui"))
        .arg(&path)
        .output()
        .unwrap();
    fs::remove_file(&path).unwrap();

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Invalid ROM"));
}

#[test]
fn test_cli_rejects_slow_fps() {
    let path = rom_file("cli-fps", &[0x12, 0x00]);
    let status = Command::new(env!("CARGO_BIN_EXE_emulator_text_ui"))
        .args(&["-f", "30"])
        .arg(&path)
        .status()
        .unwrap();
    fs::remove_file(&path).unwrap();

    assert!(!status.success());
}

#[test]
fn test_cli_rejects_unknown_color() {
    let path = rom_file("cli-color", &[0x12, 0x00]);
    let status = Command::new(env!("CARGO_BIN_EXE_emulator_text_ui"))
        .args(&["-c", "purple"])
        .arg(&path)
        .status()
        .unwrap();
    fs::remove_file(&path).unwrap();

    assert!(!status.success());
}
