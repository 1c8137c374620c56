use std::io;

use chip8::prelude::*;

#[rustfmt::skip]
const MAZE: &[u8] = &[
    0x60, 0x00, 0x61, 0x00, 0xA2, 0x22, 0xC2, 0x01,
    0x32, 0x01, 0xA2, 0x1E, 0xD0, 0x14, 0x70, 0x04,
    0x30, 0x40, 0x12, 0x04, 0x60, 0x00, 0x71, 0x04,
    0x31, 0x20, 0x12, 0x04, 0x12, 0x1C, 0x80, 0x40,
    0x20, 0x10, 0x20, 0x40, 0x80, 0x10,
];

/// Devices that record every interaction with the VM.
struct Recorder {
    keys: [bool; 16],
    frames: usize,
    frame_limit: usize,
    draws: usize,
    beeps: usize,
    last_frame: Option<String>,
}

impl Recorder {
    fn new(frame_limit: usize) -> Self {
        Self {
            keys: [false; 16],
            frames: 0,
            frame_limit,
            draws: 0,
            beeps: 0,
            last_frame: None,
        }
    }
}

impl Devices for Recorder {
    fn poll_input(&mut self) -> Input {
        if self.frames >= self.frame_limit {
            return Input::Quit;
        }
        self.frames += 1;
        Input::Keys(self.keys)
    }

    fn draw(&mut self, display: &DisplayBuffer) {
        self.draws += 1;
        let lit = display.pixels().iter().filter(|px| **px).count();
        self.last_frame = Some(format!("{lit} pixels"));
    }

    fn beep(&mut self) {
        self.beeps += 1;
    }
}

#[test]
fn test_maze() {
    let mut vm = Chip8Vm::new(Chip8Conf {
        seed: Some(7),
        ..Default::default()
    });
    vm.load_bytecode(MAZE).unwrap();

    let mut devices = Recorder::new(100);
    vm.execute(&mut devices).unwrap();

    // 16 columns by 8 rows of diagonal line sprites.
    assert_eq!(devices.draws, 128);
    assert_eq!(devices.frames, 100);
    assert_eq!(devices.last_frame.as_deref(), Some("512 pixels"));
    assert_eq!(devices.beeps, 0);

    let cpu = vm.cpu();
    assert_eq!(cpu.pc(), 0x21C);
    assert_eq!(cpu.registers()[0], 0x00);
    assert_eq!(cpu.registers()[1], 0x20);
    assert_eq!(cpu.registers()[0xF], 0);

    let lit = vm.display_buffer().pixels().iter().filter(|px| **px).count();
    assert_eq!(lit, 128 * 4);
}

#[test]
fn test_maze_is_reproducible_with_seed() {
    let run = || {
        let mut vm = Chip8Vm::new(Chip8Conf {
            seed: Some(1234),
            ..Default::default()
        });
        vm.load_bytecode(MAZE).unwrap();
        vm.execute(&mut Recorder::new(60)).unwrap();
        vm.dump_display().unwrap()
    };

    assert_eq!(run(), run());
}

#[test]
fn test_loader_errors() {
    let mut vm = Chip8Vm::new(Chip8Conf::default());

    let err = vm.load_bytecode(&[]).unwrap_err();
    assert!(matches!(err, Chip8Error::EmptyProgram));

    let err = vm.load_bytecode(&vec![0; 0xCA1]).unwrap_err();
    assert!(matches!(err, Chip8Error::LargeProgram { size: 0xCA1 }));

    struct Broken;
    impl io::Read for Broken {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::NotFound, "no such rom"))
        }
    }
    let err = vm.load_rom(&mut Broken).unwrap_err();
    assert!(matches!(err, Chip8Error::Io(_)));
}

#[test]
#[rustfmt::skip]
fn test_subroutine_counts_down() {
    // Calls a subroutine that decrements v0 until it reaches zero,
    // then sets the sound timer.
    let mut program = vec![
        0x60, 0x05, // 0x200 LD v0, 5
        0x23, 0x00, // 0x202 CALL 0x300
        0x30, 0x00, // 0x204 SE v0, 0
        0x12, 0x02, // 0x206 JP 0x202
        0x61, 0x02, // 0x208 LD v1, 2
        0xF1, 0x18, // 0x20A LD ST, v1
        0x12, 0x0C, // 0x20C JP 0x20C
    ];
    program.resize(0x100, 0);
    program.extend_from_slice(&[
        0x70, 0xFF, // 0x300 ADD v0, 0xFF
        0x00, 0xEE, // 0x302 RET
    ]);

    let mut vm = Chip8Vm::new(Chip8Conf::default());
    vm.load_bytecode(&program).unwrap();

    let mut devices = Recorder::new(4);
    vm.execute(&mut devices).unwrap();

    let cpu = vm.cpu();
    assert_eq!(cpu.registers()[0], 0);
    assert_eq!(cpu.pc(), 0x20C);
    assert!(cpu.stack().is_empty());
    assert_eq!(devices.beeps, 1);
}

#[test]
fn test_fatal_error_stops_loop() {
    let mut vm = Chip8Vm::new(Chip8Conf::default());
    vm.load_bytecode(&[0x00, 0xEE]).unwrap();

    let err = vm.execute(&mut Recorder::new(10)).unwrap_err();
    assert_eq!(err.to_string(), "call stack underflow at PC = 0x0200");
}

#[test]
fn test_disassemble_maze() {
    let mut buf = String::new();
    Disassembler::new(MAZE).disassemble(&mut buf).unwrap();

    let lines: Vec<&str> = buf.lines().collect();
    assert_eq!(lines.len(), MAZE.len() / 2);
    assert_eq!(lines[0], "0200: 6000  LD v0, 0x00");
    assert_eq!(lines[3], "0206: C201  RND v2, 0x01");
    assert_eq!(lines[6], "020C: D014  DRW v0, v1, 4");
    assert_eq!(lines[14], "021C: 121C  JP 0x21C");
}
