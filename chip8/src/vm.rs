//! Virtual machine.
use std::{
    fmt::{self, Write},
    io::Read,
    time::Duration,
};

use log::{debug, info, trace};
use rand::prelude::*;

use crate::{
    clock::Clock,
    constants::*,
    cpu::Chip8Cpu,
    devices::{Devices, Input, KeyCode},
    display::{DisplayBuffer, EdgePolicy},
    error::{Chip8Error, Chip8Result},
    instr::{Op, UnknownInstruction},
};

pub struct Chip8Vm {
    cpu: Chip8Cpu,
    /// Paces timer ticks in real time, when a tick rate is configured.
    clock: Option<Clock>,
    rng: StdRng,
    conf: Chip8Conf,
}

impl Chip8Vm {
    pub fn new(conf: Chip8Conf) -> Self {
        let rng = match conf.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Chip8Vm {
            cpu: Chip8Cpu::new(),
            clock: conf.tick_rate.map(|hz| Clock::new(hz.into())),
            rng,
            conf,
        }
    }

    /// Configuration that was used to instantiate the VM.
    pub fn config(&self) -> &Chip8Conf {
        &self.conf
    }

    /// Read-only view of the machine state.
    pub fn cpu(&self) -> &Chip8Cpu {
        &self.cpu
    }

    pub fn load_bytecode(&mut self, bytecode: &[u8]) -> Chip8Result<()> {
        if bytecode.is_empty() {
            return Err(Chip8Error::EmptyProgram);
        }
        if bytecode.len() > PROGRAM_CAPACITY {
            return Err(Chip8Error::LargeProgram {
                size: bytecode.len(),
            });
        }

        // Start with clean memory to avoid leaking previous program.
        // This also resets the fonts and the program counter.
        self.cpu.reset();

        // Load program into virtual RAM
        self.cpu.ram[MEM_START..MEM_START + bytecode.len()].copy_from_slice(bytecode);
        debug!("loaded program of {} bytes", bytecode.len());

        if let Some(clock) = self.clock.as_mut() {
            clock.reset();
        }

        Ok(())
    }

    /// Read a whole ROM from the reader and load it.
    pub fn load_rom(&mut self, reader: &mut impl Read) -> Chip8Result<()> {
        let mut bytecode = Vec::new();
        reader.read_to_end(&mut bytecode)?;
        self.load_bytecode(&bytecode)
    }

    pub fn display_buffer(&self) -> &DisplayBuffer {
        &self.cpu.display
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Flow {
    /// Program counter advanced to the next instruction.
    Ok,
    /// The interpreter loop was asked to stop.
    Interrupt,
    /// Program counter has jumped to a new address.
    ///
    /// This is useful for the caller to avoid being
    /// blocked on infinite or long running loops.
    ///
    /// This is returned when the interpreter encounters:
    ///
    /// - 1nnn (`JP addr`)
    /// - 2nnn (`CALL addr`)
    /// - 00EE (`RET`)
    /// - Bnnn (`JP V0, addr`)
    Jump,
    /// The display buffer was changed and should be presented.
    Draw,
    /// Wait for a keypress.
    ///
    /// This is triggered by the opcode `Fx0A` (`LD Vx, K`), which stops
    /// execution until a key is pressed, and loads the key value into `Vx`.
    /// The program counter is left on the same instruction, so the next
    /// step retries it.
    KeyWait,
}

/// VM Configuration Parameters.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Chip8Conf {
    /// Instructions executed for every timer tick.
    ///
    /// Zero pauses the CPU while input polling and timers keep running.
    pub cycles_per_tick: usize,
    /// Real-time rate of timer ticks. Runs unthrottled when `None`.
    pub tick_rate: Option<Hz>,
    /// Treatment of sprites drawn across the display edges.
    pub edge_policy: EdgePolicy,
    /// Seed for the random number generator. Seeded from the OS when `None`.
    pub seed: Option<u64>,
}

impl Default for Chip8Conf {
    fn default() -> Self {
        Self {
            cycles_per_tick: CYCLES_PER_TICK,
            tick_rate: None,
            edge_policy: EdgePolicy::default(),
            seed: None,
        }
    }
}

/// CPU clock frequency, in hertz (per second)
#[derive(Debug, Default, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
pub struct Hz(pub u64);

impl From<Hz> for Duration {
    fn from(freq: Hz) -> Self {
        if freq.0 == 0 {
            Duration::from_nanos(0)
        } else {
            Duration::from_nanos(NANOS_IN_SECOND / freq.0)
        }
    }
}

/// Interpreter
impl Chip8Vm {
    /// Sets the keyboard key input state.
    pub fn set_key(&mut self, key: KeyCode, pressed: bool) {
        self.cpu.set_key_state(key.as_u8(), pressed);
    }

    /// Overwrite the state of all keys.
    pub fn set_keys(&mut self, keys: &[bool; KEY_COUNT as usize]) {
        self.cpu.set_keys(keys);
    }

    /// Clear the keyboard input state, setting all keys to up.
    pub fn clear_keys(&mut self) {
        self.cpu.clear_keys()
    }

    /// Count down the delay and sound timers once.
    ///
    /// Returns `true` when the buzzer should sound.
    pub fn tick_timers(&mut self) -> bool {
        self.cpu.timers.tick()
    }

    /// Run until the devices ask to stop, or a fatal error occurs.
    pub fn execute(&mut self, devices: &mut impl Devices) -> Chip8Result<()> {
        if let Some(clock) = self.clock.as_mut() {
            clock.reset();
        }

        loop {
            if self.run_frame(devices)? == Flow::Interrupt {
                return Ok(());
            }
        }
    }

    /// Run one iteration of the interpreter loop.
    ///
    /// Keys are polled once, then a batch of instructions is executed,
    /// followed by a single timer tick. The display is handed to the
    /// devices after every instruction that drew to it.
    pub fn run_frame(&mut self, devices: &mut impl Devices) -> Chip8Result<Flow> {
        match devices.poll_input() {
            Input::Keys(keys) => self.cpu.set_keys(&keys),
            Input::Quit => return Ok(Flow::Interrupt),
        }

        if let Some(clock) = self.clock.as_mut() {
            clock.wait();
        }

        for _ in 0..self.conf.cycles_per_tick {
            if self.step()? == Flow::Draw {
                devices.draw(&self.cpu.display);
            }
        }

        if self.tick_timers() {
            info!("beep");
            devices.beep();
        }

        Ok(Flow::Ok)
    }

    /// Execute a number of instructions without polling devices or
    /// ticking timers.
    pub fn run_steps(&mut self, step_count: usize) -> Chip8Result<Flow> {
        let mut flow = Flow::Ok;

        for _ in 0..step_count {
            flow = self.step()?;
        }

        Ok(flow)
    }

    /// Fetch, decode and execute a single instruction.
    pub fn step(&mut self) -> Chip8Result<Flow> {
        // Each instruction is two bytes, with the opcode identity in the first 4-bit nibble.
        let pc = self.cpu.pc;
        let instr = self.cpu.read_word(pc);
        self.cpu.advance();

        let op = Op::decode(instr)
            .map_err(|UnknownInstruction(instr)| Chip8Error::UnknownInstruction { instr, pc })?;
        trace!("{pc:04X}: {instr:04X} {op}");

        self.exec(op, pc)
    }

    /// Execute a decoded instruction that was fetched from `pc`.
    ///
    /// The program counter already points to the next instruction.
    fn exec(&mut self, op: Op, pc: Address) -> Chip8Result<Flow> {
        let mut control_flow = Flow::Ok;

        match op {
            // 00E0 (CLS)
            //
            // Clear display
            Op::ClearScreen => self.cpu.display.clear(),
            // 00EE (RET)
            //
            // Return from a subroutine.
            // The stack holds the address of the calling instruction,
            // so execution resumes after it.
            Op::Return => {
                let addr = self
                    .cpu
                    .stack
                    .pop()
                    .map_err(|kind| Chip8Error::Stack { kind, pc })?;
                self.cpu.jump(addr.wrapping_add(2));
                control_flow = Flow::Jump;
            }
            // 1nnn (JP addr)
            Op::Jump { address } => {
                self.cpu.jump(address);
                control_flow = Flow::Jump;
            }
            // 2nnn (CALL addr)
            //
            // Push the address of this instruction, then jump to NNN.
            Op::Call { address } => {
                self.cpu
                    .stack
                    .push(pc)
                    .map_err(|kind| Chip8Error::Stack { kind, pc })?;
                self.cpu.jump(address);
                control_flow = Flow::Jump;
            }
            // 3xnn (SE Vx, byte)
            Op::SkipEqByte { vx, nn } => {
                if self.cpu.register(vx) == nn {
                    self.cpu.advance();
                }
            }
            // 4xnn (SNE Vx, byte)
            Op::SkipNotEqByte { vx, nn } => {
                if self.cpu.register(vx) != nn {
                    self.cpu.advance();
                }
            }
            // 5xy0 (SE Vx, Vy)
            Op::SkipEq { vx, vy } => {
                if self.cpu.register(vx) == self.cpu.register(vy) {
                    self.cpu.advance();
                }
            }
            // 6xnn (LD Vx, byte)
            Op::LoadByte { vx, nn } => self.cpu.set_register(vx, nn),
            // 7xnn (ADD Vx, byte)
            //
            // Carry flag is not set.
            Op::AddByte { vx, nn } => {
                let x = self.cpu.register(vx);
                self.cpu.set_register(vx, x.wrapping_add(nn));
            }
            // ----------------------------------------------------------------
            // Arithmetic
            Op::Load { vx, vy } => self.cpu.set_register(vx, self.cpu.register(vy)),
            Op::Or { vx, vy } => {
                let (x, y) = self.operands(vx, vy);
                self.cpu.set_register(vx, x | y);
            }
            Op::And { vx, vy } => {
                let (x, y) = self.operands(vx, vy);
                self.cpu.set_register(vx, x & y);
            }
            Op::Xor { vx, vy } => {
                let (x, y) = self.operands(vx, vy);
                self.cpu.set_register(vx, x ^ y);
            }
            // The flag is written before the result for all of the
            // following, so when VF is an operand it reads as the new flag.
            //
            // 8xy4 (ADD Vx, Vy)
            Op::Add { vx, vy } => {
                let (x, y) = self.operands(vx, vy);
                self.cpu.set_flag(x as u16 + y as u16 > 0xFF);
                let (x, y) = self.operands(vx, vy);
                self.cpu.set_register(vx, x.wrapping_add(y));
            }
            // 8xy5 (SUB Vx, Vy)
            Op::Sub { vx, vy } => {
                let (x, y) = self.operands(vx, vy);
                self.cpu.set_flag(y <= x);
                let (x, y) = self.operands(vx, vy);
                self.cpu.set_register(vx, x.wrapping_sub(y));
            }
            // 8xy6 (SHR Vx)
            Op::ShiftRight { vx } => {
                self.cpu.set_flag(self.cpu.register(vx) & 1 == 1);
                let x = self.cpu.register(vx);
                self.cpu.set_register(vx, x >> 1);
            }
            // 8xy7 (SUBN Vx, Vy)
            Op::SubReverse { vx, vy } => {
                let (x, y) = self.operands(vx, vy);
                self.cpu.set_flag(x <= y);
                let (x, y) = self.operands(vx, vy);
                self.cpu.set_register(vx, y.wrapping_sub(x));
            }
            // 8xyE (SHL Vx)
            Op::ShiftLeft { vx } => {
                self.cpu.set_flag(self.cpu.register(vx) >> 7 == 1);
                let x = self.cpu.register(vx);
                self.cpu.set_register(vx, x << 1);
            }
            // ----------------------------------------------------------------
            // 9xy0 (SNE Vx, Vy)
            Op::SkipNotEq { vx, vy } => {
                if self.cpu.register(vx) != self.cpu.register(vy) {
                    self.cpu.advance();
                }
            }
            // Annn (LD I, addr)
            Op::LoadAddress { address } => self.cpu.address = address,
            // Bnnn (JP V0, addr)
            Op::JumpOffset { address } => {
                let offset = self.cpu.register(0) as Address;
                self.cpu.jump(address + offset);
                control_flow = Flow::Jump;
            }
            // Cxnn (RND Vx, byte)
            Op::Random { vx, nn } => {
                let value: u8 = self.rng.gen();
                self.cpu.set_register(vx, value & nn);
            }
            // Dxyn (DRW Vx, Vy, nibble)
            //
            // Draw sprite to the display buffer, at coordinate as per registers Vx and Vy.
            // Sprite is encoded as 8 pixels wide, N pixels high, stored in bits located in
            // memory pointed to by address register I.
            //
            // If the drawing operation erases existing pixels in the display buffer, register VF is set to
            // 1, and set to 0 if no display bits are unset. This is used for collision detection.
            Op::Draw { vx, vy, n } => {
                let x = self.cpu.register(vx) as usize;
                let y = self.cpu.register(vy) as usize;

                let mut sprite = [0; 0xF];
                for (r, row) in sprite.iter_mut().enumerate().take(n as usize) {
                    *row = self.cpu.read_byte(self.cpu.address.wrapping_add(r as Address));
                }

                let is_erased = self.cpu.display.draw_sprite(
                    x,
                    y,
                    &sprite[..n as usize],
                    self.conf.edge_policy,
                );
                self.cpu.set_flag(is_erased);
                control_flow = Flow::Draw;
            }
            // ----------------------------------------------------------------
            // Ex9E (SKP Vx)
            Op::SkipKey { vx } => {
                if self.cpu.key_state(self.cpu.register(vx)) {
                    self.cpu.advance();
                }
            }
            // ExA1 (SKNP Vx)
            Op::SkipNotKey { vx } => {
                if !self.cpu.key_state(self.cpu.register(vx)) {
                    self.cpu.advance();
                }
            }
            // ----------------------------------------------------------------
            // Fx07 (LD Vx, DT)
            Op::LoadDelay { vx } => self.cpu.set_register(vx, self.cpu.timers.delay),
            // Fx0A (LD Vx, K)
            //
            // Wait for a key press, store the value of the key in Vx.
            Op::WaitKey { vx } => {
                if let Some(k) = self.cpu.first_key() {
                    self.cpu.set_register(vx, k);
                } else {
                    // rewind the program counter to stall the machine
                    self.cpu.jump(pc);
                    control_flow = Flow::KeyWait;
                }
            }
            // Fx15 (LD DT, Vx)
            Op::SetDelay { vx } => self.cpu.timers.delay = self.cpu.register(vx),
            // Fx18 (LD ST, Vx)
            Op::SetSound { vx } => self.cpu.timers.sound = self.cpu.register(vx),
            // Fx1E (ADD I, Vx)
            //
            // VF is set when the result leaves the 12-bit address space.
            Op::AddAddress { vx } => {
                let sum = self.cpu.address as u32 + self.cpu.register(vx) as u32;
                self.cpu.set_flag(sum > ADDRESS_MASK as u32);
                let sum = self.cpu.address + self.cpu.register(vx) as Address;
                self.cpu.address = sum & ADDRESS_MASK;
            }
            // Fx29 (LD F, Vx)
            Op::LoadFont { vx } => {
                let x = self.cpu.register(vx) as Address;
                self.cpu.address = FONTSET_START + x * FONTSET_HEIGHT as Address;
            }
            // Fx33 (LD B, Vx)
            //
            // Store the binary-coded decimal representation of Vx
            // in the memory locations I, I+1, and I+2.
            Op::StoreBcd { vx } => {
                let addr = self.cpu.address;
                let x = self.cpu.register(vx);
                self.cpu.write_byte(addr, x / 100);
                self.cpu.write_byte(addr + 1, x / 10 % 10);
                self.cpu.write_byte(addr + 2, x % 100 % 10);
            }
            // Fx55 (LD [I], Vx)
            //
            // Store registers V0 through Vx in memory starting at location I.
            Op::StoreRegisters { vx } => {
                let addr = self.cpu.address;
                for v in 0..=vx {
                    self.cpu.write_byte(addr + v as Address, self.cpu.register(v));
                }
            }
            // Fx65 (LD Vx, [I])
            //
            // Read registers V0 through Vx from memory starting at location I.
            Op::LoadRegisters { vx } => {
                let addr = self.cpu.address;
                for v in 0..=vx {
                    let value = self.cpu.read_byte(addr + v as Address);
                    self.cpu.set_register(v, value);
                }
            }
        }

        Ok(control_flow)
    }

    #[inline(always)]
    fn operands(&self, vx: u8, vy: u8) -> (u8, u8) {
        (self.cpu.register(vx), self.cpu.register(vy))
    }
}

/// Troubleshooting
#[doc(hidden)]
impl Chip8Vm {
    /// Returns the contents of the memory as a human readable string.
    pub fn dump_ram(&self, count: usize) -> Result<String, std::fmt::Error> {
        let iter = self
            .cpu
            .ram
            .iter()
            .enumerate()
            .skip(MEM_START)
            .take(count)
            .step_by(2);
        let mut buf = String::new();

        for (i, op) in iter {
            let next = self.cpu.ram[(i + 1) & (MEM_SIZE - 1)];
            writeln!(buf, "{:04X}: {:02X}{:02X}", i, op, next)?;
        }

        Ok(buf)
    }

    pub fn dump_display(&self) -> Result<String, std::fmt::Error> {
        let mut buf = String::new();

        for row in self.cpu.display.rows() {
            for px in row {
                if *px {
                    write!(buf, "#")?;
                } else {
                    write!(buf, ".")?;
                }
            }
            writeln!(buf)?;
        }

        Ok(buf)
    }

    pub fn dump_keys(&self) -> Result<String, fmt::Error> {
        let mut buf = String::new();

        if self.cpu.any_key() {
            write!(buf, "keys:")?;
            for i in 0..KEY_COUNT {
                if self.cpu.key_state(i) {
                    write!(buf, " k{i:x}")?;
                }
            }
        }

        Ok(buf)
    }

    /// Returns the call stack, top slot first, with the stack pointer marked.
    ///
    /// The marker sits above the top slot when the stack is full.
    pub fn dump_stack(&self) -> Result<String, fmt::Error> {
        let stack = &self.cpu.stack;
        let mut buf = String::new();

        write!(buf, "|        |")?;
        if stack.sp() == STACK_SIZE {
            write!(buf, " <- sp")?;
        }
        writeln!(buf)?;

        for slot in (0..STACK_SIZE).rev() {
            let addr = stack.as_slice().get(slot).copied().unwrap_or(0);
            write!(buf, "| 0x{addr:04X} |")?;
            if slot == stack.sp() {
                write!(buf, " <- sp")?;
            }
            writeln!(buf)?;
        }

        Ok(buf)
    }
}
