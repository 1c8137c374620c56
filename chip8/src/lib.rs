mod bytecode;
mod clock;
pub mod constants;
mod cpu;
mod devices;
mod disasm;
mod display;
mod error;
mod instr;
mod stack;
mod timer;
mod vm;

pub use self::vm::{Flow, Hz};

/// Version of this interpreter crate.
pub const IMPL_VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod prelude {
    pub use super::{
        cpu::Chip8Cpu,
        devices::{Devices, Input, InvalidKeyCode, KeyCode},
        disasm::Disassembler,
        display::{DisplayBuffer, EdgePolicy},
        error::{Chip8Error, Chip8Result},
        instr::{Op, UnknownInstruction},
        stack::{CallStack, StackError},
        timer::Timers,
        vm::{Chip8Conf, Chip8Vm, Flow, Hz},
    };
}
