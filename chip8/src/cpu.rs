//! CPU and memory state.
use crate::{
    bytecode::word, constants::*, display::DisplayBuffer, stack::CallStack, timer::Timers,
};

/// Core state for a chip8 interpreter.
pub struct Chip8Cpu {
    // ------------------------------------------------------------------------
    // Registers
    /// Program counter pointing to the current position in the bytecode.
    pub(crate) pc: Address,
    /// General purpose registers for temporary values.
    ///
    /// Register 16 (VF) is used for either the carry flag or borrow switch depending on opcode.
    pub(crate) registers: [u8; REGISTER_COUNT],
    /// Pointer register used for temporarily storing an address. Since addresses are 12 bits, only the
    /// lowest (rightmost) bits are used.
    pub(crate) address: Address,
    /// Delay and sound timers.
    pub(crate) timers: Timers,
    /// Keyboard input state. Pressed is a 1 bit, released is a 0 bit.
    pub(crate) key_state: u16,

    // ------------------------------------------------------------------------
    // Memory
    /// Main memory storage space.
    pub(crate) ram: Box<[u8; MEM_SIZE]>,
    /// Stack of return pointers used for jumping when a routine call finishes.
    pub(crate) stack: CallStack,
    /// Screen buffer that is drawn too.
    pub(crate) display: DisplayBuffer,
}

impl Default for Chip8Cpu {
    fn default() -> Self {
        let mut cpu = Self {
            pc: MEM_START as Address,
            registers: [0; REGISTER_COUNT],
            address: 0,
            timers: Timers::new(),
            key_state: 0,

            ram: Box::new([0; MEM_SIZE]),
            stack: CallStack::new(),
            display: DisplayBuffer::new(),
        };
        cpu.load_font();
        cpu
    }
}

impl Chip8Cpu {
    pub fn new() -> Self {
        Default::default()
    }

    /// Return every register, memory cell and buffer to its power-on state.
    pub(crate) fn reset(&mut self) {
        self.ram.fill(0);
        self.stack.clear();
        self.display.clear();
        self.registers.fill(0);
        self.timers.clear();
        self.key_state = 0;
        self.address = 0;
        self.pc = MEM_START as Address;
        self.load_font();
    }

    fn load_font(&mut self) {
        let start = FONTSET_START as usize;
        self.ram[start..start + FONTSET_DATA_LENGTH].copy_from_slice(&FONTSET);
    }

    // ------------------------------------------------------------------------
    // Memory

    #[inline(always)]
    pub fn read_byte(&self, addr: Address) -> u8 {
        self.ram[(addr & ADDRESS_MASK) as usize]
    }

    #[inline(always)]
    pub fn write_byte(&mut self, addr: Address, value: u8) {
        self.ram[(addr & ADDRESS_MASK) as usize] = value;
    }

    /// Big-endian instruction word at the given address.
    #[inline(always)]
    pub fn read_word(&self, addr: Address) -> u16 {
        word(self.read_byte(addr), self.read_byte(addr.wrapping_add(1)))
    }

    pub fn ram(&self) -> &[u8; MEM_SIZE] {
        &self.ram
    }

    // ------------------------------------------------------------------------
    // Registers

    #[inline(always)]
    pub fn register(&self, index: u8) -> u8 {
        self.registers[index as usize & 0xF]
    }

    #[inline(always)]
    pub fn set_register(&mut self, index: u8, value: u8) {
        self.registers[index as usize & 0xF] = value;
    }

    #[inline(always)]
    pub fn registers(&self) -> &[u8; REGISTER_COUNT] {
        &self.registers
    }

    /// Write the carry, borrow or collision flag into VF.
    #[inline(always)]
    pub(crate) fn set_flag(&mut self, flag: bool) {
        self.registers[FLAG_REGISTER] = flag as u8;
    }

    #[inline(always)]
    pub fn pc(&self) -> Address {
        self.pc
    }

    /// Set the program counter, masked to 12 bits.
    #[inline(always)]
    pub(crate) fn jump(&mut self, addr: Address) {
        self.pc = addr & ADDRESS_MASK;
    }

    /// Move the program counter forward by one instruction.
    #[inline(always)]
    pub(crate) fn advance(&mut self) {
        self.jump(self.pc.wrapping_add(2));
    }

    #[inline(always)]
    pub fn address(&self) -> Address {
        self.address
    }

    pub fn timers(&self) -> &Timers {
        &self.timers
    }

    pub fn stack(&self) -> &CallStack {
        &self.stack
    }

    pub fn display(&self) -> &DisplayBuffer {
        &self.display
    }

    // ------------------------------------------------------------------------
    // Keyboard

    pub fn set_key_state(&mut self, key_id: u8, state: bool) {
        if key_id < KEY_COUNT {
            if state {
                self.key_state |= 1 << key_id;
            } else {
                self.key_state &= !(1 << key_id);
            }
        }
    }

    /// Overwrite the state of all 16 keys at once.
    pub fn set_keys(&mut self, keys: &[bool; KEY_COUNT as usize]) {
        self.key_state = keys
            .iter()
            .enumerate()
            .filter(|(_, pressed)| **pressed)
            .fold(0, |state, (k, _)| state | (1 << k));
    }

    /// Keys outside the range 0x0-0xF are never pressed.
    pub fn key_state(&self, key_id: u8) -> bool {
        if key_id < KEY_COUNT {
            self.key_state & (1 << key_id) > 0
        } else {
            false
        }
    }

    /// Check whether any key is pressed down.
    #[inline(always)]
    pub fn any_key(&self) -> bool {
        self.key_state > 0
    }

    /// Retrieve the value of the first key that is pressed down.
    #[inline]
    pub fn first_key(&self) -> Option<u8> {
        if self.any_key() {
            for k in 0..KEY_COUNT {
                if self.key_state(k) {
                    return Some(k);
                }
            }
        }
        None
    }

    /// Clear the keyboard input state, setting all keys to up.
    #[inline(always)]
    pub fn clear_keys(&mut self) {
        self.key_state = 0;
    }
}
