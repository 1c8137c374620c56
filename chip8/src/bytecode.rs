/// Helpers for extracting data from opcodes.
///
/// An instruction is a 16-bit word with the layout `OXYN`, where `O` is
/// the opcode group, `X` and `Y` select registers, and `N`, `NN` and `NNN`
/// are the lowest 4, 8 and 12 bits.

/// Assemble a big-endian instruction word from two bytes.
#[inline(always)]
pub fn word(a: u8, b: u8) -> u16 {
    ((a as u16) << 8) | b as u16
}

/// Extract opcode group from the most significant nibble.
#[inline(always)]
pub fn op_code(instr: u16) -> u8 {
    ((instr & 0xF000) >> 12) as u8
}

/// Extract operand VX.
#[inline(always)]
pub fn op_x(instr: u16) -> u8 {
    ((instr & 0x0F00) >> 8) as u8
}

/// Extract operand VY.
#[inline(always)]
pub fn op_y(instr: u16) -> u8 {
    ((instr & 0x00F0) >> 4) as u8
}

/// Extract operand N, the least significant nibble.
#[inline(always)]
pub fn op_n(instr: u16) -> u8 {
    (instr & 0x000F) as u8
}

/// Extract operand NN, the least significant byte.
#[inline(always)]
pub fn op_nn(instr: u16) -> u8 {
    (instr & 0x00FF) as u8
}

/// Extract operand NNN, the lower 12 bits.
#[inline(always)]
pub fn op_nnn(instr: u16) -> u16 {
    instr & 0x0FFF
}
