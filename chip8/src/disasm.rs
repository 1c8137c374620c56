//! Disassembler.
use std::fmt::{self, Write as FmtWrite};

use crate::{
    bytecode::word,
    constants::{Address, MEM_START},
    instr::Op,
};

/// Linear listing of a program, one line per instruction word.
///
/// Words that do not decode, such as sprite data embedded in the
/// program, are listed as `DATA`.
pub struct Disassembler<'a> {
    bytecode: &'a [u8],
    cursor: usize,
}

impl<'a> Disassembler<'a> {
    pub fn new(bytecode: &'a [u8]) -> Self {
        Self {
            bytecode,
            cursor: 0,
        }
    }

    /// Write the whole program to the given writer.
    pub fn disassemble<W: FmtWrite>(&mut self, w: &mut W) -> fmt::Result {
        self.cursor = 0;

        while self.cursor < self.bytecode.len() {
            self.disassemble_next(w)?;
        }

        Ok(())
    }

    /// Write a single instruction to the given writer, and advance the cursor.
    pub fn disassemble_next<W: FmtWrite>(&mut self, w: &mut W) -> fmt::Result {
        let addr = self.address();

        match self.bytecode.get(self.cursor..self.cursor + 2) {
            Some(&[a, b]) => {
                let instr = word(a, b);
                match Op::decode(instr) {
                    Ok(op) => writeln!(w, "{addr:04X}: {instr:04X}  {op}")?,
                    Err(_) => writeln!(w, "{addr:04X}: {instr:04X}  DATA")?,
                }
                self.cursor += 2;
            }
            _ => {
                // odd trailing byte
                if let Some(byte) = self.bytecode.get(self.cursor) {
                    writeln!(w, "{addr:04X}: {byte:02X}    DATA")?;
                }
                self.cursor = self.bytecode.len();
            }
        }

        Ok(())
    }

    /// Memory address of the current position, as loaded by the VM.
    fn address(&self) -> Address {
        (MEM_START + self.cursor) as Address
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    #[rustfmt::skip]
    fn test_disassemble_listing() {
        let bytecode = [
            0x00, 0xE0, // CLS
            0xA2, 0x22, // LD I, 0x222
            0xD0, 0x14, // DRW v0, v1, 4
            0x80, 0x40, // LD v0, v4
            0x12,       // odd trailing byte
        ];
        let mut buf = String::new();
        Disassembler::new(&bytecode).disassemble(&mut buf).unwrap();

        let lines: Vec<&str> = buf.lines().collect();
        assert_eq!(lines.len(), 5);
        assert_eq!(lines[0], "0200: 00E0  CLS");
        assert_eq!(lines[1], "0202: A222  LD I, 0x222");
        assert_eq!(lines[2], "0204: D014  DRW v0, v1, 4");
        assert_eq!(lines[3], "0206: 8040  LD v0, v4");
        assert_eq!(lines[4], "0208: 12    DATA");
    }

    #[test]
    fn test_undecodable_words_are_data() {
        let mut buf = String::new();
        Disassembler::new(&[0x51, 0x21, 0xFF, 0xFF])
            .disassemble(&mut buf)
            .unwrap();
        assert_eq!(buf, "0200: 5121  DATA\n0202: FFFF  DATA\n");
    }

    #[test]
    fn test_empty() {
        let mut buf = String::new();
        Disassembler::new(&[]).disassemble(&mut buf).unwrap();
        assert!(buf.is_empty());
    }
}
