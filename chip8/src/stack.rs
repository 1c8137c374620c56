//! Call stack.
use std::fmt::{self, Display, Formatter};

use crate::constants::*;

/// Fixed capacity stack of return addresses used by `CALL` and `RET`.
///
/// The stack pointer is the number of occupied slots, so it also points
/// to the next free slot.
#[derive(Debug, Clone)]
pub struct CallStack {
    slots: [Address; STACK_SIZE],
    sp: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StackError {
    /// Push onto a full stack.
    Overflow,
    /// Pop from an empty stack.
    Underflow,
}

impl Display for StackError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Overflow => write!(f, "call stack overflow"),
            Self::Underflow => write!(f, "call stack underflow"),
        }
    }
}

impl std::error::Error for StackError {}

impl Default for CallStack {
    fn default() -> Self {
        Self {
            slots: [0; STACK_SIZE],
            sp: 0,
        }
    }
}

impl CallStack {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn push(&mut self, address: Address) -> Result<(), StackError> {
        if self.sp >= STACK_SIZE {
            return Err(StackError::Overflow);
        }
        self.slots[self.sp] = address & ADDRESS_MASK;
        self.sp += 1;
        Ok(())
    }

    pub fn pop(&mut self) -> Result<Address, StackError> {
        if self.sp == 0 {
            return Err(StackError::Underflow);
        }
        self.sp -= 1;
        Ok(self.slots[self.sp])
    }

    /// Current stack pointer position.
    #[inline(always)]
    pub fn sp(&self) -> usize {
        self.sp
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.sp
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.sp == 0
    }

    /// Occupied slots, oldest return address first.
    pub fn as_slice(&self) -> &[Address] {
        &self.slots[..self.sp]
    }

    pub(crate) fn clear(&mut self) {
        self.slots.fill(0);
        self.sp = 0;
    }
}
