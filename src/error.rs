use thiserror::Error;

use crate::memory::TypeAddr;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    #[error("ROM is too large ({size} bytes), max size is {max} bytes")]
    TooLarge { size: usize, max: usize },
}

/// Faults raised while executing a program. Every one of them halts the VM.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExecError {
    #[error("no ROM loaded")]
    NotLoaded,

    #[error("instruction fetch out of bounds at {pc:#05X}")]
    OutOfBounds { pc: TypeAddr },

    #[error("invalid opcode {opcode:#06X} at {pc:#05X}")]
    InvalidOpcode { opcode: u16, pc: TypeAddr },

    #[error("stack overflow: subroutine call at {pc:#05X} exceeds 16 levels")]
    StackOverflow { pc: TypeAddr },

    #[error("stack underflow: return at {pc:#05X} with an empty call stack")]
    StackUnderflow { pc: TypeAddr },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_carry_diagnostics() {
        let err = ExecError::InvalidOpcode {
            opcode: 0x5AB1,
            pc: 0x204,
        };
        assert_eq!(err.to_string(), "invalid opcode 0x5AB1 at 0x204");

        let err = LoadError::TooLarge {
            size: 3585,
            max: 3584,
        };
        assert_eq!(
            err.to_string(),
            "ROM is too large (3585 bytes), max size is 3584 bytes"
        );
    }
}
