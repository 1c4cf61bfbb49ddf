use sol_wire::{InstructionError, SolError};
use thiserror::Error;
use token_instruction::TokenError;
use token_state::LayoutError;

/// Failure of a single instruction inside one of the ledger's programs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub(crate) enum ProgramError {
    #[error(transparent)]
    Token(#[from] TokenError),

    #[error(transparent)]
    Instruction(#[from] InstructionError),
}

impl From<LayoutError> for ProgramError {
    fn from(_: LayoutError) -> Self {
        ProgramError::Instruction(InstructionError::InvalidAccountData)
    }
}

impl From<SolError> for ProgramError {
    fn from(_: SolError) -> Self {
        ProgramError::Instruction(InstructionError::InvalidSeeds)
    }
}

impl From<ProgramError> for InstructionError {
    fn from(e: ProgramError) -> Self {
        match e {
            ProgramError::Token(e) => InstructionError::Custom(e.code()),
            ProgramError::Instruction(e) => e,
        }
    }
}

pub(crate) type ProgramResult = Result<(), ProgramError>;
