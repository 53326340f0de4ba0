use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};

#[allow(non_camel_case_types)]
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum RunStage {
    CREATED,
    DISCOVER,
    ENSURE_FACTS,
    GENERATE_CANDIDATES,
    CLASSIFY_ALL,
    WRITE,
    COMPLETED,
    FAILED,
}

pub fn valid_transition(from: RunStage, to: RunStage) -> bool {
    use RunStage::*;
    match (from, to) {
        (CREATED, DISCOVER) => true,
        (DISCOVER, ENSURE_FACTS) => true,
        (ENSURE_FACTS, GENERATE_CANDIDATES) => true,
        (GENERATE_CANDIDATES, CLASSIFY_ALL) => true,
        (CLASSIFY_ALL, WRITE) => true,
        (WRITE, COMPLETED) => true,
        (COMPLETED, _) | (FAILED, _) => false,
        (_, FAILED) => true,
        _ => false,
    }
}

pub fn check_transition(from: RunStage, to: RunStage) -> CoreResult<()> {
    if !valid_transition(from, to) {
        return Err(CoreError::InvalidTransition(format!("{:?} -> {:?}", from, to)));
    }
    Ok(())
}
