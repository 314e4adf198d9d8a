use crate::services::hydraulics::{HoseType, Position, SystemType};
use thiserror::Error;

#[derive(Clone, Copy, Debug, Eq, Error, PartialEq)]
pub enum ConnectionRejected {
    #[error("Bij enkelwerkend systeem moet de aanvoer links worden aangesloten")]
    SupplyNotLeft,
    #[error("Bij enkelwerkend systeem moet de retour rechts worden aangesloten")]
    ReturnNotRight,
    #[error("Lekleiding mag alleen op de specifieke lekaansluiting worden aangesloten")]
    LeakNotOnLeakPort,
}

/// Check whether a hose may be placed at a position for the given system type
///
/// Double-acting systems accept any placement, and only the listed
/// combinations are checked for the others.
pub fn validate_connection(
    system_type: SystemType,
    hose: HoseType,
    position: Position,
) -> Result<(), ConnectionRejected> {
    match (system_type, hose) {
        (SystemType::Single, HoseType::Supply) if position != Position::Left => {
            Err(ConnectionRejected::SupplyNotLeft)
        }
        (SystemType::Single, HoseType::Return) if position != Position::Right => {
            Err(ConnectionRejected::ReturnNotRight)
        }
        (SystemType::Leak, HoseType::Leak) if position != Position::Leak => {
            Err(ConnectionRejected::LeakNotOnLeakPort)
        }
        _ => Ok(()),
    }
}
