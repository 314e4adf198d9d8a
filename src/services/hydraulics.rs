use crate::services::{
    connection::{ConnectionRejected, validate_connection},
    recommendations::{Recommendations, compute_recommendations},
};
use anyhow::{Result, anyhow};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::{
    fmt,
    str::FromStr,
    sync::{Arc, Mutex, MutexGuard},
};

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SystemType {
    #[default]
    Single,
    Double,
    Leak,
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HoseType {
    Supply,
    Return,
    Leak,
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Position {
    Left,
    Right,
    Leak,
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Position::Left => write!(f, "left"),
            Position::Right => write!(f, "right"),
            Position::Leak => write!(f, "leak"),
        }
    }
}

impl FromStr for Position {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "left" => Ok(Position::Left),
            "right" => Ok(Position::Right),
            "leak" => Ok(Position::Leak),
            other => Err(anyhow!("unknown hose position: {other}")),
        }
    }
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct HoseConnection {
    pub connected: bool,
    pub position: Position,
}

impl HoseConnection {
    fn disconnected(position: Position) -> Self {
        HoseConnection {
            connected: false,
            position,
        }
    }
}

/// Connection state of the three hose slots
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct HoseState {
    pub supply: HoseConnection,
    #[serde(rename = "return")]
    pub return_line: HoseConnection,
    pub leak: HoseConnection,
}

impl HoseState {
    pub fn get(&self, hose: HoseType) -> &HoseConnection {
        match hose {
            HoseType::Supply => &self.supply,
            HoseType::Return => &self.return_line,
            HoseType::Leak => &self.leak,
        }
    }

    pub fn get_mut(&mut self, hose: HoseType) -> &mut HoseConnection {
        match hose {
            HoseType::Supply => &mut self.supply,
            HoseType::Return => &mut self.return_line,
            HoseType::Leak => &mut self.leak,
        }
    }
}

impl Default for HoseState {
    fn default() -> Self {
        HoseState {
            supply: HoseConnection::disconnected(Position::Left),
            return_line: HoseConnection::disconnected(Position::Right),
            leak: HoseConnection::disconnected(Position::Leak),
        }
    }
}

/// Operating parameters for one system type (bar, l/min, °C)
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Parameters {
    pub pressure: u32,
    pub flow_rate: u32,
    pub temperature: u32,
    pub max_pressure: u32,
}

impl SystemType {
    pub fn parameters(self) -> Parameters {
        match self {
            SystemType::Single => Parameters {
                pressure: 250,
                flow_rate: 60,
                temperature: 40,
                max_pressure: 300,
            },
            SystemType::Double => Parameters {
                pressure: 300,
                flow_rate: 80,
                temperature: 45,
                max_pressure: 350,
            },
            SystemType::Leak => Parameters {
                pressure: 200,
                flow_rate: 50,
                temperature: 35,
                max_pressure: 250,
            },
        }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Configuration {
    pub pressure: u32,
    pub flow_rate: u32,
    pub temperature: u32,
    pub max_pressure: u32,
    pub system_type: SystemType,
    pub connections: HoseState,
    pub recommendations: Recommendations,
}

/// Derive a configuration from a system type and hose snapshot
///
/// The recommendations only look at the hoses, while the numbers only look at
/// the system type, so the two may describe different systems.
pub fn derive_configuration(system_type: SystemType, hoses: &HoseState) -> Configuration {
    let recommendations = compute_recommendations(hoses);
    let Parameters {
        pressure,
        flow_rate,
        temperature,
        max_pressure,
    } = system_type.parameters();

    Configuration {
        pressure,
        flow_rate,
        temperature,
        max_pressure,
        system_type,
        connections: *hoses,
        recommendations,
    }
}

#[derive(Debug, Default)]
struct SystemState {
    system_type: SystemType,
    hoses: HoseState,
    configuration: Option<Configuration>,
}

/// Shared hydraulic system state
///
/// Cloning is cheap and every clone refers to the same state. The cached
/// configuration is derived once and only replaced by [`refresh`] or dropped
/// by [`invalidate`]; mutating hoses or the system type leaves it untouched.
///
/// [`refresh`]: ConfigurationStore::refresh
/// [`invalidate`]: ConfigurationStore::invalidate
#[derive(Clone, Debug, Default)]
pub struct ConfigurationStore {
    state: Arc<Mutex<SystemState>>,
}

impl ConfigurationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached configuration, derived from the current state on first use
    pub fn configuration(&self) -> Result<Configuration> {
        let mut state = self.lock()?;

        if let Some(configuration) = &state.configuration {
            return Ok(configuration.clone());
        }

        debug!("no cached configuration, deriving");
        let configuration = derive_configuration(state.system_type, &state.hoses);
        state.configuration = Some(configuration.clone());

        Ok(configuration)
    }

    /// Re-derive from the current state and replace the cached configuration
    pub fn refresh(&self) -> Result<Configuration> {
        let mut state = self.lock()?;
        let configuration = derive_configuration(state.system_type, &state.hoses);
        state.configuration = Some(configuration.clone());
        info!("configuration refreshed for {:?} system", state.system_type);

        Ok(configuration)
    }

    pub fn invalidate(&self) -> Result<()> {
        self.lock()?.configuration = None;
        Ok(())
    }

    pub fn system_type(&self) -> Result<SystemType> {
        Ok(self.lock()?.system_type)
    }

    pub fn set_system_type(&self, system_type: SystemType) -> Result<()> {
        self.lock()?.system_type = system_type;
        info!("system type set to {system_type:?}");
        Ok(())
    }

    pub fn hoses(&self) -> Result<HoseState> {
        Ok(self.lock()?.hoses)
    }

    pub fn set_hose(&self, hose: HoseType, connected: bool, position: Position) -> Result<()> {
        *self.lock()?.hoses.get_mut(hose) = HoseConnection {
            connected,
            position,
        };
        info!("{hose:?} hose set to connected={connected} at {position}");
        Ok(())
    }

    /// Check a hose placement against the currently selected system type
    pub fn validate_connection(
        &self,
        hose: HoseType,
        position: Position,
    ) -> Result<std::result::Result<(), ConnectionRejected>> {
        let system_type = self.system_type()?;
        Ok(validate_connection(system_type, hose, position))
    }

    fn lock(&self) -> Result<MutexGuard<'_, SystemState>> {
        self.state
            .lock()
            .map_err(|_| anyhow!("system state lock poisoned"))
    }

    #[cfg(test)]
    pub(crate) fn poison(&self) {
        let state = self.state.clone();
        let _ = std::thread::spawn(move || {
            let _guard = state.lock();
            panic!("poisoning system state");
        })
        .join();
    }
}
