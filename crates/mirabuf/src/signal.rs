//! Control signals

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::types::Info;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Signals {
    pub info: Info,
    pub signal_map: BTreeMap<String, Signal>,
}

/// Signal driving a joint
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    pub info: Info,
    pub io: IoType,
    pub device_type: DeviceType,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum IoType {
    Input,
    #[default]
    Output,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeviceType {
    #[default]
    Pwm,
    Can,
}

impl DeviceType {
    pub fn display_name(&self) -> &'static str {
        match self {
            DeviceType::Pwm => "PWM",
            DeviceType::Can => "CAN",
        }
    }
}
