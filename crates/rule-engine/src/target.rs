use serde::{Deserialize, Serialize};

/// Identifies a physical device instance.
///
/// Two targets match only when all three identifiers are byte-for-byte
/// equal. There is no case folding and no wildcard: an empty string is just
/// another value that has to match exactly.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Target {
    hardware_id: String,
    device_id: String,
    instance_id: String,
}

impl Target {
    pub fn new(
        hardware_id: impl Into<String>,
        device_id: impl Into<String>,
        instance_id: impl Into<String>,
    ) -> Self {
        Self {
            hardware_id: hardware_id.into(),
            device_id: device_id.into(),
            instance_id: instance_id.into(),
        }
    }

    pub fn hardware_id(&self) -> &str {
        &self.hardware_id
    }

    pub fn device_id(&self) -> &str {
        &self.device_id
    }

    pub fn instance_id(&self) -> &str {
        &self.instance_id
    }
}
