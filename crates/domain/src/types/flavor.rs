//! Compute and storage descriptors shared by order bodies and live config

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Named compute size
///
/// Every field defaults so that the empty `{}` placeholders used by
/// multi-group topologies still deserialize. Unknown fields are kept in
/// `extra` and written back unchanged on resize.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Flavor {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub ram: u32,
    pub vcpus: u32,
    pub gpus: u32,
    pub extra_specs: Map<String, Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Flavor {
    pub fn size(&self) -> FlavorSize {
        FlavorSize { ram: self.ram, vcpus: self.vcpus }
    }

    /// Copy of this flavor with RAM and vCPU count replaced
    pub fn resized(&self, target: FlavorSize) -> Self {
        Self { ram: target.ram, vcpus: target.vcpus, ..self.clone() }
    }
}

/// RAM (MB) and vCPU pair used as a resize target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlavorSize {
    pub ram: u32,
    pub vcpus: u32,
}

/// Root disk attached to a VM
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BootVolume {
    pub size: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volume_type: Option<VolumeType>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VolumeType {
    pub id: String,
    pub name: String,
    pub extra_specs: Map<String, Value>,
}
