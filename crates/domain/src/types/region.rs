//! Static region table used when building order bodies

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use super::flavor::{BootVolume, Flavor, VolumeType};
use crate::errors::DbaasError;

/// Identifier of one of the known regions
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RegionKey {
    #[default]
    Region1,
    Region2,
}

impl RegionKey {
    /// Human-readable label used in cluster descriptions
    pub const fn label(self) -> &'static str {
        match self {
            Self::Region1 => "region-1",
            Self::Region2 => "region-2",
        }
    }

    pub fn descriptor(self) -> RegionDescriptor {
        match self {
            Self::Region1 => region_1(),
            Self::Region2 => region_2(),
        }
    }
}

impl fmt::Display for RegionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for RegionKey {
    type Err = DbaasError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "region1" | "region-1" => Ok(Self::Region1),
            "region2" | "region-2" => Ok(Self::Region2),
            other => Err(DbaasError::Config(format!("Unknown region: {other}"))),
        }
    }
}

/// Region, zone or similar named placement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    pub id: String,
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Network {
    pub name: String,
    pub status: String,
    pub id: String,
    pub description: String,
    pub create_time: String,
    pub shared_from: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subnet {
    pub name: String,
    pub id: String,
    pub network: Network,
}

/// Infrastructure selection for a new cluster
#[derive(Debug, Clone, PartialEq)]
pub struct RegionDescriptor {
    pub key: RegionKey,
    pub region: Placement,
    pub availability_zone: Placement,
    pub subnet: Subnet,
    pub flavor: Flavor,
    pub boot_volume: BootVolume,
}

fn placement(id: &str, name: &str) -> Placement {
    Placement { id: id.to_string(), name: name.to_string(), description: String::new() }
}

fn default_network() -> Network {
    Network {
        name: "default".to_string(),
        status: "available".to_string(),
        id: "91f0b64a-ddc7-4627-b501-826ef61a296a".to_string(),
        description: "Предварительно созданная сеть.".to_string(),
        create_time: "2025-07-23T16:59:43.699263".to_string(),
        shared_from: None,
    }
}

fn specs(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

fn general_purpose_flavor(id: &str, name: &str, ram: u32, vcpus: u32, series: &str) -> Flavor {
    Flavor {
        id: id.to_string(),
        name: name.to_string(),
        description: None,
        ram,
        vcpus,
        gpus: 0,
        extra_specs: specs(json!({
            "family": "general-purpose",
            "series": series,
            "hardware_group": "public"
        })),
        extra: Map::new(),
    }
}

fn boot_volume(id: &str, name: &str, disk_type: &str, read_iops: u32, write_iops: u32) -> BootVolume {
    BootVolume {
        size: 25,
        volume_type: Some(VolumeType {
            id: id.to_string(),
            name: name.to_string(),
            extra_specs: specs(json!({
                "disk_type": disk_type,
                "max_read_iops": read_iops,
                "max_write_iops": write_iops
            })),
        }),
    }
}

fn region_1() -> RegionDescriptor {
    RegionDescriptor {
        key: RegionKey::Region1,
        region: placement("0c530dd3-eaae-4216-8f9d-9b5710a7cc30", "ru-central1"),
        availability_zone: placement("d3p1k01", "ru-central1-a"),
        subnet: Subnet {
            name: "default-ru-central1".to_string(),
            id: "5f344f27-4af8-4e57-b56a-bd8787647b01".to_string(),
            network: default_network(),
        },
        flavor: general_purpose_flavor(
            "c85dd16b-25c8-4ecf-9306-1fd2ebf2d9ce",
            "b2.large.1",
            2048,
            2,
            "Intel Cascade Lake 2.2 GHz",
        ),
        boot_volume: boot_volume(
            "076482c0-0367-4dee-a16f-2c6673a97f7f",
            "dorado-sp07",
            "High cluster 4",
            15000,
            5000,
        ),
    }
}

fn region_2() -> RegionDescriptor {
    RegionDescriptor {
        key: RegionKey::Region2,
        region: placement("02d93c85-e2b8-4708-bb16-1cff29f30af1", "ru-central2"),
        availability_zone: placement("d4p1", "ru-central2-a"),
        subnet: Subnet {
            name: "default-ru-central2".to_string(),
            id: "4293bfb7-ee13-41c9-9b86-8fe9e23148c0".to_string(),
            network: default_network(),
        },
        flavor: general_purpose_flavor(
            "b4e6d4a4-e6bb-4769-ab13-5423f51eb4f9",
            "b5.2xlarge.4",
            28672,
            8,
            "Intel Ice lake 2.8 GHz",
        ),
        boot_volume: boot_volume(
            "2207b7c5-5848-477b-9745-8cb422af1705",
            "average",
            "Average",
            10000,
            3000,
        ),
    }
}
