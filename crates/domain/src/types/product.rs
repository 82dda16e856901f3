//! Product and topology descriptors
//!
//! Each managed database product is served by its own manager API. The
//! per-product differences (URL prefix, VM provider tag, action names)
//! live in a single [`ProductProfile`] record instead of string-keyed
//! tables.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::DbaasError;

/// Managed database product
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductKind {
    #[serde(rename = "mysql")]
    MySql,
    Redis,
    #[serde(rename = "opensearch")]
    OpenSearch,
}

/// Static per-product configuration record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProductProfile {
    /// Path prefix of the product's manager API (`mysql-manager`)
    pub api_prefix: &'static str,
    /// `provider` tag carried by the product's order items
    pub provider: &'static str,
    /// Whether the managed item has an `instance` child item
    pub has_instance_items: bool,
    /// Action that attaches a public IP
    pub add_public_ip_action: &'static str,
    /// Action that detaches the public IP
    pub disable_public_ip_action: &'static str,
    /// Action that deletes the cluster
    pub delete_action: &'static str,
    /// Action that adds VMs to a multi-node deployment
    pub add_nodes_action: &'static str,
}

const MYSQL_PROFILE: ProductProfile = ProductProfile {
    api_prefix: "mysql-manager",
    provider: "mysql_vm",
    has_instance_items: true,
    add_public_ip_action: "add_fip_managed_mysql",
    disable_public_ip_action: "disable_fip_managed_mysql",
    delete_action: "delete_cluster_for_mysql",
    add_nodes_action: "add_vm_to_mysql",
};

const REDIS_PROFILE: ProductProfile = ProductProfile {
    api_prefix: "redis-manager",
    provider: "redis_vm",
    has_instance_items: true,
    add_public_ip_action: "add_fip_managed_redis",
    disable_public_ip_action: "disable_fip_managed_redis",
    delete_action: "delete_cluster_for_redis",
    add_nodes_action: "add_vm_to_redis",
};

const OPENSEARCH_PROFILE: ProductProfile = ProductProfile {
    api_prefix: "opensearch-manager",
    provider: "opensearch_vm",
    has_instance_items: false,
    add_public_ip_action: "add_fip_managed_opensearch",
    disable_public_ip_action: "disable_fip_managed_opensearch",
    delete_action: "delete_cluster_for_opensearch",
    add_nodes_action: "add_vm_to_opensearch_cluster",
};

impl ProductKind {
    /// Configuration record for this product
    pub const fn profile(self) -> &'static ProductProfile {
        match self {
            Self::MySql => &MYSQL_PROFILE,
            Self::Redis => &REDIS_PROFILE,
            Self::OpenSearch => &OPENSEARCH_PROFILE,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MySql => "mysql",
            Self::Redis => "redis",
            Self::OpenSearch => "opensearch",
        }
    }
}

impl fmt::Display for ProductKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Deployment shape of a cluster
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Topology {
    #[serde(rename = "mysql-standalone")]
    MySqlStandalone,
    #[serde(rename = "mysql-replica")]
    MySqlReplica,
    RedisStandalone,
    RedisSentinel,
    RedisCluster,
    #[serde(rename = "opensearch-single")]
    OpenSearchSingle,
    #[serde(rename = "opensearch-cluster")]
    OpenSearchCluster,
}

impl Topology {
    pub const ALL: [Self; 7] = [
        Self::MySqlStandalone,
        Self::MySqlReplica,
        Self::RedisStandalone,
        Self::RedisSentinel,
        Self::RedisCluster,
        Self::OpenSearchSingle,
        Self::OpenSearchCluster,
    ];

    pub const fn product(self) -> ProductKind {
        match self {
            Self::MySqlStandalone | Self::MySqlReplica => ProductKind::MySql,
            Self::RedisStandalone | Self::RedisSentinel | Self::RedisCluster => ProductKind::Redis,
            Self::OpenSearchSingle | Self::OpenSearchCluster => ProductKind::OpenSearch,
        }
    }

    /// Whether the cluster is described by `flavor_cluster` node groups
    /// rather than a single flavor and boot volume.
    pub const fn has_node_groups(self) -> bool {
        matches!(self, Self::OpenSearchCluster)
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MySqlStandalone => "mysql-standalone",
            Self::MySqlReplica => "mysql-replica",
            Self::RedisStandalone => "redis-standalone",
            Self::RedisSentinel => "redis-sentinel",
            Self::RedisCluster => "redis-cluster",
            Self::OpenSearchSingle => "opensearch-single",
            Self::OpenSearchCluster => "opensearch-cluster",
        }
    }
}

impl fmt::Display for Topology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Topology {
    type Err = DbaasError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|topology| topology.as_str() == s)
            .ok_or_else(|| DbaasError::InvalidInput(format!("Unsupported product type: {s}")))
    }
}
