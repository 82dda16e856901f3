//! Orders and the items they carry

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::flavor::{BootVolume, Flavor};
use super::product::ProductKind;

/// Lifecycle status of an order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Success,
    Error,
    /// Any intermediate status the control plane reports
    #[serde(other)]
    Other,
}

crate::impl_domain_status_conversions!(OrderStatus {
    Pending => "pending",
    Success => "success",
    Error => "error",
    Other => "other",
});

impl OrderStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Success | Self::Error)
    }
}

/// Order detail as returned by `GET .../orders/{id}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    pub status: OrderStatus,
    #[serde(default)]
    pub data: Vec<OrderItem>,
    #[serde(default)]
    pub last_action: Option<Value>,
}

impl Order {
    /// The unique `managed` item for the given product
    pub fn managed_item(&self, product: ProductKind) -> Option<&OrderItem> {
        let provider = product.profile().provider;
        self.data
            .iter()
            .find(|item| item.kind == ItemKind::Managed && item.provider.as_deref() == Some(provider))
    }

    /// The `instance` item whose parent is `parent_id`
    pub fn instance_item(&self, parent_id: &str) -> Option<&OrderItem> {
        self.data
            .iter()
            .find(|item| item.kind == ItemKind::Instance && item.parent.as_deref() == Some(parent_id))
    }

    /// Whether every item in the order reports the `deleted` state
    pub fn all_items_deleted(&self) -> bool {
        !self.data.is_empty() && self.data.iter().all(OrderItem::is_deleted)
    }
}

/// Entry of `GET .../orders?page&per_page`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderSummary {
    pub id: String,
    pub status: OrderStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderPage {
    #[serde(default)]
    pub list: Vec<OrderSummary>,
}

/// Element of the array returned by order creation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatedOrder {
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Managed,
    Instance,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItem {
    pub item_id: String,
    #[serde(rename = "type")]
    pub kind: ItemKind,
    #[serde(default)]
    pub provider: Option<String>,
    #[serde(default)]
    pub parent: Option<String>,
    #[serde(default)]
    pub data: ItemData,
}

impl OrderItem {
    pub fn config(&self) -> &ClusterConfig {
        &self.data.config
    }

    pub fn is_deleted(&self) -> bool {
        self.data.state.as_deref() == Some("deleted")
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ItemData {
    pub state: Option<String>,
    pub config: ClusterConfig,
}

/// Live cluster configuration nested in `data.config`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterConfig {
    pub flavor: Option<Flavor>,
    pub boot_volume: Option<BootVolume>,
    pub public_ip: Option<bool>,
    pub bandwidth: Option<u32>,
    pub number_of_vms: Option<u32>,
    pub service_type: Option<String>,
    pub mysql_version: Option<String>,
    pub redis_version: Option<String>,
    pub settings: Option<Value>,
    pub service: Option<ServiceConfig>,
    pub flavor_cluster: Option<FlavorCluster>,
    pub maintance_window: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ClusterConfig {
    pub fn public_ip_enabled(&self) -> bool {
        self.public_ip.unwrap_or(false)
    }

    /// `settings.mysqld.max_user_connections`
    pub fn max_user_connections(&self) -> Option<u64> {
        self.settings
            .as_ref()
            .and_then(|settings| settings.pointer("/mysqld/max_user_connections"))
            .and_then(Value::as_u64)
    }

    pub fn boot_volume_size(&self) -> Option<u32> {
        self.boot_volume.as_ref().map(|volume| volume.size)
    }
}

/// `config.service` block populated once the service is running
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub description: Option<String>,
    pub service_type: Option<String>,
    pub settings: Map<String, Value>,
    pub aof: Option<AofSettings>,
    pub rdb: Option<RdbSettings>,
    pub backup: Option<AutoBackup>,
    pub servers: Vec<ServerRef>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AofSettings {
    pub fsync: Option<String>,
    pub enabled: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RdbSettings {
    pub save: Option<String>,
    pub enabled: Option<bool>,
    pub compression: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutoBackup {
    pub enabled: Option<bool>,
    pub schedule_time: Option<String>,
    pub retention_number: Option<u32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerRef {
    pub name: String,
}

/// Node groups of a multi-group topology
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FlavorCluster {
    pub data_group: NodeGroup,
    pub manager_group: NodeGroup,
    pub dashboard_group: NodeGroup,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeGroup {
    pub number_of_vms: u32,
    pub flavor: Option<Flavor>,
    pub boot_volume: Option<BootVolume>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_ip: Option<bool>,
}

/// Entry of `GET .../services/{cluster}/backups`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Backup {
    pub backup_name: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub size: Option<Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BackupList {
    pub backups: Vec<Backup>,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn sample_order() -> Order {
        serde_json::from_value(json!({
            "id": "order-1",
            "status": "success",
            "data": [
                {
                    "item_id": "managed-1",
                    "type": "managed",
                    "provider": "mysql_vm",
                    "data": {
                        "config": {
                            "boot_volume": {"size": 10},
                            "public_ip": true,
                            "bandwidth": 100,
                            "settings": {"mysqld": {"max_user_connections": 151}}
                        }
                    }
                },
                {
                    "item_id": "vm-1",
                    "type": "instance",
                    "parent": "managed-1",
                    "data": {"state": "on"}
                },
                {"item_id": "sg-1", "type": "security_group"}
            ]
        }))
        .unwrap()
    }

    #[test]
    fn finds_managed_and_instance_items() {
        let order = sample_order();
        let managed = order.managed_item(ProductKind::MySql).unwrap();
        assert_eq!(managed.item_id, "managed-1");
        assert!(order.managed_item(ProductKind::Redis).is_none());
        assert_eq!(order.instance_item("managed-1").unwrap().item_id, "vm-1");
        assert!(order.instance_item("missing").is_none());
    }

    #[test]
    fn reads_nested_config_values() {
        let order = sample_order();
        let config = order.managed_item(ProductKind::MySql).unwrap().config();
        assert_eq!(config.boot_volume_size(), Some(10));
        assert!(config.public_ip_enabled());
        assert_eq!(config.bandwidth, Some(100));
        assert_eq!(config.max_user_connections(), Some(151));
    }

    #[test]
    fn unknown_status_and_item_type_do_not_fail_parsing() {
        let order: Order = serde_json::from_value(json!({
            "id": "o",
            "status": "changing",
            "data": [{"item_id": "x", "type": "subnet"}]
        }))
        .unwrap();
        assert_eq!(order.status, OrderStatus::Other);
        assert!(!order.status.is_terminal());
        assert_eq!(order.data[0].kind, ItemKind::Other);
    }

    #[test]
    fn all_items_deleted_requires_every_item() {
        let mut order = sample_order();
        assert!(!order.all_items_deleted());
        for item in &mut order.data {
            item.data.state = Some("deleted".to_string());
        }
        assert!(order.all_items_deleted());
    }
}
