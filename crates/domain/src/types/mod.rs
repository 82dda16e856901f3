//! Domain types and models

pub mod cluster;
pub mod command;
pub mod flavor;
pub mod order;
pub mod product;
pub mod region;

pub use cluster::{ClusterHandle, GroupCounts, RedisSettingsChange, ToggleOutcome};
pub use command::{AcceptedCommand, Command, CommandResponse, CommandStatus};
pub use flavor::{BootVolume, Flavor, FlavorSize, VolumeType};
pub use order::{
    AofSettings, AutoBackup, Backup, BackupList, ClusterConfig, CreatedOrder, FlavorCluster,
    ItemData, ItemKind, NodeGroup, Order, OrderItem, OrderPage, OrderStatus, OrderSummary,
    RdbSettings, ServerRef, ServiceConfig,
};
pub use product::{ProductKind, ProductProfile, Topology};
pub use region::{Network, Placement, RegionDescriptor, RegionKey, Subnet};
