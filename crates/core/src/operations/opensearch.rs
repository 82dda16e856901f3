//! OpenSearch-only operations

use dbaas_domain::{ClusterConfig, ClusterHandle, DbaasError, GroupCounts, Result};
use serde_json::json;
use tracing::{info, instrument};

use super::ClusterOperations;
use crate::context::SuiteContext;

/// Node-group scaling of the OpenSearch manager
#[derive(Clone, Copy)]
pub struct OpenSearchOperations<'a> {
    common: ClusterOperations<'a>,
}

impl<'a> OpenSearchOperations<'a> {
    pub fn new(ctx: &'a SuiteContext) -> Self {
        Self { common: ClusterOperations::new(ctx) }
    }

    /// Add VMs to each node group of a cluster topology
    ///
    /// Returns the per-group counts observed once the change lands.
    #[instrument(skip(self, handle), fields(order_id = %handle.order_id))]
    pub async fn add_group_nodes(
        &self,
        handle: &ClusterHandle,
        add: GroupCounts,
    ) -> Result<GroupCounts> {
        if !handle.topology.has_node_groups() {
            return Err(DbaasError::InvalidInput(format!(
                "{} is not a node-group topology",
                handle.topology
            )));
        }
        if add == GroupCounts::default() {
            return Err(DbaasError::InvalidInput("no nodes requested".to_string()));
        }
        self.common.ensure_ready(handle).await?;

        let ctx = self.common.context();
        let config = self.common.managed_config(handle).await?;
        let current = group_counts(&config).ok_or_else(|| {
            DbaasError::MissingItem(format!("order {} has no flavor_cluster", handle.order_id))
        })?;
        let expected = GroupCounts {
            data: current.data + add.data,
            manager: current.manager + add.manager,
            dashboard: current.dashboard + add.dashboard,
        };
        info!(current = ?current, expected = ?expected, "group_nodes_adding");

        let action = handle.product().profile().add_nodes_action;
        let attrs = json!({
            "data_group": { "quantity": add.data },
            "manager_group": { "quantity": add.manager },
            "dashboard_group": { "quantity": add.dashboard },
        });
        self.common.submit(handle, action, attrs).await?;

        self.common
            .await_managed(handle, action, ctx.polling().scaling, |config| {
                (group_counts(config) == Some(expected)).then_some(())
            })
            .await?;
        info!(counts = ?expected, "group_nodes_added");
        Ok(expected)
    }
}

fn group_counts(config: &ClusterConfig) -> Option<GroupCounts> {
    config.flavor_cluster.as_ref().map(|groups| GroupCounts {
        data: groups.data_group.number_of_vms,
        manager: groups.manager_group.number_of_vms,
        dashboard: groups.dashboard_group.number_of_vms,
    })
}
