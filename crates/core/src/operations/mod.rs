//! Cluster operations
//!
//! Every operation follows the same shape: check the cluster is ready,
//! read the current configuration, submit one mutating request, then
//! poll until the change is observed. Creation and deletion skip the
//! readiness check.
//!
//! [`ClusterOperations`] carries what all products share. The product
//! modules add the operations only one product offers.

pub mod mysql;
pub mod opensearch;
pub mod redis;

use dbaas_domain::constants::{
    INITIAL_PUBLIC_IP_BANDWIDTH, RESIZE_TARGET_RAM_MB, RESIZE_TARGET_VCPUS,
};
use dbaas_domain::{
    AcceptedCommand, ClusterConfig, ClusterHandle, Command, CommandStatus, DbaasError, Flavor,
    FlavorSize, Order, OrderStatus, PollPolicy, ProductKind, Result, ToggleOutcome, Topology,
};
use serde_json::{json, Value};
use tracing::{debug, info, instrument};

pub use self::mysql::MySqlOperations;
pub use self::opensearch::OpenSearchOperations;
pub use self::redis::RedisOperations;
use crate::client::{command_id, ManagerClient};
use crate::context::SuiteContext;
use crate::orders::{build_order, OrderInputs};
use crate::poller::PollStep;
use crate::status::{check_cluster_status, Readiness};

/// Target of every flavor resize
pub const RESIZE_TARGET: FlavorSize = FlavorSize { ram: RESIZE_TARGET_RAM_MB, vcpus: RESIZE_TARGET_VCPUS };

/// Operations common to every product
#[derive(Clone, Copy)]
pub struct ClusterOperations<'a> {
    ctx: &'a SuiteContext,
}

impl<'a> ClusterOperations<'a> {
    pub fn new(ctx: &'a SuiteContext) -> Self {
        Self { ctx }
    }

    pub fn context(&self) -> &'a SuiteContext {
        self.ctx
    }

    /// Order a new cluster and wait until it is provisioned
    #[instrument(skip(self))]
    pub async fn create_cluster(&self, topology: Topology) -> Result<ClusterHandle> {
        let product = topology.product();
        let client = self.ctx.client(product);
        let cluster_name = self.ctx.generator().cluster_name(topology);
        let body = build_order(
            topology,
            OrderInputs {
                cluster_name: &cluster_name,
                region: self.ctx.region(),
                defaults: &self.ctx.config().order_defaults,
            },
        );

        info!(cluster_name = %cluster_name, region = %self.ctx.region().key, "cluster_ordering");
        let order_id = client.create_order(body).await?;

        let (client_ref, order_ref) = (&client, order_id.as_str());
        self.ctx
            .poller(self.ctx.polling().provisioning)
            .run("create_cluster", move || probe_order_list(client_ref, order_ref))
            .await?;

        let order = client.get_order(&order_id).await?;
        let item_id = order
            .managed_item(product)
            .map(|item| item.item_id.clone())
            .ok_or_else(|| {
                DbaasError::MissingItem(format!("no managed {product} item in order {order_id}"))
            })?;

        info!(order_id = %order_id, item_id = %item_id, cluster_name = %cluster_name, "cluster_created");
        Ok(ClusterHandle { order_id, item_id, cluster_name, topology })
    }

    /// Readiness gate run before every mutating request
    pub async fn ensure_ready(&self, handle: &ClusterHandle) -> Result<Readiness> {
        check_cluster_status(self.ctx, handle.product(), &handle.order_id, &handle.item_id).await
    }

    /// Grow the boot disk by 1 GB; returns the new size
    #[instrument(skip(self, handle), fields(order_id = %handle.order_id))]
    pub async fn extend_disk(&self, handle: &ClusterHandle) -> Result<u32> {
        self.ensure_ready(handle).await?;
        let config = self.managed_config(handle).await?;

        let grouped = handle.topology.has_node_groups();
        let current = disk_size(&config, grouped).ok_or_else(|| {
            DbaasError::MissingItem(format!("order {} has no boot volume size", handle.order_id))
        })?;
        let new_size = current + 1;
        info!(current, new_size, "disk_extending");

        let (action, attrs) = if grouped {
            (
                "extend_disk_size_opensearch_cluster",
                json!({
                    "data_group": { "new_size": new_size },
                    "manager_group": { "new_size": new_size },
                    "dashboard_group": { "new_size": 0 },
                }),
            )
        } else {
            ("extend_disk_size", json!({ "new_size": new_size }))
        };
        self.submit(handle, action, attrs).await?;

        let observed = self
            .await_order(handle, "extend_disk", self.ctx.polling().modification, |order| {
                (order.status == OrderStatus::Success).then(|| {
                    order.managed_item(handle.product()).and_then(|item| disk_size(item.config(), grouped))
                })
            })
            .await?;

        if observed != Some(new_size) {
            return Err(DbaasError::Verification(format!(
                "disk size is {observed:?} after extending to {new_size}"
            )));
        }
        info!(new_size, "disk_extended");
        Ok(new_size)
    }

    /// Attach a public IP with the initial bandwidth
    pub async fn add_public_ip(&self, handle: &ClusterHandle) -> Result<ToggleOutcome> {
        self.toggle_public_ip(handle, true).await
    }

    /// Detach the public IP
    pub async fn disable_public_ip(&self, handle: &ClusterHandle) -> Result<ToggleOutcome> {
        self.toggle_public_ip(handle, false).await
    }

    #[instrument(skip(self, handle), fields(order_id = %handle.order_id))]
    async fn toggle_public_ip(&self, handle: &ClusterHandle, enable: bool) -> Result<ToggleOutcome> {
        self.ensure_ready(handle).await?;
        let config = self.managed_config(handle).await?;
        if config.public_ip_enabled() == enable {
            info!(public_ip = enable, "public_ip_already_in_state");
            return Ok(ToggleOutcome::Unchanged);
        }

        let profile = handle.product().profile();
        let base = if enable { profile.add_public_ip_action } else { profile.disable_public_ip_action };
        let action = topology_action(handle.topology, base);
        let attrs = if enable { json!({ "bandwidth": INITIAL_PUBLIC_IP_BANDWIDTH }) } else { json!({}) };
        self.submit(handle, &action, attrs).await?;

        self.await_managed(handle, &action, self.ctx.polling().modification, |config| {
            (config.public_ip_enabled() == enable).then_some(())
        })
        .await?;
        info!(public_ip = enable, "public_ip_toggled");
        Ok(ToggleOutcome::Applied)
    }

    /// Switch to a different bandwidth; requires an attached public IP
    #[instrument(skip(self, handle), fields(order_id = %handle.order_id))]
    pub async fn change_bandwidth(&self, handle: &ClusterHandle) -> Result<u32> {
        self.ensure_ready(handle).await?;
        let config = self.managed_config(handle).await?;
        if !config.public_ip_enabled() {
            return Err(DbaasError::NotReady(
                "public IP must be attached before changing bandwidth".to_string(),
            ));
        }

        let current = config.bandwidth.unwrap_or(INITIAL_PUBLIC_IP_BANDWIDTH);
        let target = self.ctx.generator().bandwidth(current)?;
        info!(current, target, "bandwidth_changing");

        let action = topology_action(handle.topology, "change_bandwidth_managed");
        self.submit(handle, &action, json!({ "bandwidth": target })).await?;

        let public_ip = self
            .await_managed(handle, "change_bandwidth", self.ctx.polling().modification, |config| {
                (config.bandwidth == Some(target)).then(|| config.public_ip_enabled())
            })
            .await?;
        if !public_ip {
            return Err(DbaasError::Verification(format!(
                "public IP was detached while changing bandwidth to {target}"
            )));
        }
        info!(bandwidth = target, "bandwidth_changed");
        Ok(target)
    }

    /// Create a database user with generated credentials; returns the name
    #[instrument(skip(self, handle), fields(cluster = %handle.cluster_name))]
    pub async fn create_user(&self, handle: &ClusterHandle) -> Result<String> {
        self.ensure_ready(handle).await?;
        let generator = self.ctx.generator();
        let username = generator.username();
        let password = generator.password();
        let payload = match handle.product() {
            ProductKind::MySql => json!({
                "name": username,
                "password": password,
                "privileges": "ALL",
                "db_table": "*.*",
            }),
            ProductKind::Redis => json!({
                "name": username,
                "password": password,
                "rules": "~* +@all",
                "should_be_admin": false,
            }),
            ProductKind::OpenSearch => json!({ "username": username, "password": password }),
        };

        info!(username = %username, "user_creating");
        let accepted = self
            .ctx
            .client(handle.product())
            .submit_service_request(&handle.cluster_name, "users", Some(payload))
            .await?;
        self.await_command(handle.product(), &accepted, "create_user", self.ctx.polling().command)
            .await?;
        info!(username = %username, "user_created");
        Ok(username)
    }

    /// Resize to 8192 MB / 4 vCPUs, keeping every other flavor field
    #[instrument(skip(self, handle), fields(order_id = %handle.order_id))]
    pub async fn resize_flavor(&self, handle: &ClusterHandle) -> Result<FlavorSize> {
        self.ensure_ready(handle).await?;
        let config = self.managed_config(handle).await?;
        let grouped = handle.topology.has_node_groups();
        let missing =
            || DbaasError::MissingItem(format!("order {} has no flavor", handle.order_id));

        let (action, attrs) = if grouped {
            let (data, manager) = group_flavors(&config).ok_or_else(missing)?;
            if data.size() == RESIZE_TARGET && manager.size() == RESIZE_TARGET {
                info!("flavor_already_at_target");
                return Ok(RESIZE_TARGET);
            }
            (
                "resize_flavor_opensearch_cluster",
                json!({
                    "data_group": { "flavor": data.resized(RESIZE_TARGET) },
                    "manager_group": { "flavor": manager.resized(RESIZE_TARGET) },
                }),
            )
        } else {
            let flavor = config.flavor.as_ref().ok_or_else(missing)?;
            if flavor.size() == RESIZE_TARGET {
                info!("flavor_already_at_target");
                return Ok(RESIZE_TARGET);
            }
            info!(from_ram = flavor.ram, from_vcpus = flavor.vcpus, "flavor_resizing");
            ("resize_flavor", json!({ "flavor": flavor.resized(RESIZE_TARGET) }))
        };
        self.submit(handle, action, attrs).await?;

        self.await_managed(handle, action, self.ctx.polling().scaling, |config| {
            let resized = if grouped {
                group_flavors(config).is_some_and(|(data, manager)| {
                    data.size() == RESIZE_TARGET && manager.size() == RESIZE_TARGET
                })
            } else {
                config.flavor.as_ref().is_some_and(|flavor| flavor.size() == RESIZE_TARGET)
            };
            resized.then_some(())
        })
        .await?;

        self.ensure_ready(handle).await?;
        info!(ram = RESIZE_TARGET.ram, vcpus = RESIZE_TARGET.vcpus, "flavor_resized");
        Ok(RESIZE_TARGET)
    }

    /// Add `count` VMs to a MySQL or Redis deployment; returns the new VM count
    #[instrument(skip(self, handle), fields(order_id = %handle.order_id))]
    pub async fn add_nodes(&self, handle: &ClusterHandle, count: u32) -> Result<u32> {
        if handle.product() == ProductKind::OpenSearch {
            return Err(DbaasError::InvalidInput(
                "OpenSearch clusters scale per node group".to_string(),
            ));
        }
        if count == 0 {
            return Err(DbaasError::InvalidInput("node count must be positive".to_string()));
        }

        self.ensure_ready(handle).await?;
        let config = self.managed_config(handle).await?;
        let current = vm_count(&config, &handle.order_id)?;
        let expected = current + count;
        info!(current, expected, "nodes_adding");

        let action = handle.product().profile().add_nodes_action;
        self.submit(handle, action, json!({ "quantity": count })).await?;
        self.await_vm_count(handle, action, expected).await?;
        info!(number_of_vms = expected, "nodes_added");
        Ok(expected)
    }

    /// Delete the cluster and wait until it is gone
    ///
    /// No readiness check: a cluster in a failed state must stay deletable.
    #[instrument(skip(self, handle), fields(order_id = %handle.order_id))]
    pub async fn delete_cluster(&self, handle: &ClusterHandle) -> Result<()> {
        let product = handle.product();
        self.submit(handle, product.profile().delete_action, json!({})).await?;

        self.await_order(handle, "delete_cluster", self.ctx.polling().deletion, |order| {
            let gone = match order.managed_item(product) {
                None => true,
                Some(item) => item.is_deleted() || order.all_items_deleted(),
            };
            gone.then_some(())
        })
        .await?;
        info!(cluster_name = %handle.cluster_name, "cluster_deleted");
        Ok(())
    }

    /// Current configuration of the managed item
    pub(crate) async fn managed_config(&self, handle: &ClusterHandle) -> Result<ClusterConfig> {
        let order = self.client(handle).get_order(&handle.order_id).await?;
        order
            .managed_item(handle.product())
            .map(|item| item.config().clone())
            .ok_or_else(|| {
                DbaasError::MissingItem(format!(
                    "no managed {} item in order {}",
                    handle.product(),
                    handle.order_id
                ))
            })
    }

    pub(crate) fn client(&self, handle: &ClusterHandle) -> ManagerClient {
        self.ctx.client(handle.product())
    }

    pub(crate) async fn submit(&self, handle: &ClusterHandle, action: &str, attrs: Value) -> Result<()> {
        self.client(handle).order_action(action, &handle.order_id, &handle.item_id, attrs).await
    }

    /// Poll the order until `observe` extracts a value
    ///
    /// The observer sees each order before its status is inspected, so a
    /// terminal condition wins over a stale `error` status.
    pub(crate) async fn await_order<T, F>(
        &self,
        handle: &ClusterHandle,
        operation: &str,
        policy: PollPolicy,
        observe: F,
    ) -> Result<T>
    where
        F: Fn(&Order) -> Option<T>,
    {
        let client = self.client(handle);
        let (client, order_id, observe) = (&client, handle.order_id.as_str(), &observe);
        self.ctx
            .poller(policy)
            .run(operation, move || probe_order(client, order_id, observe))
            .await
    }

    /// [`Self::await_order`] over the managed item's configuration
    pub(crate) async fn await_managed<T, F>(
        &self,
        handle: &ClusterHandle,
        operation: &str,
        policy: PollPolicy,
        observe: F,
    ) -> Result<T>
    where
        F: Fn(&ClusterConfig) -> Option<T>,
    {
        let product = handle.product();
        self.await_order(handle, operation, policy, |order| {
            order.managed_item(product).and_then(|item| observe(item.config()))
        })
        .await
    }

    pub(crate) async fn await_vm_count(
        &self,
        handle: &ClusterHandle,
        operation: &str,
        expected: u32,
    ) -> Result<()> {
        self.await_managed(handle, operation, self.ctx.polling().scaling, |config| {
            (config.number_of_vms == Some(expected)).then_some(())
        })
        .await
    }

    /// Poll a command accepted with 202 until it succeeds
    pub(crate) async fn await_command(
        &self,
        product: ProductKind,
        accepted: &AcceptedCommand,
        operation: &str,
        policy: PollPolicy,
    ) -> Result<Command> {
        let command_id = command_id(accepted)?;
        debug!(operation, command_id = %command_id, "command_accepted");
        let client = self.ctx.client(product);
        let (client, command_id) = (&client, command_id.as_str());
        self.ctx
            .poller(policy)
            .run(operation, move || probe_command(client, command_id))
            .await
    }
}

/// Reject handles of another product
pub(crate) fn require_product(handle: &ClusterHandle, product: ProductKind) -> Result<()> {
    if handle.product() == product {
        Ok(())
    } else {
        Err(DbaasError::InvalidInput(format!(
            "{} cluster {} is not a {product} cluster",
            handle.product(),
            handle.cluster_name
        )))
    }
}

/// Action name, with the cluster suffix for multi-group topologies
fn topology_action(topology: Topology, base: &str) -> String {
    if topology.has_node_groups() {
        if base.ends_with("_opensearch") {
            format!("{base}_cluster")
        } else {
            format!("{base}_opensearch_cluster")
        }
    } else {
        base.to_string()
    }
}

fn disk_size(config: &ClusterConfig, grouped: bool) -> Option<u32> {
    if grouped {
        config
            .flavor_cluster
            .as_ref()
            .and_then(|groups| groups.data_group.boot_volume.as_ref())
            .map(|volume| volume.size)
    } else {
        config.boot_volume_size()
    }
}

fn group_flavors(config: &ClusterConfig) -> Option<(&Flavor, &Flavor)> {
    let groups = config.flavor_cluster.as_ref()?;
    Some((groups.data_group.flavor.as_ref()?, groups.manager_group.flavor.as_ref()?))
}

pub(crate) fn vm_count(config: &ClusterConfig, order_id: &str) -> Result<u32> {
    config
        .number_of_vms
        .ok_or_else(|| DbaasError::MissingItem(format!("order {order_id} has no number_of_vms")))
}

async fn probe_order<T, F>(client: &ManagerClient, order_id: &str, observe: &F) -> Result<PollStep<T>>
where
    F: Fn(&Order) -> Option<T>,
{
    let order = client.get_order(order_id).await?;
    if let Some(value) = observe(&order) {
        return Ok(PollStep::Ready(value));
    }
    if order.status == OrderStatus::Error {
        return Ok(PollStep::Failed(format!("order {order_id} reported status error")));
    }
    debug!(order_id, status = %order.status, "order_polled");
    Ok(PollStep::Pending)
}

async fn probe_order_list(client: &ManagerClient, order_id: &str) -> Result<PollStep<()>> {
    let page = client.list_orders().await?;
    let status = page.list.into_iter().find(|order| order.id == order_id).map(|order| order.status);
    debug!(order_id, status = ?status, "order_list_polled");
    Ok(match status {
        Some(OrderStatus::Success) => PollStep::Ready(()),
        Some(OrderStatus::Error) => {
            PollStep::Failed(format!("order {order_id} reported status error"))
        }
        _ => PollStep::Pending,
    })
}

async fn probe_command(client: &ManagerClient, command_id: &str) -> Result<PollStep<Command>> {
    let command = client.get_command(command_id).await?;
    debug!(command_id, status = %command.status, "command_polled");
    Ok(match command.status {
        CommandStatus::Success => PollStep::Ready(command),
        CommandStatus::Failed => {
            PollStep::Failed(format!("command {command_id} failed: {}", command.error_message()))
        }
        CommandStatus::Pending | CommandStatus::Other => PollStep::Pending,
    })
}
