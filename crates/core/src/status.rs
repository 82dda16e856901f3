//! Cluster readiness check run before mutating operations

use dbaas_domain::{AcceptedCommand, Command, CommandStatus, DbaasError, OrderStatus, ProductKind, Result};
use tracing::{info, instrument, warn};

use crate::client::{command_id, ManagerClient};
use crate::context::SuiteContext;
use crate::poller::PollStep;

/// How readiness was established
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Readiness {
    /// The service-status command reported an active service
    Active,
    /// Status endpoint unavailable (OpenSearch 404); only the order status was checked
    OrderOnly,
}

/// Fail unless the cluster's service reports `active`
///
/// Resolves the VM instance behind the managed item (or the managed item
/// itself for products without instance items), issues a service-status
/// command and inspects its result. Each failed condition yields its own
/// error.
#[instrument(skip(ctx), fields(product = %product))]
pub async fn check_cluster_status(
    ctx: &SuiteContext,
    product: ProductKind,
    order_id: &str,
    item_id: &str,
) -> Result<Readiness> {
    let client = ctx.client(product);
    let profile = product.profile();

    let order = client.get_order(order_id).await?;
    let managed = order.managed_item(product).ok_or_else(|| {
        DbaasError::MissingItem(format!("no managed {product} item in order {order_id}"))
    })?;

    let instance_id = if profile.has_instance_items {
        order
            .instance_item(item_id)
            .map(|instance| instance.item_id.clone())
            .ok_or_else(|| {
                DbaasError::MissingItem(format!("no instance item with parent {item_id} in order {order_id}"))
            })?
    } else {
        managed.item_id.clone()
    };

    let response = client.request_service_status(&instance_id).await?;
    if response.status != 202 {
        if product == ProductKind::OpenSearch && response.status == 404 {
            warn!(order_id, "service_status_unsupported_checking_order_status");
            if order.status == OrderStatus::Error {
                return Err(DbaasError::OperationFailed(format!(
                    "{product} cluster order {order_id} is in error state"
                )));
            }
            return Ok(Readiness::OrderOnly);
        }
        return Err(DbaasError::from_status(
            "get_service_status",
            202,
            response.status,
            &response.body,
        ));
    }

    let accepted: AcceptedCommand = response.json()?;
    let command_id = command_id(&accepted)?;
    let command = await_command_result(ctx, &client, &command_id).await?;

    info!(
        command_status = %command.status,
        service_status = ?command.response.as_ref().and_then(|r| r.status.as_deref()),
        is_active = ?command.response.as_ref().and_then(|r| r.is_active),
        "service_status_received"
    );
    evaluate_status_command(product, &command)?;
    Ok(Readiness::Active)
}

/// Fetch the command once; poll only while it is still pending
async fn await_command_result(
    ctx: &SuiteContext,
    client: &ManagerClient,
    command_id: &str,
) -> Result<Command> {
    let command = client.get_command(command_id).await?;
    if command.status != CommandStatus::Pending {
        return Ok(command);
    }

    ctx.poller(ctx.polling().command)
        .run("service_status_command", move || probe_pending_command(client, command_id))
        .await
}

async fn probe_pending_command(client: &ManagerClient, command_id: &str) -> Result<PollStep<Command>> {
    let command = client.get_command(command_id).await?;
    Ok(if command.status == CommandStatus::Pending {
        PollStep::Pending
    } else {
        PollStep::Ready(command)
    })
}

fn evaluate_status_command(product: ProductKind, command: &Command) -> Result<()> {
    if command.status != CommandStatus::Success {
        return Err(DbaasError::NotReady(format!(
            "{product} status command did not succeed: {} ({})",
            command.status,
            command.error_message()
        )));
    }

    let response = command.response.clone().unwrap_or_default();
    let service_status = response.status.as_deref().unwrap_or("unknown");
    if service_status != "active" {
        return Err(DbaasError::NotReady(format!(
            "{product} cluster is not in active state: {service_status}"
        )));
    }
    if response.is_active != Some(true) {
        return Err(DbaasError::NotReady(format!("{product} cluster is not active (is_active: false)")));
    }
    Ok(())
}
