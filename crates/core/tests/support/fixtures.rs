use dbaas_core::ApiResponse;
use dbaas_domain::{ClusterHandle, ProductKind, Topology};
use serde_json::{json, Value};

pub const ORDER_ID: &str = "order-1";
pub const MANAGED_ID: &str = "managed-1";
pub const INSTANCE_ID: &str = "vm-1";
pub const STATUS_COMMAND_ID: &str = "status-cmd-1";

pub fn handle(topology: Topology) -> ClusterHandle {
    ClusterHandle {
        order_id: ORDER_ID.to_string(),
        item_id: MANAGED_ID.to_string(),
        cluster_name: format!("{}-ab12", topology.product()),
        topology,
    }
}

/// Order detail with a managed item carrying `config`, plus its instance
pub fn order(product: ProductKind, status: &str, config: Value) -> Value {
    let mut data = vec![json!({
        "item_id": MANAGED_ID,
        "type": "managed",
        "provider": product.profile().provider,
        "data": { "state": "on", "config": config },
    })];
    if product.profile().has_instance_items {
        data.push(json!({
            "item_id": INSTANCE_ID,
            "type": "instance",
            "parent": MANAGED_ID,
            "data": { "state": "on" },
        }));
    }
    json!({ "id": ORDER_ID, "status": status, "data": data })
}

pub fn order_reply(product: ProductKind, status: &str, config: Value) -> ApiResponse {
    ok(order(product, status, config))
}

pub fn ok(body: Value) -> ApiResponse {
    ApiResponse::new(200, body.to_string())
}

pub fn accepted(command_id: &str) -> ApiResponse {
    ApiResponse::new(
        202,
        json!({ "url": format!("https://api.example/commands/{command_id}") }).to_string(),
    )
}

pub fn command(status: &str) -> ApiResponse {
    ok(json!({ "status": status, "response": null, "error": null }))
}

pub fn active_status_command() -> ApiResponse {
    ok(json!({
        "status": "success",
        "response": { "status": "active", "is_active": true },
        "error": null
    }))
}

/// Path suffix of the service-status request for the default item
pub fn service_status_suffix(product: ProductKind) -> String {
    let id = if product.profile().has_instance_items { INSTANCE_ID } else { MANAGED_ID };
    format!("instances/{id}:get-service-status")
}

pub fn order_suffix() -> String {
    format!("order-service/orders/{ORDER_ID}")
}

pub fn action_suffix(action: &str) -> String {
    format!("order-service/orders/actions/{action}")
}
