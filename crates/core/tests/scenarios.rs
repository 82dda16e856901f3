//! Full collections against a stateful fake of the MySQL manager

mod support;

use std::sync::Arc;

use dbaas_core::{run_collection, ApiRequest, ApiResponse, HttpMethod};
use dbaas_domain::{DbaasError, ProductKind, Topology};
use parking_lot::Mutex;
use serde_json::{json, Value};
use support::fixtures::{
    accepted, active_status_command, command, ok, order, order_suffix, service_status_suffix,
    STATUS_COMMAND_ID,
};
use support::{context, ScriptedTransport};

/// Live configuration the fake applies order actions to
struct MySqlState {
    config: Value,
    deleted: bool,
}

impl MySqlState {
    fn new() -> Self {
        Self {
            config: json!({
                "boot_volume": {"size": 10},
                "public_ip": false,
                "number_of_vms": 1,
                "mysql_version": "8.4.4",
                "service": {"description": "MySQL standalone AT region-1"},
                "settings": {"mysqld": {"max_user_connections": 151}}
            }),
            deleted: false,
        }
    }

    fn render(&self) -> ApiResponse {
        let mut body = order(ProductKind::MySql, "success", self.config.clone());
        if self.deleted {
            for item in body["data"].as_array_mut().unwrap() {
                item["data"]["state"] = json!("deleted");
            }
        }
        ok(body)
    }

    fn apply(&mut self, request: &ApiRequest) -> ApiResponse {
        let action = request.path.rsplit('/').next().unwrap_or_default();
        let attrs = request.body.as_ref().unwrap()["order"]["attrs"].clone();
        match action {
            "extend_disk_size" => self.config["boot_volume"]["size"] = attrs["new_size"].clone(),
            "add_fip_managed_mysql" => {
                self.config["public_ip"] = json!(true);
                self.config["bandwidth"] = attrs["bandwidth"].clone();
            }
            "change_bandwidth_managed" => self.config["bandwidth"] = attrs["bandwidth"].clone(),
            "disable_fip_managed_mysql" => self.config["public_ip"] = json!(false),
            "edit_mysql_vm_settings" => {
                self.config["settings"]["mysqld"]["max_user_connections"] =
                    attrs["parameters"]["max_user_connections"].clone();
            }
            "delete_cluster_for_mysql" => self.deleted = true,
            other => return ApiResponse::new(400, format!("unknown action {other}")),
        }
        ok(json!({}))
    }
}

fn fake_mysql(status_command: ApiResponse) -> (Arc<ScriptedTransport>, Arc<Mutex<MySqlState>>) {
    let state = Arc::new(Mutex::new(MySqlState::new()));
    let transport = ScriptedTransport::new();

    let read = Arc::clone(&state);
    let write = Arc::clone(&state);
    transport
        .respond(HttpMethod::Post, "order-service/orders", vec![ok(json!([{"id": "order-1"}]))])
        .respond(
            HttpMethod::Get,
            "order-service/orders",
            vec![ok(json!({"list": [{"id": "order-1", "status": "success"}]}))],
        )
        .respond_with(HttpMethod::Get, &order_suffix(), move |_| read.lock().render())
        .respond_with(HttpMethod::Patch, "", move |request| write.lock().apply(request))
        .respond(HttpMethod::Get, &service_status_suffix(ProductKind::MySql), vec![accepted(STATUS_COMMAND_ID)])
        .respond(HttpMethod::Get, &format!("commands/{STATUS_COMMAND_ID}"), vec![status_command])
        .respond(HttpMethod::Post, "", vec![accepted("service-cmd")])
        .respond(HttpMethod::Get, "commands/service-cmd", vec![command("pending"), command("success")]);
    (transport, state)
}

fn patched_actions(transport: &ScriptedTransport) -> Vec<String> {
    transport
        .mutations()
        .into_iter()
        .filter(|request| request.method == HttpMethod::Patch)
        .filter_map(|request| request.path.rsplit('/').next().map(str::to_string))
        .collect()
}

#[tokio::test(start_paused = true)]
async fn mysql_standalone_collection_runs_every_step() {
    let (transport, state) = fake_mysql(active_status_command());
    let ctx = context(transport.clone());

    let report = run_collection(&ctx, Topology::MySqlStandalone).await.unwrap();

    assert_eq!(
        report.step_names(),
        vec![
            "create_cluster",
            "extend_disk",
            "add_public_ip",
            "change_bandwidth",
            "disable_public_ip",
            "create_user",
            "create_database",
            "edit_settings",
            "delete_cluster",
        ]
    );
    assert_eq!(
        patched_actions(&transport),
        vec![
            "extend_disk_size",
            "add_fip_managed_mysql",
            "change_bandwidth_managed",
            "disable_fip_managed_mysql",
            "edit_mysql_vm_settings",
            "delete_cluster_for_mysql",
        ]
    );

    let handle = report.cluster.unwrap();
    assert!(handle.cluster_name.starts_with("mysql-vm-"));
    let state = state.lock();
    assert!(state.deleted);
    assert_eq!(state.config["boot_volume"]["size"], 11);
    assert_eq!(state.config["public_ip"], false);
}

#[tokio::test(start_paused = true)]
async fn collection_stops_at_first_failure_and_keeps_cluster() {
    let inactive = ok(json!({
        "status": "success",
        "response": {"status": "stopped", "is_active": false}
    }));
    let (transport, state) = fake_mysql(inactive);
    let ctx = context(transport.clone());

    let err = run_collection(&ctx, Topology::MySqlStandalone).await.unwrap_err();

    assert!(matches!(err, DbaasError::NotReady(_)), "{err:?}");
    assert!(patched_actions(&transport).is_empty());
    assert!(!state.lock().deleted);
}
