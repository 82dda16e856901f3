//! Order bodies for every supported topology
//!
//! Builders are pure: the cluster name is generated by the caller and
//! the infrastructure selection comes from the region table.

use dbaas_domain::constants::{
    REDIS_DEFAULT_AOF_FSYNC, REDIS_DEFAULT_MAXMEMORY_POLICY, REDIS_DEFAULT_RDB_SAVE,
    REDIS_DEFAULT_TCP_BACKLOG, REDIS_DEFAULT_TCP_KEEPALIVE, REDIS_DEFAULT_TIMEOUT,
};
use dbaas_domain::{OrderDefaults, RegionDescriptor, Topology};
use serde_json::{json, Map, Value};

const MYSQL_VERSION: &str = "8.4.4";
const REDIS_VERSION: &str = "7.2.5";
const OPENSEARCH_VERSION: &str = "2.18.0";

/// Inputs shared by all order bodies
#[derive(Debug, Clone, Copy)]
pub struct OrderInputs<'a> {
    pub cluster_name: &'a str,
    pub region: &'a RegionDescriptor,
    pub defaults: &'a OrderDefaults,
}

/// `{ "order": { "attrs": ... } }` for the given topology
pub fn build_order(topology: Topology, inputs: OrderInputs<'_>) -> Value {
    let attrs = match topology {
        Topology::MySqlStandalone => mysql_attrs(inputs, "Standalone", 1),
        Topology::MySqlReplica => mysql_attrs(inputs, "Replica", 2),
        Topology::RedisStandalone => redis_attrs(inputs, "Standalone", 1),
        Topology::RedisSentinel => redis_attrs(inputs, "Sentinel", 3),
        Topology::RedisCluster => redis_attrs(inputs, "Cluster", 6),
        Topology::OpenSearchSingle => opensearch_single_attrs(inputs),
        Topology::OpenSearchCluster => opensearch_cluster_attrs(inputs),
    };
    json!({ "order": { "attrs": Value::Object(attrs) } })
}

/// Attributes every order carries regardless of product
fn common_attrs(inputs: OrderInputs<'_>) -> Map<String, Value> {
    let region = inputs.region;
    let defaults = inputs.defaults;
    let mut attrs = Map::new();
    attrs.insert("creator".into(), json!(defaults.creator));
    attrs.insert("public_ip".into(), json!(false));
    attrs.insert("cluster_name".into(), json!(inputs.cluster_name));
    attrs.insert("region".into(), json!(region.region));
    attrs.insert("availability_zone".into(), json!(region.availability_zone));
    attrs.insert("subnet".into(), json!(region.subnet));
    attrs.insert("security_groups".into(), json!(defaults.security_groups));
    attrs.insert("is_security_group_selected".into(), json!(true));
    attrs.insert("maintance_window".into(), json!(defaults.maintenance_window));
    attrs.insert("is_only_tls".into(), json!(true));
    attrs
}

fn mysql_attrs(inputs: OrderInputs<'_>, service_type: &str, vms: u32) -> Map<String, Value> {
    let mut attrs = common_attrs(inputs);
    let label = inputs.region.key.label();
    attrs.insert(
        "cluster_description".into(),
        json!(format!("MySQL {} AT {label}", service_type.to_lowercase())),
    );
    attrs.insert("mysql_version".into(), json!(MYSQL_VERSION));
    attrs.insert("number_of_vms".into(), json!(vms));
    attrs.insert("flavor".into(), json!(inputs.region.flavor));
    attrs.insert("boot_volume".into(), json!(inputs.region.boot_volume));
    attrs.insert("auto_backup".into(), json!({ "enabled": false }));
    attrs.insert("security_group".into(), json!(true));
    attrs.insert("service_type".into(), json!(service_type));
    attrs
}

fn redis_attrs(inputs: OrderInputs<'_>, service_type: &str, vms: u32) -> Map<String, Value> {
    let mut attrs = common_attrs(inputs);
    let description = match service_type {
        "Standalone" => "Standalone Redis cluster for automated testing".to_string(),
        other => format!("{other} Redis cluster for automated testing"),
    };
    attrs.insert("cluster_description".into(), json!(description));
    attrs.insert("redis_version".into(), json!(REDIS_VERSION));
    attrs.insert("number_of_vms".into(), json!(vms));
    attrs.insert("flavor".into(), json!(inputs.region.flavor));
    attrs.insert("boot_volume".into(), json!(inputs.region.boot_volume));
    attrs.insert("auto_backup".into(), json!({ "enabled": false }));
    attrs.insert(
        "parameters".into(),
        json!({
            "timeout": REDIS_DEFAULT_TIMEOUT,
            "tcp-backlog": REDIS_DEFAULT_TCP_BACKLOG,
            "tcp-keepalive": REDIS_DEFAULT_TCP_KEEPALIVE,
            "maxmemory-policy": REDIS_DEFAULT_MAXMEMORY_POLICY,
        }),
    );
    attrs.insert("aof".into(), json!({ "fsync": REDIS_DEFAULT_AOF_FSYNC, "enabled": true }));
    attrs.insert(
        "rdb".into(),
        json!({ "save": REDIS_DEFAULT_RDB_SAVE, "enabled": true, "compression": true }),
    );
    attrs.insert("security_group".into(), json!(true));
    attrs.insert("service_type".into(), json!(service_type));
    attrs
}

fn opensearch_single_attrs(inputs: OrderInputs<'_>) -> Map<String, Value> {
    let mut attrs = common_attrs(inputs);
    let region = inputs.region;
    let group = |vms: u32| {
        json!({ "number_of_vms": vms, "flavor": region.flavor, "boot_volume": region.boot_volume })
    };
    let mut dashboard = group(0);
    dashboard["public_ip"] = json!(false);

    attrs.insert(
        "cluster_description".into(),
        json!(format!("OpenSearch single-node AT {}", region.key.label())),
    );
    attrs.insert("opensearch_version".into(), json!(OPENSEARCH_VERSION));
    attrs.insert("number_of_vms".into(), json!(1));
    attrs.insert("flavor".into(), json!(region.flavor));
    attrs.insert("boot_volume".into(), json!(region.boot_volume));
    attrs.insert("service_type".into(), json!("Single-Node"));
    attrs.insert(
        "flavor_cluster".into(),
        json!({ "data_group": group(1), "manager_group": group(1), "dashboard_group": dashboard }),
    );
    attrs
}

fn opensearch_cluster_attrs(inputs: OrderInputs<'_>) -> Map<String, Value> {
    let mut attrs = common_attrs(inputs);
    let region = inputs.region;
    let group = || {
        json!({ "number_of_vms": 1, "flavor": region.flavor, "boot_volume": region.boot_volume })
    };

    attrs.insert(
        "cluster_description".into(),
        json!(format!("OpenSearch cluster (1-1-0) AT {}", region.key.label())),
    );
    attrs.insert("opensearch_version".into(), json!(OPENSEARCH_VERSION));
    attrs.insert("number_of_vms".into(), json!(2));
    // group-level flavors replace the top-level ones
    attrs.insert("flavor".into(), json!({}));
    attrs.insert("boot_volume".into(), json!({}));
    attrs.insert("service_type".into(), json!("Cluster"));
    attrs.insert(
        "flavor_cluster".into(),
        json!({
            "data_group": group(),
            "manager_group": group(),
            "dashboard_group": {
                "number_of_vms": 0,
                "public_ip": false,
                "flavor": {},
                "boot_volume": {},
            },
        }),
    );
    attrs
}

#[cfg(test)]
mod tests {
    use dbaas_domain::RegionKey;

    use super::*;

    fn build(topology: Topology, region: RegionKey) -> Value {
        let region = region.descriptor();
        let defaults = OrderDefaults::default();
        build_order(
            topology,
            OrderInputs { cluster_name: "test-ab12", region: &region, defaults: &defaults },
        )
    }

    fn attrs(body: &Value) -> &Value {
        &body["order"]["attrs"]
    }

    #[test]
    fn mysql_standalone_matches_fixture_shape() {
        let body = build(Topology::MySqlStandalone, RegionKey::Region1);
        let attrs = attrs(&body);

        assert_eq!(attrs["cluster_name"], "test-ab12");
        assert_eq!(attrs["cluster_description"], "MySQL standalone AT region-1");
        assert_eq!(attrs["mysql_version"], "8.4.4");
        assert_eq!(attrs["number_of_vms"], 1);
        assert_eq!(attrs["service_type"], "Standalone");
        assert_eq!(attrs["auto_backup"], json!({"enabled": false}));
        assert_eq!(attrs["public_ip"], false);
        assert_eq!(attrs["security_group"], true);
        assert_eq!(attrs["is_only_tls"], true);
        assert_eq!(attrs["creator"]["email"], "rbatukaev@t1.ru");
        assert_eq!(attrs["maintance_window"]["time_range"], "00:00 - 01:00");
        assert!(attrs["flavor"]["ram"].as_u64().unwrap() > 0);
        assert!(attrs["boot_volume"]["size"].as_u64().unwrap() > 0);
    }

    #[test]
    fn multi_node_topologies_set_service_type_and_vm_count() {
        let cases = [
            (Topology::MySqlReplica, "Replica", 2),
            (Topology::RedisSentinel, "Sentinel", 3),
            (Topology::RedisCluster, "Cluster", 6),
        ];
        for (topology, service_type, vms) in cases {
            let body = build(topology, RegionKey::Region2);
            assert_eq!(attrs(&body)["service_type"], service_type, "{topology}");
            assert_eq!(attrs(&body)["number_of_vms"], vms, "{topology}");
        }
    }

    #[test]
    fn redis_carries_persistence_defaults() {
        let body = build(Topology::RedisStandalone, RegionKey::Region2);
        let attrs = attrs(&body);

        assert_eq!(attrs["redis_version"], "7.2.5");
        assert_eq!(attrs["parameters"]["tcp-backlog"], 511);
        assert_eq!(attrs["parameters"]["maxmemory-policy"], "noeviction");
        assert_eq!(attrs["aof"], json!({"fsync": "everysec", "enabled": true}));
        assert_eq!(attrs["rdb"], json!({"save": "300 10", "enabled": true, "compression": true}));
        assert_eq!(attrs["region"]["name"], RegionKey::Region2.descriptor().region.name);
    }

    #[test]
    fn opensearch_cluster_moves_flavors_into_groups() {
        let body = build(Topology::OpenSearchCluster, RegionKey::Region1);
        let attrs = attrs(&body);

        assert_eq!(attrs["service_type"], "Cluster");
        assert_eq!(attrs["number_of_vms"], 2);
        assert_eq!(attrs["flavor"], json!({}));
        assert_eq!(attrs["boot_volume"], json!({}));
        assert_eq!(attrs["cluster_description"], "OpenSearch cluster (1-1-0) AT region-1");

        let groups = &attrs["flavor_cluster"];
        assert_eq!(groups["data_group"]["number_of_vms"], 1);
        assert_eq!(groups["manager_group"]["number_of_vms"], 1);
        assert_eq!(groups["dashboard_group"]["number_of_vms"], 0);
        assert_eq!(groups["dashboard_group"]["flavor"], json!({}));
        assert_eq!(groups["data_group"]["flavor"], attrs["flavor_cluster"]["manager_group"]["flavor"]);
    }

    #[test]
    fn opensearch_single_repeats_flavor_per_group() {
        let body = build(Topology::OpenSearchSingle, RegionKey::Region1);
        let attrs = attrs(&body);

        assert_eq!(attrs["service_type"], "Single-Node");
        assert_eq!(attrs["flavor_cluster"]["dashboard_group"]["public_ip"], false);
        assert_eq!(attrs["flavor_cluster"]["data_group"]["flavor"], attrs["flavor"]);
        assert!(attrs.get("auto_backup").is_none());
    }
}
