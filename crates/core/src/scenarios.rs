//! End-to-end collections, one per topology
//!
//! A collection creates a cluster, runs every operation its product
//! supports in a fixed order and deletes the cluster. The first failing
//! step aborts the collection; the cluster is left for inspection.

use std::fmt::Debug;
use std::future::Future;
use std::time::Duration;

use dbaas_domain::constants::{DEFAULT_MYSQL_NODES_TO_ADD, DEFAULT_REDIS_NODES_TO_ADD};
use dbaas_domain::{ClusterHandle, GroupCounts, ProductKind, Result, Topology};
use tokio::time::Instant;
use tracing::{error, info};

use crate::context::SuiteContext;
use crate::operations::{
    ClusterOperations, MySqlOperations, OpenSearchOperations, RedisOperations,
};

/// Node groups grown by the OpenSearch cluster collection
pub const OPENSEARCH_GROUP_NODES: GroupCounts = GroupCounts { data: 1, manager: 2, dashboard: 0 };

/// One completed step
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepRecord {
    pub name: &'static str,
    pub elapsed: Duration,
    pub outcome: String,
}

/// Steps completed by a collection run
#[derive(Debug, Clone)]
pub struct ScenarioReport {
    pub topology: Topology,
    pub cluster: Option<ClusterHandle>,
    pub steps: Vec<StepRecord>,
}

impl ScenarioReport {
    fn new(topology: Topology) -> Self {
        Self { topology, cluster: None, steps: Vec::new() }
    }

    pub fn step_names(&self) -> Vec<&'static str> {
        self.steps.iter().map(|step| step.name).collect()
    }

    pub fn total_elapsed(&self) -> Duration {
        self.steps.iter().map(|step| step.elapsed).sum()
    }

    async fn step<T, Fut>(&mut self, name: &'static str, operation: Fut) -> Result<T>
    where
        T: Debug,
        Fut: Future<Output = Result<T>>,
    {
        info!(topology = %self.topology, step = name, "step_started");
        let started = Instant::now();
        match operation.await {
            Ok(value) => {
                let elapsed = started.elapsed();
                info!(
                    topology = %self.topology,
                    step = name,
                    elapsed_secs = elapsed.as_secs_f64(),
                    outcome = ?value,
                    "step_completed"
                );
                self.steps.push(StepRecord { name, elapsed, outcome: format!("{value:?}") });
                Ok(value)
            }
            Err(err) => {
                error!(
                    topology = %self.topology,
                    step = name,
                    completed = self.steps.len(),
                    error = %err,
                    "step_failed"
                );
                Err(err)
            }
        }
    }
}

/// Run the full collection for `topology`
pub async fn run_collection(ctx: &SuiteContext, topology: Topology) -> Result<ScenarioReport> {
    let ops = ClusterOperations::new(ctx);
    let mut report = ScenarioReport::new(topology);

    let handle = report.step("create_cluster", ops.create_cluster(topology)).await?;
    report.cluster = Some(handle.clone());

    report.step("extend_disk", ops.extend_disk(&handle)).await?;
    report.step("add_public_ip", ops.add_public_ip(&handle)).await?;
    report.step("change_bandwidth", ops.change_bandwidth(&handle)).await?;
    report.step("disable_public_ip", ops.disable_public_ip(&handle)).await?;
    report.step("create_user", ops.create_user(&handle)).await?;

    match topology.product() {
        ProductKind::MySql => {
            let mysql = MySqlOperations::new(ctx);
            report.step("create_database", mysql.create_database(&handle)).await?;
            report.step("edit_settings", mysql.edit_settings(&handle)).await?;
            if topology == Topology::MySqlReplica {
                report.step("add_nodes", ops.add_nodes(&handle, DEFAULT_MYSQL_NODES_TO_ADD)).await?;
            }
        }
        ProductKind::Redis => {
            let redis = RedisOperations::new(ctx);
            report.step("create_backup", redis.create_backup(&handle)).await?;
            report.step("edit_settings", redis.edit_settings(&handle)).await?;
            if topology == Topology::RedisSentinel {
                report.step("add_nodes", ops.add_nodes(&handle, DEFAULT_REDIS_NODES_TO_ADD)).await?;
            }
        }
        ProductKind::OpenSearch => {
            report.step("resize_flavor", ops.resize_flavor(&handle)).await?;
            if topology.has_node_groups() {
                let opensearch = OpenSearchOperations::new(ctx);
                report
                    .step(
                        "add_group_nodes",
                        opensearch.add_group_nodes(&handle, OPENSEARCH_GROUP_NODES),
                    )
                    .await?;
            }
        }
    }

    report.step("delete_cluster", ops.delete_cluster(&handle)).await?;
    info!(
        topology = %topology,
        steps = report.steps.len(),
        total_secs = report.total_elapsed().as_secs_f64(),
        "collection_completed"
    );
    Ok(report)
}
