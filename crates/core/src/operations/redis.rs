//! Redis-only operations

use dbaas_domain::constants::{
    BACKUP_RETENTION_LONG, BACKUP_RETENTION_SHORT, BACKUP_SCHEDULE_EARLY, BACKUP_SCHEDULE_LATE,
    MIN_NODES_AFTER_REMOVAL, REDIS_DEFAULT_AOF_FSYNC, REDIS_DEFAULT_MAXMEMORY_POLICY,
    REDIS_DEFAULT_RDB_SAVE, REDIS_DEFAULT_TCP_BACKLOG, REDIS_DEFAULT_TCP_KEEPALIVE,
    REDIS_DEFAULT_TIMEOUT, UNKNOWN_BACKUP_NAME,
};
use dbaas_domain::{
    AutoBackup, ClusterConfig, ClusterHandle, DbaasError, OrderDefaults, ProductKind,
    RedisSettingsChange, Result, ServiceConfig, ToggleOutcome,
};
use serde_json::{json, Value};
use tracing::{info, instrument};

use super::{require_product, vm_count, ClusterOperations};
use crate::context::SuiteContext;

const EDIT_SETTINGS_ACTION: &str = "edit_redis_vm_settings";
const REMOVE_NODES_ACTION: &str = "delete_several_vms_mongo";

/// Backup, settings and node-removal operations of the Redis manager
#[derive(Clone, Copy)]
pub struct RedisOperations<'a> {
    common: ClusterOperations<'a>,
}

impl<'a> RedisOperations<'a> {
    pub fn new(ctx: &'a SuiteContext) -> Self {
        Self { common: ClusterOperations::new(ctx) }
    }

    /// Take a manual backup; returns the newest backup's name
    #[instrument(skip(self, handle), fields(cluster = %handle.cluster_name))]
    pub async fn create_backup(&self, handle: &ClusterHandle) -> Result<String> {
        require_product(handle, ProductKind::Redis)?;
        self.common.ensure_ready(handle).await?;

        let ctx = self.common.context();
        let client = self.common.client(handle);
        let accepted = client.submit_service_request(&handle.cluster_name, "backups", None).await?;
        self.common
            .await_command(handle.product(), &accepted, "create_backup", ctx.polling().backup)
            .await?;

        let backups = client.list_backups(&handle.cluster_name).await?;
        let name = backups
            .backups
            .into_iter()
            .next()
            .map_or_else(|| UNKNOWN_BACKUP_NAME.to_string(), |backup| backup.backup_name);
        info!(backup = %name, "backup_created");
        Ok(name)
    }

    /// Change `timeout`, flip RDB persistence and the auto-backup schedule
    #[instrument(skip(self, handle), fields(order_id = %handle.order_id))]
    pub async fn edit_settings(&self, handle: &ClusterHandle) -> Result<RedisSettingsChange> {
        require_product(handle, ProductKind::Redis)?;
        self.common.ensure_ready(handle).await?;

        let ctx = self.common.context();
        let config = self.common.managed_config(handle).await?;
        let current = RedisState::from_config(&config);

        let change = RedisSettingsChange {
            timeout: ctx.generator().redis_timeout(current.timeout),
            rdb_enabled: !current.rdb_enabled.unwrap_or(false),
            backup_schedule: if current.backup.schedule_time.as_deref() == Some(BACKUP_SCHEDULE_EARLY) {
                BACKUP_SCHEDULE_LATE.to_string()
            } else {
                BACKUP_SCHEDULE_EARLY.to_string()
            },
            backup_retention: if current.backup.retention_number == Some(BACKUP_RETENTION_LONG) {
                BACKUP_RETENTION_SHORT
            } else {
                BACKUP_RETENTION_LONG
            },
        };
        info!(
            timeout = change.timeout,
            rdb_enabled = change.rdb_enabled,
            backup_schedule = %change.backup_schedule,
            backup_retention = change.backup_retention,
            "redis_settings_editing"
        );

        let auto_backup = json!({
            "enabled": current.backup.enabled.unwrap_or(true),
            "schedule_time": change.backup_schedule,
            "retention_number": change.backup_retention,
        });
        let attrs = settings_attrs(
            &config,
            &ctx.config().order_defaults,
            u64::from(change.timeout),
            change.rdb_enabled,
            auto_backup,
        );
        self.common.submit(handle, EDIT_SETTINGS_ACTION, attrs).await?;

        let timeout = u64::from(change.timeout);
        self.common
            .await_managed(handle, EDIT_SETTINGS_ACTION, ctx.polling().modification, |config| {
                let observed = RedisState::from_config(config);
                (observed.timeout == Some(timeout)
                    && observed.rdb_enabled == Some(change.rdb_enabled)
                    && observed.backup.schedule_time.as_deref() == Some(change.backup_schedule.as_str())
                    && observed.backup.retention_number == Some(change.backup_retention))
                .then_some(())
            })
            .await?;

        self.common.ensure_ready(handle).await?;
        info!("redis_settings_edited");
        Ok(change)
    }

    /// Turn off scheduled backups; no request when already off
    #[instrument(skip(self, handle), fields(order_id = %handle.order_id))]
    pub async fn disable_auto_backup(&self, handle: &ClusterHandle) -> Result<ToggleOutcome> {
        require_product(handle, ProductKind::Redis)?;
        self.common.ensure_ready(handle).await?;

        let ctx = self.common.context();
        let config = self.common.managed_config(handle).await?;
        let current = RedisState::from_config(&config);
        if current.backup.enabled == Some(false) {
            info!("auto_backup_already_disabled");
            return Ok(ToggleOutcome::Unchanged);
        }

        let auto_backup = json!({
            "enabled": false,
            "schedule_time": current.backup.schedule_time.as_deref().unwrap_or(BACKUP_SCHEDULE_EARLY),
            "retention_number": current.backup.retention_number.unwrap_or(BACKUP_RETENTION_LONG),
        });
        let attrs = settings_attrs(
            &config,
            &ctx.config().order_defaults,
            current.timeout.unwrap_or(u64::from(REDIS_DEFAULT_TIMEOUT)),
            current.rdb_enabled.unwrap_or(true),
            auto_backup,
        );
        self.common.submit(handle, EDIT_SETTINGS_ACTION, attrs).await?;

        self.common
            .await_managed(handle, "disable_auto_backup", ctx.polling().modification, |config| {
                (RedisState::from_config(config).backup.enabled == Some(false)).then_some(())
            })
            .await?;
        info!("auto_backup_disabled");
        Ok(ToggleOutcome::Applied)
    }

    /// Remove the `count` most recently added servers; returns the new VM count
    ///
    /// Refused when fewer than three nodes would remain.
    #[instrument(skip(self, handle), fields(order_id = %handle.order_id))]
    pub async fn remove_nodes(&self, handle: &ClusterHandle, count: u32) -> Result<u32> {
        require_product(handle, ProductKind::Redis)?;
        if count == 0 {
            return Err(DbaasError::InvalidInput("node count must be positive".to_string()));
        }
        self.common.ensure_ready(handle).await?;

        let config = self.common.managed_config(handle).await?;
        let current = vm_count(&config, &handle.order_id)?;
        let remaining = current.checked_sub(count).filter(|left| *left >= MIN_NODES_AFTER_REMOVAL);
        let Some(expected) = remaining else {
            return Err(DbaasError::InvalidInput(format!(
                "cannot remove {count} of {current} nodes: at least {MIN_NODES_AFTER_REMOVAL} must remain"
            )));
        };

        let servers = config.service.as_ref().map(|service| service.servers.as_slice()).unwrap_or_default();
        let count_usize = usize::try_from(count).unwrap_or(usize::MAX);
        if servers.len() < count_usize {
            return Err(DbaasError::MissingItem(format!(
                "order {} lists {} servers, cannot remove {count}",
                handle.order_id,
                servers.len()
            )));
        }
        let names: Vec<&str> =
            servers[servers.len() - count_usize..].iter().map(|server| server.name.as_str()).collect();
        info!(current, expected, servers = ?names, "nodes_removing");

        self.common.submit(handle, REMOVE_NODES_ACTION, json!({ "item_id": names })).await?;
        self.common.await_vm_count(handle, REMOVE_NODES_ACTION, expected).await?;
        info!(number_of_vms = expected, "nodes_removed");
        Ok(expected)
    }
}

/// Settings read back from `config.service`
struct RedisState {
    timeout: Option<u64>,
    rdb_enabled: Option<bool>,
    backup: AutoBackup,
}

impl RedisState {
    fn from_config(config: &ClusterConfig) -> Self {
        let service = config.service.clone().unwrap_or_default();
        Self {
            timeout: service.settings.get("timeout").and_then(Value::as_u64),
            rdb_enabled: service.rdb.as_ref().and_then(|rdb| rdb.enabled),
            backup: service.backup.unwrap_or_default(),
        }
    }
}

/// Full attribute set of `edit_redis_vm_settings`
///
/// The action replaces every setting, so values not being changed are
/// copied from the current configuration.
fn settings_attrs(
    config: &ClusterConfig,
    defaults: &OrderDefaults,
    timeout: u64,
    rdb_enabled: bool,
    auto_backup: Value,
) -> Value {
    let service: ServiceConfig = config.service.clone().unwrap_or_default();
    let setting = |key: &str, default: Value| service.settings.get(key).cloned().unwrap_or(default);
    let aof = service.aof.clone().unwrap_or_default();
    let rdb = service.rdb.clone().unwrap_or_default();

    json!({
        "aof": {
            "fsync": aof.fsync.unwrap_or_else(|| REDIS_DEFAULT_AOF_FSYNC.to_string()),
            "enabled": aof.enabled.unwrap_or(true),
        },
        "rdb": {
            "save": rdb.save.unwrap_or_else(|| REDIS_DEFAULT_RDB_SAVE.to_string()),
            "enabled": rdb_enabled,
            "compression": rdb.compression.unwrap_or(true),
        },
        "parameters": {
            "timeout": timeout,
            "tcp-backlog": setting("tcp-backlog", json!(REDIS_DEFAULT_TCP_BACKLOG)),
            "tcp-keepalive": setting("tcp-keepalive", json!(REDIS_DEFAULT_TCP_KEEPALIVE)),
            "maxmemory-policy": setting("maxmemory-policy", json!(REDIS_DEFAULT_MAXMEMORY_POLICY)),
        },
        "auto_backup": auto_backup,
        "redis_version": config.redis_version,
        "maintance_window": config
            .maintance_window
            .clone()
            .unwrap_or_else(|| json!(defaults.maintenance_window)),
    })
}
