//! MySQL-only operations

use dbaas_domain::{ClusterHandle, ProductKind, Result};
use serde_json::json;
use tracing::{info, instrument};

use super::{require_product, ClusterOperations};
use crate::context::SuiteContext;

/// Database and settings operations of the MySQL manager
#[derive(Clone, Copy)]
pub struct MySqlOperations<'a> {
    common: ClusterOperations<'a>,
}

impl<'a> MySqlOperations<'a> {
    pub fn new(ctx: &'a SuiteContext) -> Self {
        Self { common: ClusterOperations::new(ctx) }
    }

    /// Create a database with a generated name; returns the name
    #[instrument(skip(self, handle), fields(cluster = %handle.cluster_name))]
    pub async fn create_database(&self, handle: &ClusterHandle) -> Result<String> {
        require_product(handle, ProductKind::MySql)?;
        self.common.ensure_ready(handle).await?;

        let ctx = self.common.context();
        let name = ctx.generator().database_name();
        let payload = json!({
            "name": name,
            "character_set": "utf8mb3",
            "collation": "utf8mb3_general_ci",
            "encryption": "NO",
        });

        info!(database = %name, "database_creating");
        let accepted = self
            .common
            .client(handle)
            .submit_service_request(&handle.cluster_name, "databases", Some(payload))
            .await?;
        self.common
            .await_command(handle.product(), &accepted, "create_database", ctx.polling().command)
            .await?;
        info!(database = %name, "database_created");
        Ok(name)
    }

    /// Change `max_user_connections`; returns the new value
    #[instrument(skip(self, handle), fields(order_id = %handle.order_id))]
    pub async fn edit_settings(&self, handle: &ClusterHandle) -> Result<u32> {
        require_product(handle, ProductKind::MySql)?;
        self.common.ensure_ready(handle).await?;

        let ctx = self.common.context();
        let config = self.common.managed_config(handle).await?;
        let current = config.max_user_connections();
        let target = ctx.generator().max_user_connections(current);
        info!(current = ?current, target, "mysql_settings_editing");

        let description = config.service.as_ref().and_then(|service| service.description.clone());
        let attrs = json!({
            "cluster_description": description,
            "mysql_version": config.mysql_version,
            "parameters": { "max_user_connections": target },
        });
        self.common.submit(handle, "edit_mysql_vm_settings", attrs).await?;

        self.common
            .await_managed(handle, "edit_mysql_vm_settings", ctx.polling().modification, |config| {
                (config.max_user_connections() == Some(u64::from(target))).then_some(())
            })
            .await?;

        self.common.ensure_ready(handle).await?;
        info!(max_user_connections = target, "mysql_settings_edited");
        Ok(target)
    }
}
