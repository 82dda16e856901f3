//! Product-scoped client for a manager API
//!
//! Knows the routes and the expected status code of every request. The
//! transport underneath owns credentials and the wire.

use std::sync::Arc;

use dbaas_domain::constants::ORDER_LIST_PAGE_SIZE;
use dbaas_domain::{
    AcceptedCommand, BackupList, Command, CreatedOrder, DbaasError, Order, OrderPage, ProductKind,
    Result,
};
use serde_json::{json, Value};
use tracing::{debug, instrument};

use crate::ports::{ApiRequest, ApiResponse, ApiTransport};

/// Client for one product's manager API within one project
#[derive(Clone)]
pub struct ManagerClient {
    transport: Arc<dyn ApiTransport>,
    project_id: String,
    product: ProductKind,
    base_path: String,
}

impl ManagerClient {
    pub fn new(
        transport: Arc<dyn ApiTransport>,
        project_id: impl Into<String>,
        product: ProductKind,
    ) -> Self {
        let project_id = project_id.into();
        let base_path =
            format!("/{}/api/v1/projects/{project_id}", product.profile().api_prefix);
        Self { transport, project_id, product, base_path }
    }

    pub fn product(&self) -> ProductKind {
        self.product
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    fn path(&self, suffix: &str) -> String {
        format!("{}/{suffix}", self.base_path)
    }

    async fn send(&self, request: ApiRequest) -> Result<ApiResponse> {
        self.transport.execute(request).await
    }

    /// Submit a new order; returns the order id
    #[instrument(skip(self, body), fields(product = %self.product))]
    pub async fn create_order(&self, body: Value) -> Result<String> {
        let response = self
            .send(ApiRequest::post(self.path("order-service/orders"), Some(body)))
            .await?
            .expect_status("create_order", 200)?;

        let created: Vec<CreatedOrder> = response.json()?;
        let order_id = created
            .into_iter()
            .next()
            .map(|order| order.id)
            .filter(|id| !id.is_empty())
            .ok_or_else(|| DbaasError::Decode("order creation returned no order id".to_string()))?;
        debug!(order_id = %order_id, "order_created");
        Ok(order_id)
    }

    /// Order detail with relations and the last action
    #[instrument(skip(self), fields(product = %self.product))]
    pub async fn get_order(&self, order_id: &str) -> Result<Order> {
        let request = ApiRequest::get(self.path(&format!("order-service/orders/{order_id}")))
            .with_query("include", "last_action")
            .with_query("with_relations", "true");
        self.send(request).await?.expect_status("get_order", 200)?.json()
    }

    /// First page of the project's most recent orders
    #[instrument(skip(self), fields(product = %self.product))]
    pub async fn list_orders(&self) -> Result<OrderPage> {
        let request = ApiRequest::get(self.path("order-service/orders"))
            .with_query("page", 1)
            .with_query("per_page", ORDER_LIST_PAGE_SIZE);
        self.send(request).await?.expect_status("list_orders", 200)?.json()
    }

    /// PATCH an order action; the control plane answers 200 on acceptance
    #[instrument(skip(self, attrs), fields(product = %self.product))]
    pub async fn order_action(
        &self,
        action: &str,
        order_id: &str,
        item_id: &str,
        attrs: Value,
    ) -> Result<()> {
        let body = json!({
            "project_name": self.project_id,
            "id": order_id,
            "item_id": item_id,
            "order": { "attrs": attrs },
        });
        self.send(ApiRequest::patch(self.path(&format!("order-service/orders/actions/{action}")), body))
            .await?
            .expect_status(action, 200)?;
        debug!(action, order_id, "order_action_accepted");
        Ok(())
    }

    /// Request the service status of an instance
    ///
    /// Returns the raw response: callers decide how to treat a 404.
    #[instrument(skip(self), fields(product = %self.product))]
    pub async fn request_service_status(&self, instance_id: &str) -> Result<ApiResponse> {
        self.send(ApiRequest::get(self.path(&format!("instances/{instance_id}:get-service-status"))))
            .await
    }

    #[instrument(skip(self), fields(product = %self.product))]
    pub async fn get_command(&self, command_id: &str) -> Result<Command> {
        self.send(ApiRequest::get(self.path(&format!("commands/{command_id}"))))
            .await?
            .expect_status("get_command", 200)?
            .json()
    }

    /// POST to `services/{cluster}/{resource}`; the reply must be 202
    #[instrument(skip(self, body), fields(product = %self.product))]
    pub async fn submit_service_request(
        &self,
        cluster_name: &str,
        resource: &str,
        body: Option<Value>,
    ) -> Result<AcceptedCommand> {
        let action = format!("create_{resource}");
        let response = self
            .send(ApiRequest::post(self.path(&format!("services/{cluster_name}/{resource}")), body))
            .await?
            .expect_status(&action, 202)?;
        let accepted: AcceptedCommand = response
            .json()
            .map_err(|e| DbaasError::Decode(format!("{action}: accepted reply without url: {e}")))?;
        Ok(accepted)
    }

    #[instrument(skip(self), fields(product = %self.product))]
    pub async fn list_backups(&self, cluster_name: &str) -> Result<BackupList> {
        self.send(ApiRequest::get(self.path(&format!("services/{cluster_name}/backups"))))
            .await?
            .expect_status("list_backups", 200)?
            .json()
    }
}

/// Command id carried by a 202 reply
pub fn command_id(accepted: &AcceptedCommand) -> Result<String> {
    accepted
        .command_id()
        .map(str::to_string)
        .ok_or_else(|| DbaasError::Decode(format!("no command id in url '{}'", accepted.url)))
}
