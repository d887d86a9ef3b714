use crate::dto::order_dto::{CreateOrderPayload, ValidateOrderPayload};
use crate::error::{Error, Result};
use crate::models::order::{Order, OrderValidation, Plan};
use crate::services::api_client::ApiClient;
use crate::services::endpoints;
use crate::utils::validation::validate;
use tracing::{info, warn};
use uuid::Uuid;

/// Billing flow: open an order, let the gateway collect payment, then have
/// the backend validate the gateway's signature.
#[derive(Clone)]
pub struct OrderService {
    api: ApiClient,
}

impl OrderService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn create_order(&self, plan: Plan) -> Result<Order> {
        let payload = CreateOrderPayload {
            plan,
            receipt: format!("rcpt_{}", Uuid::new_v4().simple()),
        };
        let order: Order = self.api.post(endpoints::ORDERS, &payload).await?;
        info!(order_id = %order.id, amount = %order.amount, currency = %order.currency, "order created");
        Ok(order)
    }

    pub async fn validate_payment(&self, payload: &ValidateOrderPayload) -> Result<OrderValidation> {
        validate(payload)?;
        let result: OrderValidation = self.api.post(endpoints::ORDERS_VALIDATE, payload).await?;
        if !result.success {
            warn!(order_id = %payload.order_id, "payment validation rejected");
            return Err(Error::BadRequest(
                result
                    .message
                    .unwrap_or_else(|| "Payment could not be verified.".to_string()),
            ));
        }
        Ok(result)
    }
}
