//! Order response bodies.

use salvo::oapi::ToSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use emporium_app::domain::{
    orders::models::{Approval, Order, OrderItem},
    pagination::Page,
};

/// One line of an order.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct OrderItemResponse {
    pub uuid: Uuid,
    pub product: Uuid,
    pub exporter_id: Uuid,
    pub quantity: u64,

    /// Unit price charged
    pub price: u64,

    /// `pending`, `approved` or `rejected`
    pub status: String,

    pub approved_at: Option<String>,
}

impl From<OrderItem> for OrderItemResponse {
    fn from(item: OrderItem) -> Self {
        Self {
            uuid: item.uuid.into(),
            product: item.product.into(),
            exporter_id: item.exporter.into(),
            quantity: item.quantity,
            price: item.price,
            status: item.status.as_str().to_string(),
            approved_at: item.approved_at.map(|at| at.to_string()),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct OrderResponse {
    pub uuid: Uuid,
    pub user_id: Uuid,
    pub products: Vec<OrderItemResponse>,

    /// Amount charged after any discount
    pub total_amount: u64,

    pub payment_id: String,
    pub promo_code: Option<String>,
    pub status: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Order> for OrderResponse {
    fn from(order: Order) -> Self {
        Self {
            uuid: order.uuid.into(),
            user_id: order.user.into(),
            products: order.items.into_iter().map(Into::into).collect(),
            total_amount: order.total_amount,
            payment_id: order.payment_id,
            promo_code: order.promo_code,
            status: order.status.as_str().to_string(),
            created_at: order.created_at.to_string(),
            updated_at: order.updated_at.to_string(),
        }
    }
}

/// One page of orders.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct OrdersPageResponse {
    pub orders: Vec<OrderResponse>,
    pub current_page: u64,
    pub total_pages: u64,
    pub total_orders: u64,
}

impl From<Page<Order>> for OrdersPageResponse {
    fn from(page: Page<Order>) -> Self {
        Self {
            current_page: page.current_page,
            total_pages: page.total_pages,
            total_orders: page.total_items,
            orders: page.items.into_iter().map(Into::into).collect(),
        }
    }
}

/// Result of approving one order line.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ApprovalResponse {
    pub message: String,
    pub order_id: Uuid,
    pub item_id: Uuid,
    pub product_id: Uuid,

    /// Stock left after the decrement
    pub new_stock: u64,

    /// Order status after the approval
    pub order_status: String,
}

impl From<Approval> for ApprovalResponse {
    fn from(approval: Approval) -> Self {
        Self {
            message: "Product approved successfully".to_string(),
            order_id: approval.order.uuid.into(),
            item_id: approval.item.uuid.into(),
            product_id: approval.product.into(),
            new_stock: approval.new_stock,
            order_status: approval.order.status.as_str().to_string(),
        }
    }
}
