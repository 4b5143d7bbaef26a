//! Cart request and response bodies.

use salvo::oapi::ToSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use emporium_app::domain::carts::{
    PromoApplication,
    models::{AppliedPromo, Cart, CartItem, CartOwner, NewCartItem},
};

use crate::promotions::models::PromoSummaryResponse;

/// A cart line.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CartItemResponse {
    pub product: Uuid,
    pub quantity: u64,

    /// Unit price captured when the product was first added
    pub price: u64,
}

impl From<CartItem> for CartItemResponse {
    fn from(item: CartItem) -> Self {
        Self {
            product: item.product.into(),
            quantity: item.quantity,
            price: item.price,
        }
    }
}

/// Promo code discounting a cart.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AppliedPromoResponse {
    pub code: String,
    pub discount_amount: u64,
    pub exporter_id: Uuid,
}

impl From<AppliedPromo> for AppliedPromoResponse {
    fn from(promo: AppliedPromo) -> Self {
        Self {
            code: promo.code,
            discount_amount: promo.discount_amount,
            exporter_id: promo.exporter.into(),
        }
    }
}

/// A user or guest cart. A missing cart is returned empty.
#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CartResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uuid: Option<Uuid>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<Uuid>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guest_session_id: Option<String>,

    pub products: Vec<CartItemResponse>,
    pub total_price: u64,

    #[serde(default)]
    pub discount: u64,

    /// Total less discount
    #[serde(default)]
    pub amount_due: u64,

    #[serde(default)]
    pub applied_promo: Option<AppliedPromoResponse>,
}

impl From<Cart> for CartResponse {
    fn from(cart: Cart) -> Self {
        let amount_due = cart.amount_due();

        let (user_id, guest_session_id) = match cart.owner {
            CartOwner::User(user) => (Some(user.into()), None),
            CartOwner::Guest(session) => (None, Some(session.to_string())),
        };

        Self {
            uuid: Some(cart.uuid.into()),
            user_id,
            guest_session_id,
            products: cart.items.into_iter().map(Into::into).collect(),
            total_price: cart.total_price,
            discount: cart.discount,
            amount_due,
            applied_promo: cart.applied_promo.map(Into::into),
        }
    }
}

impl From<Option<Cart>> for CartResponse {
    fn from(cart: Option<Cart>) -> Self {
        cart.map(Into::into).unwrap_or_default()
    }
}

/// Add a product to the caller's cart.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AddItemRequest {
    pub product: Uuid,
    pub quantity: u64,
    pub price: u64,
}

impl From<AddItemRequest> for NewCartItem {
    fn from(request: AddItemRequest) -> Self {
        Self {
            product: request.product.into(),
            quantity: request.quantity,
            price: request.price,
        }
    }
}

/// Add a product to a guest cart.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GuestAddItemRequest {
    pub guest_id: String,
    pub product: Uuid,
    pub quantity: u64,
    pub price: u64,
}

impl GuestAddItemRequest {
    pub(crate) fn into_parts(self) -> (String, NewCartItem) {
        (
            self.guest_id,
            NewCartItem {
                product: self.product.into(),
                quantity: self.quantity,
                price: self.price,
            },
        )
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct UpdateQuantityRequest {
    pub product_id: Uuid,

    /// Zero or less removes the line
    pub quantity: i64,
}

impl UpdateQuantityRequest {
    /// The quantity to store, with anything below one meaning removal.
    pub(crate) fn line_quantity(&self) -> u64 {
        u64::try_from(self.quantity).unwrap_or_default()
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RemoveItemRequest {
    pub product_id: Uuid,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ApplyPromoRequest {
    pub promo_code: String,
}

/// A cart after a promo code was applied to it.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PromoAppliedResponse {
    pub cart: CartResponse,
    pub promo: PromoSummaryResponse,
    pub discount_amount: u64,
    pub eligible_amount: u64,
}

impl From<PromoApplication> for PromoAppliedResponse {
    fn from(application: PromoApplication) -> Self {
        Self {
            cart: application.cart.into(),
            promo: application.quote.promo.into(),
            discount_amount: application.quote.discount_amount,
            eligible_amount: application.quote.eligible_amount,
        }
    }
}

/// Number of lines in the caller's cart.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct CartCountResponse {
    pub count: u64,
}

#[cfg(test)]
mod tests {
    use jiff::Timestamp;

    use emporium_app::domain::{
        carts::models::{CartUuid, GuestSessionId},
        products::models::ProductUuid,
        users::models::UserUuid,
    };

    use super::*;

    #[test]
    fn missing_cart_reads_as_empty() -> Result<(), serde_json::Error> {
        let body = serde_json::to_value(CartResponse::from(None))?;

        assert_eq!(body["products"], serde_json::json!([]));
        assert_eq!(body["totalPrice"], 0);
        assert!(body.get("uuid").is_none());

        Ok(())
    }

    #[test]
    fn guest_cart_exposes_session_and_amount_due() -> Result<(), Box<dyn std::error::Error>> {
        let exporter = UserUuid::new();
        let cart = Cart {
            uuid: CartUuid::new(),
            owner: CartOwner::Guest(GuestSessionId::new("guest-1")?),
            items: vec![CartItem {
                product: ProductUuid::new(),
                quantity: 3,
                price: 1_000,
            }],
            total_price: 3_000,
            discount: 500,
            applied_promo: Some(AppliedPromo {
                code: "FIVE".to_string(),
                discount_amount: 500,
                exporter,
            }),
            created_at: Timestamp::UNIX_EPOCH,
            updated_at: Timestamp::UNIX_EPOCH,
        };

        let body = serde_json::to_value(CartResponse::from(cart))?;

        assert_eq!(body["guestSessionId"], "guest-1");
        assert_eq!(body["amountDue"], 2_500);
        assert_eq!(body["appliedPromo"]["exporterId"], exporter.to_string());
        assert!(body.get("userId").is_none());

        Ok(())
    }
}
