//! Checkout Models

use std::collections::BTreeMap;

use rustc_hash::FxHashMap;

use uuid::Uuid;

use crate::{
    domain::{
        carts::models::{Cart, CartOwner, CartUuid},
        checkout::errors::CheckoutServiceError,
        orders::models::PaymentReceipt,
        products::models::{LineProduct, ProductUuid},
    },
    payments::{CheckoutLineItem, CheckoutRequest, PaymentGatewayError},
};

/// Name of the single line sent when a discount applies.
pub const ORDER_TOTAL_LINE: &str = "Your Order Total";

/// Placeholder the processor replaces with the session id in the success URL.
pub const SESSION_ID_PLACEHOLDER: &str = "{CHECKOUT_SESSION_ID}";

/// Metadata key naming the buying user.
pub const USER_ID_KEY: &str = "userId";

/// Metadata key naming the guest session.
pub const GUEST_SESSION_KEY: &str = "guestSessionId";

/// Metadata key naming the cart being paid for.
pub const CART_ID_KEY: &str = "cartId";

/// Metadata key carrying the amount charged, in cents.
pub const FINAL_TOTAL_KEY: &str = "finalTotal";

/// Redirect targets for a checkout session. `None` falls back to the storefront defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckoutUrls {
    pub success_url: Option<String>,
    pub cancel_url: Option<String>,
}

impl CheckoutUrls {
    pub(crate) fn resolve(self, frontend_url: &str) -> (String, String) {
        let base = frontend_url.trim_end_matches('/');

        (
            self.success_url.unwrap_or_else(|| {
                format!("{base}/order-success?session_id={SESSION_ID_PLACEHOLDER}")
            }),
            self.cancel_url.unwrap_or_else(|| format!("{base}/cart")),
        )
    }
}

/// What the session metadata says was paid for.
pub(crate) fn receipt_from_metadata(
    payment_id: String,
    metadata: &BTreeMap<String, String>,
) -> Result<PaymentReceipt, PaymentGatewayError> {
    let mut receipt = PaymentReceipt::new(payment_id);

    if let Some(cart) = metadata.get(CART_ID_KEY) {
        let cart = Uuid::parse_str(cart).map_err(|source| {
            PaymentGatewayError::UnexpectedResponse(format!(
                "invalid {CART_ID_KEY} {cart}: {source}"
            ))
        })?;

        receipt.cart = Some(CartUuid::from_uuid(cart));
    }

    if let Some(total) = metadata.get(FINAL_TOTAL_KEY) {
        let total = total.parse::<u64>().map_err(|source| {
            PaymentGatewayError::UnexpectedResponse(format!(
                "invalid {FINAL_TOTAL_KEY} {total}: {source}"
            ))
        })?;

        receipt.amount_paid = Some(total);
    }

    Ok(receipt)
}

/// A started checkout: where to send the buyer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartedCheckout {
    pub session_id: String,
    pub url: Option<String>,
}

/// Build the processor request for `cart`.
///
/// A discounted cart is charged as one consolidated line for the amount due;
/// otherwise each cart line is sent with its product title.
pub(crate) fn checkout_request(
    cart: &Cart,
    catalog: &FxHashMap<ProductUuid, LineProduct>,
    success_url: String,
    cancel_url: String,
) -> Result<CheckoutRequest, CheckoutServiceError> {
    if cart.is_empty() {
        return Err(CheckoutServiceError::EmptyCart);
    }

    let amount_due = cart.amount_due();

    let line_items = if cart.discount > 0 {
        vec![CheckoutLineItem {
            name: ORDER_TOTAL_LINE.to_string(),
            unit_amount: amount_due,
            quantity: 1,
        }]
    } else {
        cart.items
            .iter()
            .map(|item| {
                let product = catalog
                    .get(&item.product)
                    .ok_or(CheckoutServiceError::ProductNotFound)?;

                Ok(CheckoutLineItem {
                    name: product.title.clone(),
                    unit_amount: item.price,
                    quantity: item.quantity,
                })
            })
            .collect::<Result<Vec<_>, CheckoutServiceError>>()?
    };

    let (owner_key, owner_value) = match &cart.owner {
        CartOwner::User(user) => (USER_ID_KEY, user.to_string()),
        CartOwner::Guest(session) => (GUEST_SESSION_KEY, session.to_string()),
    };

    let mut metadata = BTreeMap::from([(owner_key.to_string(), owner_value)]);

    metadata.insert(CART_ID_KEY.to_string(), cart.uuid.to_string());
    metadata.insert(
        "promoCode".to_string(),
        cart.applied_promo
            .as_ref()
            .map_or_else(|| "none".to_string(), |promo| promo.code.clone()),
    );
    metadata.insert("discountAmount".to_string(), cart.discount.to_string());
    metadata.insert("originalTotal".to_string(), cart.total_price.to_string());
    metadata.insert(FINAL_TOTAL_KEY.to_string(), amount_due.to_string());

    Ok(CheckoutRequest {
        line_items,
        success_url,
        cancel_url,
        metadata,
    })
}
