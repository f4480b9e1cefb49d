//! Domain events
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "type")]
pub enum CartEvent {
    CartUpdated { user_id: String, product_id: i32, line_id: i32, count: i32 },
    CartLineRemoved { user_id: String, line_id: i32, header_removed: bool },
    CouponApplied { user_id: String, coupon_code: String },
    CouponRemoved { user_id: String },
    CartCleared { user_id: String },
}

impl CartEvent {
    pub fn subject(&self) -> &'static str {
        match self {
            Self::CartUpdated { .. } => "mango.cart.updated",
            Self::CartLineRemoved { .. } => "mango.cart.line_removed",
            Self::CouponApplied { .. } => "mango.cart.coupon_applied",
            Self::CouponRemoved { .. } => "mango.cart.coupon_removed",
            Self::CartCleared { .. } => "mango.cart.cleared",
        }
    }

    pub fn user_id(&self) -> &str {
        match self {
            Self::CartUpdated { user_id, .. }
            | Self::CartLineRemoved { user_id, .. }
            | Self::CouponApplied { user_id, .. }
            | Self::CouponRemoved { user_id }
            | Self::CartCleared { user_id } => user_id,
        }
    }
}
