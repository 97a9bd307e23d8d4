//! Column names the dashboard looks for. Matching is exact and case-sensitive.

pub const CATEGORY: &str = "category";
pub const REGION: &str = "region";
pub const PRODUCT_ID: &str = "product_id";
pub const CUSTOMER_ID: &str = "customer_id";
pub const ORDER_DATE: &str = "order_date";
pub const PRICE: &str = "price";
pub const QUANTITY: &str = "quantity";
pub const DISCOUNT: &str = "discount";

// Derived during preparation
pub const SALES: &str = "sales";
pub const MONTH: &str = "month";
pub const DAY_NAME: &str = "day_name";
pub const DISCOUNT_CLIPPED: &str = "discount_clipped";
pub const DISCOUNT_BIN: &str = "discount_bin";
