//! Catalog of backend functions called by the gateway.
//!
//! Names are the dotted form used throughout the apps; see
//! [`super::function_path`] for the wire form.

// Session
pub const USERS_VIEWER: &str = "users.viewer";

// Admin dashboard
pub const ADMIN_DASHBOARD_STATS: &str = "admin.getDashboardStats";
pub const ADMIN_LIST_PENDING_PRODUCTS: &str = "admin.listPendingProducts";
pub const ADMIN_APPROVE_PRODUCT: &str = "admin.approveProduct";
pub const ADMIN_REJECT_PRODUCT: &str = "admin.rejectProduct";
pub const ADMIN_LIST_PENDING_SELLERS: &str = "admin.listPendingSellers";
pub const ADMIN_APPROVE_SELLER: &str = "admin.approveSeller";
pub const ADMIN_UPDATE_USER_ROLE: &str = "admin.updateUserRole";

// Orders
pub const ORDERS_UPDATE_FULFILLMENT: &str = "orders.updateFulfillment";

// Catalog
pub const CATEGORIES_LIST: &str = "categories.list";
pub const CATEGORIES_CREATE: &str = "categories.createCategory";

// Community
pub const REVIEWS_STATS: &str = "reviews.getStats";
pub const FORUM_LEADERBOARD: &str = "forum.getLeaderboard";
