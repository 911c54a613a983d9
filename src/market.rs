//! Marketplace order sources.
//!
//! Each source walks the marketplace listing with the matching pagination walker, decodes
//! pages with the matching parser, and hands normalized [`Order`](crate::orders::Order)s to
//! the service layer through [`OrdersBackend`](crate::service::OrdersBackend).

pub mod mercadolibre;
pub mod shopee;

pub use mercadolibre::MercadoLibreOrders;
pub use shopee::ShopeeOrders;
