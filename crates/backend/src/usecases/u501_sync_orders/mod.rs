pub mod adapter;
pub mod amazon_api_client;
pub mod error;
pub mod executor;
pub mod fixtures;
pub mod flipkart_api_client;
pub mod processors;

pub use adapter::{adapter_for, MarketplaceAdapter, RawOrder};
pub use error::SyncError;
pub use executor::SyncExecutor;
