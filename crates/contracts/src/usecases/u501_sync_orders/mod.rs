pub mod request;
pub mod response;

pub use request::{AmazonCredentials, FlipkartCredentials, MarketplaceCredentials, SyncRequest};
pub use response::{RecordError, SyncResponse};

use crate::usecases::common::UseCaseMetadata;

pub struct SyncOrders;

impl UseCaseMetadata for SyncOrders {
    fn usecase_index() -> &'static str {
        "u501"
    }

    fn usecase_name() -> &'static str {
        "sync_orders"
    }
}
