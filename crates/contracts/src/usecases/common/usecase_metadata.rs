/// Identification metadata of a UseCase
pub trait UseCaseMetadata {
    /// Index, e.g. "u501"
    fn usecase_index() -> &'static str;

    /// Technical name, e.g. "sync_orders"
    fn usecase_name() -> &'static str;

    /// Full name like "u501_sync_orders"
    fn full_name() -> String {
        format!("{}_{}", Self::usecase_index(), Self::usecase_name())
    }
}
