pub mod catalog;
pub mod feed;
pub mod record;
pub mod snapshot;
pub mod store;

pub use catalog::{build_catalog, load_city_aliases, CatalogEntry, CityAlias, RegionCatalog};
pub use feed::{fetch_source, parse_feed, LoadError, LoadReport, SkippedRow};
pub use record::{is_independent_city, CaseRecord, RegionKey, CITIES_WITHOUT_COUNTIES};
pub use snapshot::DatasetSnapshot;
pub use store::{load_dataset, DatasetStore, StoreError};
