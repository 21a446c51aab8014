//! Places: slugs, address components and the read-side catalog.

pub mod address;
pub mod catalog;
pub mod slug;

pub use address::{parse_address, AddressParts};
pub use catalog::{
    CatalogError, PlaceCatalog, PlaceDetail, PlaceListItem, PlacePage, PlaceQuery, PlaceSummary,
    ReviewSummary, SourceSummary,
};
pub use slug::slugify;
