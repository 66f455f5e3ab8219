#[allow(clippy::module_inception)]
pub mod cache;
pub mod error;
pub mod fake;
pub mod moka;
#[cfg(test)]
mod tests;

pub use cache::ListingCache;
pub use error::CacheError;
pub use fake::FakeCache;
pub use self::moka::MokaListingCache;
