pub mod browser;
pub mod detail;
pub mod dom;
pub mod fields;
pub mod pagination;
pub mod scroll;
#[cfg(test)]
pub mod testing;
pub mod traits;
pub mod types;

pub use browser::HeadlessBrowser;
pub use detail::DetailExtractor;
pub use pagination::PaginationCrawler;
pub use traits::RenderingClient;
