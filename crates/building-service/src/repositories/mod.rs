//! Database access layer.

mod beds;
mod buildings;

pub use beds::BedsRepository;
pub use buildings::BuildingsRepository;
