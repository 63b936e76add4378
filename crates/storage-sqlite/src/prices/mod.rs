mod model;
mod repository;

pub use model::{NewPriceSampleDB, PriceSampleDB};
pub use repository::SampleRepository;
