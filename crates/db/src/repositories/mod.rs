//! Repository layer: one stateless struct per table.

mod clothing_item_repo;
mod customer_repo;
mod fitting_record_repo;
mod sample_clothing_repo;

pub use clothing_item_repo::ClothingItemRepo;
pub use customer_repo::CustomerRepo;
pub use fitting_record_repo::FittingRecordRepo;
pub use sample_clothing_repo::SampleClothingRepo;
