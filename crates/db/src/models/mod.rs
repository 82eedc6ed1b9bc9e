//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - A `Deserialize` create DTO for inserts

pub mod clothing_item;
pub mod customer;
pub mod fitting_record;
pub mod sample_clothing;
