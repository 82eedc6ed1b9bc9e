//! HTTP handlers, one module per resource.

pub mod clothing;
pub mod customers;
pub mod fitting;
pub mod images;
pub mod sample_clothes;
