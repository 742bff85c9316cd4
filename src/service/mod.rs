pub mod bootcamp;
pub mod query;

pub use bootcamp::BootcampService;
