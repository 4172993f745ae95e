pub mod generation;
pub mod packages;
pub mod payments;
pub mod storefront;
pub mod users;
