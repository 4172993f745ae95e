pub mod imagen;
pub mod state;
