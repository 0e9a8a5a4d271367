pub mod analysis;
pub mod feedback;
