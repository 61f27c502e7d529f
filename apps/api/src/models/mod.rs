pub mod feedback;
pub mod ikigai;
pub mod profile;
pub mod project;
