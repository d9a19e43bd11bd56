pub mod group;
pub mod hom;
pub mod tlf;
