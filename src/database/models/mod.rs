pub mod admin;
pub mod plant;

pub use admin::{Admin, AdminPublic, NewAdmin};
pub use plant::{Habit, NewPlant, Plant, PlantPatch, RecentPlant};
