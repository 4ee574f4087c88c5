pub mod home;
pub mod studio;
