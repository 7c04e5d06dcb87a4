pub mod components;
pub mod dashboard;
pub mod header;
pub mod loading;
pub mod map;
pub mod sign_in;
pub mod table;
