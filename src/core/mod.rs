// Core module - Link session and transport abstraction
pub mod communication;
pub mod session;
