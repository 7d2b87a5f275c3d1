pub mod exports;
pub mod hostname;
pub mod menu;
