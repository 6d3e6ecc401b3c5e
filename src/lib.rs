pub mod app;
pub mod braille;
pub mod charts;
pub mod data;
pub mod geo;
pub mod globe;
pub mod hash;
pub mod story;
pub mod ui;
