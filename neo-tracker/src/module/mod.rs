pub mod neo;
pub mod locale;
pub mod presenter;
pub mod renderer;
