pub mod engine;
pub mod linebreak;
pub mod markup;
pub mod runs;
pub mod style;
