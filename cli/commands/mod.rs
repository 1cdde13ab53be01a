pub mod completion;
pub mod generate;
pub mod list;
