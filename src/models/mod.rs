pub mod enhancement;
pub mod template;
