pub mod category;
pub mod reminder;
pub mod repeat;
pub mod task;
pub mod validate;
