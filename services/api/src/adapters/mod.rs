pub mod db;
pub mod file_store;
pub mod spoonacular;

pub use db::DbAdapter;
pub use file_store::FileStore;
pub use spoonacular::SpoonacularAdapter;
