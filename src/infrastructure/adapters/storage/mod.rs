//! Storage Adapter - 本地文件内容仓库

mod file_store;

pub use file_store::FileContentStore;
