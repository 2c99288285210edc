//! Concrete implementations of the resolver's I/O seams.
//!
//! The core index never touches the disk directly; it goes through
//! [`FileSystem`](crate::project_resolver::FileSystem),
//! [`ConfigProvider`](crate::project_resolver::ConfigProvider) and
//! [`ManifestReader`](crate::project_resolver::ManifestReader).

pub mod disk;
pub mod filter;
pub mod manifest;
pub mod memory;
pub mod tsconfig;

pub use disk::DiskFileSystem;
pub use filter::FileFilter;
pub use manifest::JsonManifestReader;
pub use memory::MemoryFileSystem;
pub use tsconfig::TsConfigProvider;
