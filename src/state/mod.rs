pub mod sync_locks;

pub use sync_locks::SyncLocks;
