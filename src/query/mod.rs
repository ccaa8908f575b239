//! Request cache shared by every read and write hook.

mod client;
mod key;
mod mutation;
mod observer;

pub use client::{CacheEvent, EntrySnapshot, Fetcher, QueryClient, QueryData};
pub use key::{KeySegment, QueryKey};
pub use mutation::{Mutation, MutationStatus};
pub use observer::{Query, QueryState};
