#![allow(clippy::enum_variant_names)]

//! Client side of a per-user directory tree kept by a remote store.
//!
//! The [`transport`] module speaks the store's HTTP contract, [`tree`] keeps
//! the displayed tree consistent with confirmed store mutations, and [`root`]
//! finds or creates the user's root. [`browser`] ties them to a [`session`].

pub mod application;
pub mod browser;
pub mod cli;
pub mod config;
pub mod directory;
pub mod render;
pub mod root;
pub mod session;
pub mod transport;
pub mod tree;

#[cfg(test)]
pub(crate) mod testing;
