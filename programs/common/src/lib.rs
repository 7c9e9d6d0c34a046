#![cfg_attr(feature = "strict", deny(warnings))]
#![deny(clippy::all)]
#![warn(missing_docs)]
//! Tandem common utilities shared by the matching fund program and its clients.

pub mod authority;
pub mod errors;
pub mod events;
pub mod ledger;
pub mod settlement;
#[cfg(not(target_arch = "bpf"))]
pub mod testing;
pub mod time;

pub use anchor_lang::prelude::*;

// Provide a tiny IDL stub for this utility crate so `anchor idl build`
// doesn't error when traversing all crates under `programs/`.
#[cfg(feature = "idl-build")]
use anchor_lang::{declare_id, program};

#[cfg(feature = "idl-build")]
declare_id!("11111111111111111111111111111111");

#[cfg(feature = "idl-build")]
#[program]
pub mod __idl_stub {}
