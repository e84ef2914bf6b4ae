//! Bank-switching memory bus for NES cartridge mappers.

#![warn(missing_docs)]

pub mod addr;
pub mod bus;
pub mod cart;
pub mod config;
pub mod mapper;
pub mod save;
