//! CSV adapters for the command-line driver.

pub mod command_reader;
pub mod wallet_writer;
