//! Domain model: wallets, transactions, gateway values and the ports the
//! application layer depends on.

pub mod events;
pub mod gateway;
pub mod money;
pub mod page;
pub mod ports;
pub mod transaction;
pub mod wallet;
