//! Application layer: the wallet accessor, the transaction journal and the
//! payment orchestrator that drives both against an external gateway.

pub mod journal;
pub mod orchestrator;
pub mod wallets;
