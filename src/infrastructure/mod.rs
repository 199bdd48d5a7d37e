pub mod in_memory;
pub mod mock_gateway;
pub mod notifier;
#[cfg(feature = "gateway-paystack")]
pub mod paystack;
#[cfg(feature = "storage-rocksdb")]
pub mod rocksdb;
