//! Gateway implementations: the live Razorpay REST client and an in-memory
//! double with the same contract.

pub mod in_memory;
pub mod razorpay;
