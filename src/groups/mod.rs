pub mod p256;
pub mod safe_prime;

pub use p256::P256Group;
pub use safe_prime::SafePrimeGroup;
