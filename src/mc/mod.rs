pub mod greeks;
pub mod pricing;
pub mod spread;
