// tests/property/main.rs

mod group;
mod spectral;
