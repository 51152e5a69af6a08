/// Integration test target
mod basic_integration;
