//! Integration test harness

mod controller_scenarios;
