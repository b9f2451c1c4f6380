//! SeaORM entities for database tables

pub mod compliance_alert;
pub mod contract_grouping;
pub mod csm_profitability;
pub mod data_quality_check;
pub mod discount_rates;
pub mod ifrs4_transition;
pub mod institution;
pub mod insurance_revenue;
pub mod reinsurance_held;
pub mod submission;
pub mod user;
