pub mod fact_refresh;
pub mod health;
