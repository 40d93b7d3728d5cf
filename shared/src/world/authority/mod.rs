pub mod actor;
pub mod authority_gate;
pub mod owner_table;
