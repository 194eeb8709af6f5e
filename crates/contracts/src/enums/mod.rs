pub mod marketplace_type;
