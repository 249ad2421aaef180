pub mod csv;
pub mod ledger;
