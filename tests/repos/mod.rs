mod account;
mod loan;
mod transaction;
