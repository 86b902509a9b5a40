mod balance;
mod file;
mod rates;
mod snapshot;
mod user;
mod view;
mod withdrawal;
