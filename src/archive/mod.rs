pub mod audit;
pub mod config;
pub mod feed;
pub mod fsio;
pub mod gallery;
pub mod index;
pub mod keys;
pub mod migrate;
pub mod paths;
pub mod publish;
pub mod record;
pub mod report;
pub mod store;
pub mod upload;
pub mod warn;
