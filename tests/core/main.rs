mod config;
mod origin;
mod policy;
