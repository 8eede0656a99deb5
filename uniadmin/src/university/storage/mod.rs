mod config;
mod postgres;
mod sqlite;
mod store_type;

pub use store_type::UniversityStore;

#[cfg(test)]
pub(crate) use config::DB_TABLE_UNIVERSITIES;
