pub mod token_storage;
