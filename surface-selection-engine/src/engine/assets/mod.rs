pub mod selection_config;
