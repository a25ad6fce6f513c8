pub mod ai_model;
pub mod population_file;
