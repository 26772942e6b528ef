mod validate_tests;
mod value_iteration_tests;
