pub mod constants;
pub mod text;
pub mod types;
pub mod validation;

#[cfg(test)]
pub mod test_helpers;
