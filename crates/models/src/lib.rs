pub mod errors;
pub mod db;
pub mod user;
pub mod product;
pub mod product_detail;
pub mod file;

#[cfg(test)]
mod tests;
