pub mod forecast;
pub mod sales;
