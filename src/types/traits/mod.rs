pub mod any {
    pub mod any_date;
}
pub mod period {
    pub mod date_period;
}
pub mod types;
pub mod utils;
