pub mod day_slot;
pub mod frames {
    pub mod daily_table;
}
pub mod observation;
pub mod station;
pub mod traits;
