pub mod constraints;
pub mod employee;
pub mod horizon;
pub mod work_state;
