pub mod istates;
pub mod ievents;
pub mod iaccessory;

pub use istates::*;
pub use ievents::*;
pub use iaccessory::*;

use chrono::{Local, NaiveDateTime};

pub fn local_now() -> NaiveDateTime {
    Local::now().naive_local()
}
