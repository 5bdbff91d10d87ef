pub mod top_up;

pub use top_up::TopUpJob;
