pub mod frozen_lake;
pub mod random;
pub mod simple_golf;
