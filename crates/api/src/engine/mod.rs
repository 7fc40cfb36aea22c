//! Batch jobs run on behalf of administrators.
//!
//! Currently the year-end [`promotion::PromotionJob`].

pub mod promotion;
