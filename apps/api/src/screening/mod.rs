pub mod analysis;
pub mod analytics;
pub mod handlers;
pub mod history;
pub mod jd_matcher;
pub mod prompts;
pub mod ranking;
pub mod session;

#[cfg(test)]
pub mod testing;
