mod daily;

pub use daily::DailyStats;
